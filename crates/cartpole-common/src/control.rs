//! Controller seam between the control loop and whatever computes the force

use crate::types::state::PlantState;

/// Computes the actuation force for one integrator tick
pub trait Controller {
    /// Force to apply to the cart for the given state
    fn control(&mut self, state: &PlantState) -> f64;

    /// Short identifier used in logs
    fn name(&self) -> &str {
        "controller"
    }
}

/// Adapts a closure into a [`Controller`]
pub struct FnController<F> {
    name: String,
    f: F,
}

impl<F> FnController<F>
where
    F: FnMut(&PlantState) -> f64,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Controller for FnController<F>
where
    F: FnMut(&PlantState) -> f64,
{
    fn control(&mut self, state: &PlantState) -> f64 {
        (self.f)(state)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Controller that never pushes
#[derive(Debug, Clone, Copy, Default)]
pub struct NullController;

impl Controller for NullController {
    fn control(&mut self, _state: &PlantState) -> f64 {
        0.0
    }

    fn name(&self) -> &str {
        "null"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_controller() {
        let mut calls = 0;
        let mut controller = FnController::new("proportional", |s: &PlantState| {
            calls += 1;
            -10.0 * s.theta
        });
        let force = controller.control(&PlantState::new(0.0, 0.5, 0.0, 0.0));
        assert!((force + 5.0).abs() < 1e-12);
        assert_eq!(controller.name(), "proportional");
        drop(controller);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_null_controller() {
        let mut controller = NullController;
        assert_eq!(controller.control(&PlantState::at_rest(3.0)), 0.0);
    }
}
