//! FuzzyController - rule base and defuzzifier behind the controller seam

use cartpole_common::{Controller, FuzzyError, PlantState};
use tracing::{debug, trace};

use crate::calibration::ControllerCalibration;
use crate::defuzz::Defuzzifier;
use crate::rules::{Activation, RuleBase};

/// Fuzzy force controller for the cart-pole
#[derive(Debug, Clone)]
pub struct FuzzyController {
    rules: RuleBase,
    defuzzifier: Defuzzifier,
    last_activation: Activation,
}

impl FuzzyController {
    pub fn new(rules: RuleBase, defuzzifier: Defuzzifier) -> Self {
        Self {
            rules,
            defuzzifier,
            last_activation: Activation::default(),
        }
    }

    /// Controller with the default calibration
    pub fn standard() -> Result<Self, FuzzyError> {
        Self::from_calibration(&ControllerCalibration::default())
    }

    pub fn from_calibration(calibration: &ControllerCalibration) -> Result<Self, FuzzyError> {
        let rules = calibration.rule_base()?;
        debug!(
            rules = rules.rules().len(),
            push_left_force = calibration.push_left_force,
            push_right_force = calibration.push_right_force,
            "Built fuzzy controller"
        );
        Ok(Self::new(rules, calibration.defuzzifier()))
    }

    pub fn rules(&self) -> &RuleBase {
        &self.rules
    }

    pub fn defuzzifier(&self) -> &Defuzzifier {
        &self.defuzzifier
    }

    /// Activation computed by the most recent call to [`Controller::control`]
    pub fn last_activation(&self) -> Activation {
        self.last_activation
    }

    /// Force for `state` without recording the activation
    pub fn force(&self, state: &PlantState) -> f64 {
        self.defuzzifier.defuzzify(&self.activation(state))
    }

    fn activation(&self, state: &PlantState) -> Activation {
        self.rules
            .evaluate(state.x, state.theta, state.dx, state.dtheta)
    }
}

impl Controller for FuzzyController {
    fn control(&mut self, state: &PlantState) -> f64 {
        self.last_activation = self.activation(state);
        let force = self.defuzzifier.defuzzify(&self.last_activation);
        trace!(force, "fuzzy control");
        force
    }

    fn name(&self) -> &str {
        "fuzzy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::AxisKind;

    #[test]
    fn test_upright_at_center_is_balanced() {
        let mut controller = FuzzyController::standard().unwrap();
        let force = controller.control(&PlantState::default());
        assert!(force.abs() < 1e-9);
        let activation = controller.last_activation();
        assert!((activation.push_left - activation.push_right).abs() < 1e-12);
    }

    #[test]
    fn test_falling_left_pushes_left() {
        let mut controller = FuzzyController::standard().unwrap();
        let force = controller.control(&PlantState::new(0.0, 0.5, 0.0, 0.3));
        assert_eq!(force, -550.0);
        assert_eq!(controller.last_activation().push_left, 1.0);
    }

    #[test]
    fn test_falling_right_pushes_right() {
        let controller = FuzzyController::standard().unwrap();
        let force = controller.force(&PlantState::new(0.0, -0.5, 0.0, -0.3));
        assert_eq!(force, 550.0);
    }

    #[test]
    fn test_cart_far_left_is_recentred() {
        let controller = FuzzyController::standard().unwrap();
        assert!(controller.force(&PlantState::new(-90.0, 0.0, 0.0, 0.0)) > 0.0);
    }

    #[test]
    fn test_cart_far_right_only_recentred_when_still() {
        let controller = FuzzyController::standard().unwrap();
        assert!(controller.force(&PlantState::new(90.0, 0.0, 0.0, 0.0)) < 0.0);

        let still = controller.rules().evaluate(90.0, 0.0, 0.0, 0.0);
        let rotating = controller.rules().evaluate(90.0, 0.0, 0.0, 0.2);
        assert!(still.push_left > 0.08);
        // any rotation suppresses the recentering rule
        assert!(rotating.push_left < 0.02);
    }

    #[test]
    fn test_force_matches_control() {
        let mut controller = FuzzyController::standard().unwrap();
        let states = [
            PlantState::new(90.0, 0.0, 0.0, 0.1),
            PlantState::new(-40.0, 0.2, 1.0, -0.1),
            PlantState::new(10.0, -0.05, 0.0, 0.02),
        ];
        for state in states {
            let stateless = controller.force(&state);
            assert_eq!(controller.control(&state), stateless);
            let expected = controller
                .rules()
                .evaluate(state.x, state.theta, state.dx, state.dtheta);
            assert_eq!(controller.last_activation(), expected);
        }
    }

    #[test]
    fn test_readings_can_be_applied_in_any_order() {
        let controller = FuzzyController::standard().unwrap();
        let rules = controller.rules();
        let (x, theta, dtheta) = (-70.0, 0.1, -0.02);
        let angle = rules.axis(AxisKind::Angle).evaluate(theta);
        let rotation = rules.axis(AxisKind::Rotation).evaluate(dtheta);
        let position = rules.axis(AxisKind::Position).evaluate(x);

        let expected = rules.evaluate(x, theta, 0.0, dtheta);
        let orders = [
            [angle.clone(), rotation.clone(), position.clone()],
            [position.clone(), angle.clone(), rotation.clone()],
            [rotation.clone(), position.clone(), angle.clone()],
            [rotation, angle, position],
        ];
        for readings in orders {
            assert_eq!(rules.apply(&readings).unwrap(), expected);
        }
    }
}
