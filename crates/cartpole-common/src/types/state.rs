//! PlantState and Frame - the mechanical state and what renderers see of it

use serde::{Deserialize, Serialize};

/// Mechanical state of the cart-pole
///
/// `theta` is measured from the upright position and kept in `(-π, π]`.
/// Positive `theta` leans the pendulum towards negative `x` (left).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantState {
    /// Cart position
    pub x: f64,
    /// Pendulum angle (radians)
    pub theta: f64,
    /// Cart velocity
    pub dx: f64,
    /// Pendulum angular velocity
    pub dtheta: f64,
}

impl PlantState {
    pub fn new(x: f64, theta: f64, dx: f64, dtheta: f64) -> Self {
        Self {
            x,
            theta,
            dx,
            dtheta,
        }
    }

    /// Upright pendulum on a resting cart at `x`
    pub fn at_rest(x: f64) -> Self {
        Self::new(x, 0.0, 0.0, 0.0)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.theta.is_finite()
            && self.dx.is_finite()
            && self.dtheta.is_finite()
    }
}

impl std::fmt::Display for PlantState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PlantState(x={:.3}, θ={:.4}, dx={:.3}, dθ={:.4})",
            self.x, self.theta, self.dx, self.dtheta
        )
    }
}

/// Observable snapshot handed to the renderer once per frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Integrator tick that produced this frame
    pub tick: u64,
    /// Simulated time
    pub time: f64,
    /// Cart position
    pub x: f64,
    /// Pendulum angle (radians)
    pub theta: f64,
}

impl Frame {
    pub fn new(tick: u64, time: f64, state: &PlantState) -> Self {
        Self {
            tick,
            time,
            x: state.x,
            theta: state.theta,
        }
    }

    /// Position of the pendulum bob relative to the rail, for an arm of `arm_length`
    pub fn bob_position(&self, arm_length: f64) -> (f64, f64) {
        (
            self.x - arm_length * self.theta.sin(),
            arm_length * self.theta.cos(),
        )
    }
}
