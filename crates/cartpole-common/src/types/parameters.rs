//! Physical constants of the plant and the safety envelope around it

use serde::{Deserialize, Serialize};

use crate::error::PlantError;

/// Gravitational acceleration of the plant model
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Immutable physical parameters of the cart-pole
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlantParameters {
    /// Cart mass (M)
    pub cart_mass: f64,
    /// Pendulum point mass (m)
    pub pendulum_mass: f64,
    /// Arm length (l)
    pub arm_length: f64,
    /// Gravitational acceleration (g)
    pub gravity: f64,
}

impl Default for PlantParameters {
    fn default() -> Self {
        Self {
            cart_mass: 10.0,
            pendulum_mass: 5.0,
            arm_length: 50.0,
            gravity: STANDARD_GRAVITY,
        }
    }
}

impl PlantParameters {
    pub fn new(cart_mass: f64, pendulum_mass: f64, arm_length: f64) -> Self {
        Self {
            cart_mass,
            pendulum_mass,
            arm_length,
            gravity: STANDARD_GRAVITY,
        }
    }

    /// Total mass moved by the rail (M + m)
    #[inline]
    pub fn total_mass(&self) -> f64 {
        self.cart_mass + self.pendulum_mass
    }

    /// Reject masses or arm lengths that make the dynamics meaningless
    pub fn validate(&self) -> Result<(), PlantError> {
        let positive = [
            ("cart_mass", self.cart_mass),
            ("pendulum_mass", self.pendulum_mass),
            ("arm_length", self.arm_length),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(PlantError::InvalidParameters(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        if !self.gravity.is_finite() {
            return Err(PlantError::InvalidParameters(format!(
                "gravity must be finite, got {}",
                self.gravity
            )));
        }
        Ok(())
    }
}

/// Safety envelope checked after every tick outside sandbox mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyBounds {
    /// Rail half-length: |x| must stay within it
    pub x_max: f64,
    /// Maximum |theta| before the pendulum counts as fallen
    pub theta_max: f64,
}

impl Default for SafetyBounds {
    fn default() -> Self {
        Self {
            x_max: 100.0,
            theta_max: std::f64::consts::FRAC_PI_3,
        }
    }
}

impl SafetyBounds {
    pub fn new(x_max: f64, theta_max: f64) -> Self {
        Self { x_max, theta_max }
    }

    /// True when the cart is on the rail and the pendulum has not fallen
    #[inline]
    pub fn contains(&self, x: f64, theta: f64) -> bool {
        x >= -self.x_max && x <= self.x_max && theta.abs() <= self.theta_max
    }
}
