//! Defuzzifier - weighted average of the two output singletons
//!
//! This is not a centroid-of-area defuzzification: each consequence is a
//! singleton at its extreme force, and the crisp output is the average of the
//! two singletons weighted by their activations.

use cartpole_common::{MAX_PUSH_LEFT_FORCE, MAX_PUSH_RIGHT_FORCE};
use serde::{Deserialize, Serialize};

use crate::rules::Activation;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Defuzzifier {
    /// Force when only "push left" is active (negative)
    pub push_left_force: f64,
    /// Force when only "push right" is active (positive)
    pub push_right_force: f64,
}

impl Default for Defuzzifier {
    fn default() -> Self {
        Self {
            push_left_force: MAX_PUSH_LEFT_FORCE,
            push_right_force: MAX_PUSH_RIGHT_FORCE,
        }
    }
}

impl Defuzzifier {
    pub fn new(push_left_force: f64, push_right_force: f64) -> Self {
        Self {
            push_left_force,
            push_right_force,
        }
    }

    /// Crisp force for the given activation levels; no activation means no force
    #[inline]
    pub fn force(&self, push_left: f64, push_right: f64) -> f64 {
        let total = push_left + push_right;
        if total <= 0.0 {
            return 0.0;
        }
        (push_left * self.push_left_force + push_right * self.push_right_force) / total
    }

    #[inline]
    pub fn defuzzify(&self, activation: &Activation) -> f64 {
        self.force(activation.push_left, activation.push_right)
    }
}
