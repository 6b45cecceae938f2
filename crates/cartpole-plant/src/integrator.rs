//! PlantIntegrator - cart-pole dynamics with a fixed-step semi-implicit Euler scheme
//!
//! Equations of motion, linear in the two accelerations:
//!
//! ```text
//! (M + m)·ẍ − m·l·cos θ·θ̈ = F − m·l·θ̇²·sin θ
//!   −cos θ·ẍ +      l·θ̈ = g·sin θ
//! ```
//!
//! The 2×2 system is solved in closed form every tick. The explicit scheme
//! drifts numerically; trajectories depend on that drift, so no higher order
//! method is substituted.

use std::f64::consts::PI;

use cartpole_common::{PlantError, PlantParameters, PlantState};
use tracing::trace;

/// Relative determinant below which the dynamics matrix is treated as singular
pub const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Advances a [`PlantState`] by one time step under an applied force
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantIntegrator {
    params: PlantParameters,
}

impl PlantIntegrator {
    pub fn new(params: PlantParameters) -> Result<Self, PlantError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn parameters(&self) -> &PlantParameters {
        &self.params
    }

    /// Solve for `(ẍ, θ̈)` at `state` under `force`
    pub fn accelerations(&self, state: &PlantState, force: f64) -> Result<(f64, f64), PlantError> {
        let PlantParameters {
            pendulum_mass: m,
            arm_length: l,
            gravity: g,
            ..
        } = self.params;
        let (sin, cos) = state.theta.sin_cos();

        let a11 = self.params.total_mass();
        let a12 = -m * l * cos;
        let b1 = force - m * l * state.dtheta * state.dtheta * sin;
        let a21 = -cos;
        let a22 = l;
        let b2 = g * sin;

        let determinant = a11 * a22 - a12 * a21;
        let scale = (a11 * a22).abs().max((a12 * a21).abs());
        if !determinant.is_finite() || determinant.abs() <= SINGULAR_TOLERANCE * scale {
            return Err(PlantError::SingularSystem {
                theta: state.theta,
                determinant,
            });
        }

        let ddx = (b1 * a22 - a12 * b2) / determinant;
        let ddtheta = (a11 * b2 - a21 * b1) / determinant;
        Ok((ddx, ddtheta))
    }

    /// One semi-implicit Euler step of length `dt`
    ///
    /// Velocities are updated first and the updated velocities move the
    /// positions. The returned angle is wrapped into `(-π, π]`.
    pub fn step(&self, state: &PlantState, force: f64, dt: f64) -> Result<PlantState, PlantError> {
        let (ddx, ddtheta) = self.accelerations(state, force)?;

        let mut next = *state;
        next.dx += ddx * dt;
        next.x += next.dx * dt;
        next.dtheta += ddtheta * dt;
        next.theta = wrap_angle(next.theta + next.dtheta * dt);

        if !next.is_finite() {
            return Err(PlantError::NonFiniteState);
        }
        trace!(force, ddx, ddtheta, x = next.x, theta = next.theta, "plant step");
        Ok(next)
    }
}

/// Map any angle into `(-π, π]`
#[inline]
pub fn wrap_angle(theta: f64) -> f64 {
    let wrapped = theta.sin().atan2(theta.cos());
    if wrapped <= -PI {
        PI
    } else {
        wrapped
    }
}
