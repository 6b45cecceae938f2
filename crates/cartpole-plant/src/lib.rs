//! # Cartpole Plant
//!
//! Nonlinear cart-pole dynamics: a cart of mass `M` on a rail carrying an
//! inverted pendulum with a point mass `m` at the end of an arm of length `l`.
//!
//! [`PlantIntegrator::step`] solves the coupled equations of motion for the
//! two accelerations and advances the state by one fixed step.

pub mod integrator;

pub use integrator::{wrap_angle, PlantIntegrator, SINGULAR_TOLERANCE};
