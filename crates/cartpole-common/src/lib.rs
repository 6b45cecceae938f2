//! # Cartpole Common
//!
//! Shared types, errors, and the controller seam for the fuzzy cart-pole simulator.
//!
//! ## Core Types
//!
//! - [`PlantState`]: cart position/velocity and pendulum angle/angular velocity
//! - [`PlantParameters`]: cart mass, pendulum mass, arm length, gravity
//! - [`SafetyBounds`]: the envelope the loop enforces outside sandbox mode
//! - [`Frame`]: what the renderer receives once per emitted frame
//!
//! ## Errors
//!
//! - [`CartpoleError`]: unified error with `From` conversions
//! - [`FuzzyError`], [`PlantError`], [`SimulationError`]: domain errors

pub mod control;
pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use control::{Controller, FnController, NullController};
pub use error::{CartpoleError, FuzzyError, PlantError, Result, SimulationError};
pub use types::{
    parameters::{PlantParameters, SafetyBounds, STANDARD_GRAVITY},
    state::{Frame, PlantState},
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default integration step
pub const DEFAULT_DT: f64 = 0.001;

/// Default integrator sub-steps skipped between emitted frames
pub const DEFAULT_FRAMESKIP: u32 = 200;

/// Extreme force of the "push left" output
pub const MAX_PUSH_LEFT_FORCE: f64 = -550.0;

/// Extreme force of the "push right" output
pub const MAX_PUSH_RIGHT_FORCE: f64 = 550.0;
