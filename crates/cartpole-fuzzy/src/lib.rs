//! # Cartpole Fuzzy
//!
//! Mamdani-style fuzzy controller for the cart-pole.
//!
//! ## Pipeline
//!
//! ```text
//! (x, theta, dtheta) ──► FuzzyAxis::evaluate ×3 ──► RuleBase ──► Defuzzifier ──► force
//!                         (membership degrees)      (min/max)    (weighted avg)
//! ```
//!
//! ## Components
//!
//! - [`FuzzySet`]: trapezoidal membership function
//! - [`FuzzyAxis`]: sets sharing one physical quantity
//! - [`RuleBase`]: fixed AND/OR/NOT rules producing "push left" / "push right"
//! - [`Defuzzifier`]: activations to a crisp force
//! - [`FuzzyController`]: all of the above behind [`cartpole_common::Controller`]

pub mod axis;
pub mod calibration;
pub mod controller;
pub mod defuzz;
pub mod ops;
pub mod rules;
pub mod set;

pub use axis::{FuzzyAxis, Memberships};
pub use calibration::{standard_rules, AxesCalibration, ControllerCalibration};
pub use controller::FuzzyController;
pub use defuzz::Defuzzifier;
pub use ops::{fuzzy_and, fuzzy_not, fuzzy_or};
pub use rules::{Activation, AxisKind, Premise, Push, Rule, RuleBase, RuleSpec};
pub use set::{FuzzySet, Slope};
