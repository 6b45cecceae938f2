//! Error types for the cart-pole simulator
//!
//! Provides a unified error type and domain-specific error variants

use thiserror::Error;

/// Result type alias using CartpoleError
pub type Result<T> = std::result::Result<T, CartpoleError>;

/// Unified error type for simulator operations
#[derive(Debug, Error)]
pub enum CartpoleError {
    // Fuzzy controller construction errors
    #[error("Fuzzy error: {0}")]
    Fuzzy(#[from] FuzzyError),

    // Plant dynamics errors
    #[error("Plant error: {0}")]
    Plant(#[from] PlantError),

    // Control loop errors
    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Output / file errors
    #[error("I/O error: {0}")]
    Io(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Fuzzy set, axis, and rule construction errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FuzzyError {
    #[error(
        "Invalid breakpoints for set {set}: \
         [{left_start}, {left_end}, {right_start}, {right_end}] must be non-decreasing"
    )]
    InvalidBreakpoints {
        set: String,
        left_start: f64,
        left_end: f64,
        right_start: f64,
        right_end: f64,
    },

    #[error("Set {set} defined twice on axis {axis}")]
    DuplicateSet { axis: String, set: String },

    #[error("Set {set} not found on axis {axis}")]
    UnknownSet { axis: String, set: String },

    #[error("No reading supplied for axis {axis}")]
    MissingReading { axis: String },
}

/// Plant dynamics errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlantError {
    #[error("Singular dynamics matrix at theta={theta} (det={determinant})")]
    SingularSystem { theta: f64, determinant: f64 },

    #[error("Invalid plant parameters: {0}")]
    InvalidParameters(String),

    #[error("Integration produced a non-finite state")]
    NonFiniteState,
}

/// Control loop errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error(
        "Out of bounds at tick {tick}: x={x:.3} (limit {x_max}), theta={theta:.4} (limit {theta_max:.4})"
    )]
    OutOfBounds {
        tick: u64,
        x: f64,
        theta: f64,
        x_max: f64,
        theta_max: f64,
    },

    #[error("Tick failed: {0}")]
    Plant(#[from] PlantError),

    #[error("Control loop was halted")]
    Halted,
}

impl SimulationError {
    /// Whether the loop can keep running after this error
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SimulationError::Plant(_))
    }
}

// Implement From for common external error types
impl From<serde_json::Error> for CartpoleError {
    fn from(err: serde_json::Error) -> Self {
        CartpoleError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for CartpoleError {
    fn from(err: std::io::Error) -> Self {
        CartpoleError::Io(err.to_string())
    }
}
