//! # Cartpole Sim
//!
//! Drives the cart-pole plant with the fuzzy controller.
//!
//! ## Per tick
//!
//! ```text
//! disruption ─┐
//!             ├─► force ─► PlantIntegrator::step ─► bounds check ─► state
//! controller ─┘                                                    │
//!      ▲──────────────────────────────────────────────────────────┘
//! ```
//!
//! One [`Frame`](cartpole_common::Frame) is emitted every `frameskip + 1` ticks.

pub mod config;
pub mod control_loop;
pub mod disruption;
pub mod output;
pub mod scenario;
pub mod telemetry;

pub use config::{DisruptionSettings, RunSettings, SimConfig, ViewportSettings};
pub use control_loop::{ControlLoop, Frames, LoopConfig, LoopStats, LoopStatus, TickReport};
pub use disruption::DisruptionSequence;
pub use output::{FrameRecord, FrameWriter, RunHeader};
pub use scenario::LegacyScenario;
pub use telemetry::LoopMetrics;

use cartpole_common::Result;
use cartpole_fuzzy::FuzzyController;

/// Fuzzy-controlled loop for a loaded configuration
pub fn build_loop(config: &SimConfig) -> Result<ControlLoop<FuzzyController>> {
    let controller = FuzzyController::from_calibration(&config.controller)?;
    ControlLoop::new(config.loop_config(), controller)
}
