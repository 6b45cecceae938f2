//! Legacy plain-text scenario files
//!
//! ```text
//! M m l x0 theta0 dx0 dtheta0 width height x_max h_min h_max
//! <cyclic flag>
//! <disruption forces...>
//! ```
//!
//! The first seven tokens of line 1 are reals and the last five are integers.
//! A cyclic flag that is empty, `0` or `false` makes the disruption sequence
//! finite; anything else makes it cyclic.

use std::str::FromStr;

use cartpole_common::{CartpoleError, PlantParameters, PlantState, Result};
use serde::{Deserialize, Serialize};

use crate::config::{DisruptionSettings, SimConfig, ViewportSettings};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyScenario {
    pub cart_mass: f64,
    pub pendulum_mass: f64,
    pub arm_length: f64,
    pub initial: PlantState,
    pub viewport: ViewportSettings,
    pub x_max: f64,
    pub cyclic: bool,
    pub disruption: Vec<f64>,
}

impl LegacyScenario {
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines();

        let header: Vec<&str> = lines.next().unwrap_or_default().split_whitespace().collect();
        if header.len() < 12 {
            return Err(CartpoleError::Config(format!(
                "line 1: expected 12 values, found {}",
                header.len()
            )));
        }
        let reals = header[..7]
            .iter()
            .map(|t| token::<f64>(1, t))
            .collect::<Result<Vec<_>>>()?;
        let ints = header[header.len() - 5..]
            .iter()
            .map(|t| token::<i64>(1, t))
            .collect::<Result<Vec<_>>>()?;

        let cyclic = parse_cyclic_flag(lines.next().unwrap_or_default());

        let disruption = lines
            .next()
            .unwrap_or_default()
            .split_whitespace()
            .map(|t| token::<f64>(3, t))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            cart_mass: reals[0],
            pendulum_mass: reals[1],
            arm_length: reals[2],
            initial: PlantState::new(reals[3], reals[4], reals[5], reals[6]),
            viewport: ViewportSettings {
                width: int_field(ints[0], "width")?,
                height: int_field(ints[1], "height")?,
                h_min: int_field(ints[3], "h_min")?,
                h_max: int_field(ints[4], "h_max")?,
            },
            x_max: ints[2] as f64,
            cyclic,
            disruption,
        })
    }

    /// Overlay this scenario on `config`
    ///
    /// Gravity, `theta_max` and the controller calibration are not part of
    /// the format and keep their values from `config`.
    pub fn apply(self, mut config: SimConfig) -> SimConfig {
        config.plant = PlantParameters {
            cart_mass: self.cart_mass,
            pendulum_mass: self.pendulum_mass,
            arm_length: self.arm_length,
            gravity: config.plant.gravity,
        };
        config.initial = self.initial;
        config.viewport = self.viewport;
        config.bounds.x_max = self.x_max;
        config.disruption = DisruptionSettings {
            values: self.disruption,
            cyclic: self.cyclic,
        };
        config
    }
}

fn parse_cyclic_flag(line: &str) -> bool {
    !matches!(line.trim(), "" | "0" | "false")
}

fn token<T: FromStr>(line: usize, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| CartpoleError::Config(format!("line {}: invalid value '{}'", line, raw)))
}

fn int_field<T: TryFrom<i64>>(value: i64, name: &str) -> Result<T> {
    T::try_from(value)
        .map_err(|_| CartpoleError::Config(format!("line 1: {} out of range: {}", name, value)))
}
