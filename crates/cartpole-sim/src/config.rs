//! Simulator configuration
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. built-in defaults (the standard scenario)
//! 2. an optional scenario file: `.toml`, `.json` or `.yaml`, or the legacy
//!    three-line text format for any other extension
//! 3. `CARTPOLE_*` environment variables, nested with `__`
//!    (`CARTPOLE_PLANT__CART_MASS=12`, `CARTPOLE_SANDBOX=true`)

use std::path::Path;

use cartpole_common::{
    CartpoleError, PlantParameters, PlantState, Result, SafetyBounds, DEFAULT_DT,
    DEFAULT_FRAMESKIP,
};
use cartpole_fuzzy::ControllerCalibration;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::control_loop::LoopConfig;
use crate::disruption::DisruptionSequence;
use crate::scenario::LegacyScenario;

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "CARTPOLE";

/// Complete simulator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub plant: PlantParameters,
    pub initial: PlantState,
    pub disruption: DisruptionSettings,
    pub bounds: SafetyBounds,
    /// Keep simulating after the pendulum falls or the cart leaves the rail
    pub sandbox: bool,
    pub frameskip: u32,
    pub dt: f64,
    pub controller: ControllerCalibration,
    pub viewport: ViewportSettings,
    pub run: RunSettings,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            plant: PlantParameters::default(),
            initial: PlantState::new(90.0, 0.0, 0.0, 0.1),
            disruption: DisruptionSettings::default(),
            bounds: SafetyBounds::default(),
            sandbox: true,
            frameskip: DEFAULT_FRAMESKIP,
            dt: DEFAULT_DT,
            controller: ControllerCalibration::default(),
            viewport: ViewportSettings::default(),
            run: RunSettings::default(),
        }
    }
}

/// External force sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisruptionSettings {
    pub values: Vec<f64>,
    pub cyclic: bool,
}

impl Default for DisruptionSettings {
    fn default() -> Self {
        Self {
            values: vec![0.0],
            cyclic: true,
        }
    }
}

impl DisruptionSettings {
    pub fn sequence(&self) -> DisruptionSequence {
        DisruptionSequence::new(self.values.clone(), self.cyclic)
    }
}

/// Drawing area, only read by renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    pub width: u32,
    pub height: u32,
    pub h_min: i32,
    pub h_max: i32,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 800,
            h_min: -80,
            h_max: 80,
        }
    }
}

/// Pacing of the binary's frame loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Wall-clock delay between frames
    pub frame_interval_ms: u64,
    /// Stop after this many frames
    pub max_frames: Option<u64>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            frame_interval_ms: 1,
            max_frames: None,
        }
    }
}

impl SimConfig {
    /// Load configuration from defaults, an optional scenario file, and the environment
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let base = match path {
            Some(path) if is_structured(path) => {
                debug!(path = %path.display(), "Reading scenario file");
                config::Config::builder()
                    .add_source(config::Config::try_from(&Self::default()).map_err(config_error)?)
                    .add_source(config::File::from(path))
            }
            Some(path) => {
                debug!(path = %path.display(), "Reading legacy scenario file");
                let text = std::fs::read_to_string(path)?;
                let scenario = LegacyScenario::parse(&text)?;
                let merged = scenario.apply(Self::default());
                config::Config::builder()
                    .add_source(config::Config::try_from(&merged).map_err(config_error)?)
            }
            None => config::Config::builder()
                .add_source(config::Config::try_from(&Self::default()).map_err(config_error)?),
        };

        let cfg: Self = base
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_error)?
            .try_deserialize()
            .map_err(config_error)?;

        cfg.validate()?;
        info!(
            sandbox = cfg.sandbox,
            frameskip = cfg.frameskip,
            initial = %cfg.initial,
            "Configuration loaded"
        );
        Ok(cfg)
    }

    /// Reject values the loop or the binary cannot run with
    pub fn validate(&self) -> Result<()> {
        self.loop_config().validate()?;
        if self.run.frame_interval_ms == 0 {
            return Err(CartpoleError::Config(
                "run.frame_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Settings of the control loop proper
    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            params: self.plant,
            initial: self.initial,
            disruption: self.disruption.sequence(),
            bounds: self.bounds,
            sandbox: self.sandbox,
            frameskip: self.frameskip,
            dt: self.dt,
        }
    }
}

fn is_structured(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("toml" | "json" | "yaml" | "yml")
    )
}

fn config_error(err: config::ConfigError) -> CartpoleError {
    CartpoleError::Config(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    // `load` reads the process environment, so tests that call it run one at a time
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn scratch_file(name: &str, contents: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("cartpole-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults_match_standard_scenario() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.initial, PlantState::new(90.0, 0.0, 0.0, 0.1));
        assert_eq!(cfg.bounds.x_max, 100.0);
        assert_eq!(cfg.frameskip, 200);
        assert!(cfg.sandbox);
        assert!(cfg.loop_config().sandbox);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_load_toml_overrides_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let path = scratch_file(
            "scenario.toml",
            r#"
sandbox = false
frameskip = 10

[plant]
cart_mass = 12.0

[controller.axes]
centered = [-0.5, -0.2, 0.2, 0.5]
"#,
        );
        let cfg = SimConfig::load(Some(&path)).unwrap();
        assert!(!cfg.sandbox);
        assert_eq!(cfg.frameskip, 10);
        assert_eq!(cfg.plant.cart_mass, 12.0);
        assert_eq!(cfg.plant.arm_length, 50.0);
        assert_eq!(cfg.controller.axes.centered, [-0.5, -0.2, 0.2, 0.5]);
        assert!(cfg.controller.axes.tilted_left[2].is_infinite());
    }

    #[test]
    fn test_load_legacy_scenario() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let path = scratch_file(
            "scenario.txt",
            "10 5 50 20 0.1 0 0 1000 800 150 -80 80\n0\n1 2 3\n",
        );
        let cfg = SimConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.initial.x, 20.0);
        assert_eq!(cfg.initial.theta, 0.1);
        assert_eq!(cfg.bounds.x_max, 150.0);
        assert!(!cfg.disruption.cyclic);
        assert_eq!(cfg.disruption.values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let vars = [
            ("CARTPOLE_SANDBOX", "false"),
            ("CARTPOLE_PLANT__CART_MASS", "12.5"),
            ("CARTPOLE_RUN__MAX_FRAMES", "7"),
        ];
        for (key, value) in vars {
            std::env::set_var(key, value);
        }
        let loaded = SimConfig::load(None);
        for (key, _) in vars {
            std::env::remove_var(key);
        }

        let cfg = loaded.unwrap();
        assert!(!cfg.sandbox);
        assert_eq!(cfg.plant.cart_mass, 12.5);
        assert_eq!(cfg.plant.pendulum_mass, 5.0);
        assert_eq!(cfg.run.max_frames, Some(7));
        assert_eq!(cfg.frameskip, 200);
        // infinite breakpoints of the defaults survive the layering
        let tilted_left = cfg.controller.axes.tilted_left;
        assert_eq!(tilted_left[0], -0.005);
        assert!(tilted_left[2].is_infinite() && tilted_left[2] > 0.0);
        assert!(tilted_left[3].is_infinite() && tilted_left[3] > 0.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = SimConfig::default();
        cfg.dt = -1.0;
        assert!(matches!(cfg.validate(), Err(CartpoleError::Config(_))));

        let mut cfg = SimConfig::default();
        cfg.run.frame_interval_ms = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_structured_extensions() {
        assert!(is_structured(Path::new("a.toml")));
        assert!(is_structured(Path::new("dir/a.yaml")));
        assert!(!is_structured(Path::new("scenario.txt")));
        assert!(!is_structured(Path::new("scenario")));
    }
}
