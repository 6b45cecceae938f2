//! ControlLoop - disturbance, controller, integrator and safety check, tick by tick
//!
//! ```text
//!           ┌──────────── Running ────────────┐
//!  tick():  disruption + control ─► step ─► bounds check
//!           │                                  │ outside (not sandbox)
//!           │ singular/non-finite: skip tick   ▼
//!           └──────────────────────────── Terminated ◄── halt()
//! ```
//!
//! The loop owns the only mutable plant state. A renderer pulls frames with
//! [`ControlLoop::advance`] (or the [`ControlLoop::frames`] iterator) and owns
//! its own timer.

use cartpole_common::{
    CartpoleError, Controller, Frame, PlantParameters, PlantState, Result, SafetyBounds,
    SimulationError, DEFAULT_DT, DEFAULT_FRAMESKIP,
};
use cartpole_plant::{wrap_angle, PlantIntegrator};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};

use crate::disruption::DisruptionSequence;

/// Everything the loop is initialized with
#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    pub params: PlantParameters,
    pub initial: PlantState,
    pub disruption: DisruptionSequence,
    pub bounds: SafetyBounds,
    /// Never terminate on leaving the bounds
    pub sandbox: bool,
    /// Integrator steps skipped between emitted frames
    pub frameskip: u32,
    pub dt: f64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            params: PlantParameters::default(),
            initial: PlantState::default(),
            disruption: DisruptionSequence::none(),
            bounds: SafetyBounds::default(),
            sandbox: false,
            frameskip: DEFAULT_FRAMESKIP,
            dt: DEFAULT_DT,
        }
    }
}

impl LoopConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(CartpoleError::Config(format!(
                "dt must be positive, got {}",
                self.dt
            )));
        }
        if !(self.bounds.x_max > 0.0 && self.bounds.theta_max > 0.0) {
            return Err(CartpoleError::Config(format!(
                "bounds must be positive, got x_max={} theta_max={}",
                self.bounds.x_max, self.bounds.theta_max
            )));
        }
        if !self.initial.is_finite() {
            return Err(CartpoleError::Config(format!(
                "initial state must be finite, got {}",
                self.initial
            )));
        }
        if self.disruption.values().iter().any(|v| !v.is_finite()) {
            return Err(CartpoleError::Config(
                "disruption values must be finite".to_string(),
            ));
        }
        self.params.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopStatus {
    Running,
    Terminated,
}

/// What happened during one integrator tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub disruption: f64,
    pub control: f64,
    /// Total force applied to the cart
    pub force: f64,
    pub state: PlantState,
}

/// Running counters kept by the loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoopStats {
    pub ticks: u64,
    pub frames: u64,
    /// Ticks skipped because the integrator could not advance the state
    pub singular_ticks: u64,
    pub terminations: u64,
    pub last_force: f64,
}

pub struct ControlLoop<C> {
    controller: C,
    integrator: PlantIntegrator,
    disruption: DisruptionSequence,
    bounds: SafetyBounds,
    sandbox: bool,
    frameskip: u32,
    dt: f64,
    state: PlantState,
    tick: u64,
    stats: LoopStats,
    termination: Option<SimulationError>,
}

impl<C: Controller> ControlLoop<C> {
    /// Validate the configuration and place the plant in its initial state
    #[instrument(skip_all, fields(controller = controller.name()))]
    pub fn new(config: LoopConfig, controller: C) -> Result<Self> {
        config.validate()?;
        let integrator = PlantIntegrator::new(config.params)?;

        let mut state = config.initial;
        state.theta = wrap_angle(state.theta);

        info!(
            %state,
            sandbox = config.sandbox,
            frameskip = config.frameskip,
            dt = config.dt,
            "Control loop initialized"
        );

        Ok(Self {
            controller,
            integrator,
            disruption: config.disruption,
            bounds: config.bounds,
            sandbox: config.sandbox,
            frameskip: config.frameskip,
            dt: config.dt,
            state,
            tick: 0,
            stats: LoopStats::default(),
            termination: None,
        })
    }

    /// One integrator step
    ///
    /// A singular or non-finite step leaves the state untouched and is
    /// reported as a recoverable error. Leaving the bounds outside sandbox
    /// mode terminates the loop.
    pub fn tick(&mut self) -> std::result::Result<TickReport, SimulationError> {
        if let Some(err) = &self.termination {
            return Err(err.clone());
        }

        let disruption = self.disruption.next_force();
        let control = self.controller.control(&self.state);
        let force = disruption + control;

        self.tick += 1;
        self.stats.ticks += 1;
        self.stats.last_force = force;

        match self.integrator.step(&self.state, force, self.dt) {
            Ok(next) => self.state = next,
            Err(err) => {
                self.stats.singular_ticks += 1;
                warn!(tick = self.tick, state = %self.state, error = %err, "Tick skipped");
                return Err(err.into());
            }
        }
        trace!(tick = self.tick, disruption, control, state = %self.state, "tick");

        if !self.sandbox && !self.bounds.contains(self.state.x, self.state.theta) {
            let err = SimulationError::OutOfBounds {
                tick: self.tick,
                x: self.state.x,
                theta: self.state.theta,
                x_max: self.bounds.x_max,
                theta_max: self.bounds.theta_max,
            };
            warn!(error = %err, "Control loop terminated");
            self.terminate(err.clone());
            return Err(err);
        }

        Ok(TickReport {
            tick: self.tick,
            disruption,
            control,
            force,
            state: self.state,
        })
    }

    /// Run `frameskip + 1` ticks and return the resulting frame
    pub fn advance(&mut self) -> std::result::Result<Frame, SimulationError> {
        for _ in 0..=self.frameskip {
            match self.tick() {
                Ok(_) => {}
                Err(err) if !err.is_terminal() => {
                    debug!(tick = self.tick, "Continuing after recoverable tick error");
                }
                Err(err) => return Err(err),
            }
        }
        self.stats.frames += 1;
        Ok(self.frame())
    }

    /// Lazy frame sequence; yields the terminal error once and then ends
    pub fn frames(&mut self) -> Frames<'_, C> {
        Frames {
            inner: self,
            done: false,
        }
    }

    /// External stop request; the loop stops immediately
    pub fn halt(&mut self) {
        if self.termination.is_none() {
            info!(tick = self.tick, "Control loop halted");
            self.terminate(SimulationError::Halted);
        }
    }

    fn terminate(&mut self, reason: SimulationError) {
        self.stats.terminations += 1;
        self.termination = Some(reason);
    }

    pub fn status(&self) -> LoopStatus {
        if self.termination.is_some() {
            LoopStatus::Terminated
        } else {
            LoopStatus::Running
        }
    }

    /// Why the loop stopped, if it has
    pub fn termination(&self) -> Option<&SimulationError> {
        self.termination.as_ref()
    }

    pub fn state(&self) -> &PlantState {
        &self.state
    }

    pub fn stats(&self) -> &LoopStats {
        &self.stats
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Simulated time since the start
    pub fn time(&self) -> f64 {
        self.tick as f64 * self.dt
    }

    /// Snapshot of the current state
    pub fn frame(&self) -> Frame {
        Frame::new(self.tick, self.time(), &self.state)
    }

    pub fn parameters(&self) -> &PlantParameters {
        self.integrator.parameters()
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }
}

/// Iterator returned by [`ControlLoop::frames`]
pub struct Frames<'a, C> {
    inner: &'a mut ControlLoop<C>,
    done: bool,
}

impl<C: Controller> Iterator for Frames<'_, C> {
    type Item = std::result::Result<Frame, SimulationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let next = self.inner.advance();
        if next.is_err() {
            self.done = true;
        }
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartpole_common::{FnController, NullController};

    fn config(initial: PlantState) -> LoopConfig {
        LoopConfig {
            initial,
            ..LoopConfig::default()
        }
    }

    #[test]
    fn test_tick_adds_disruption_to_control() {
        let mut sim = ControlLoop::new(
            LoopConfig {
                disruption: DisruptionSequence::finite(vec![10.0]),
                ..LoopConfig::default()
            },
            FnController::new("constant", |_: &PlantState| 5.0),
        )
        .unwrap();

        let first = sim.tick().unwrap();
        assert_eq!(first.disruption, 10.0);
        assert_eq!(first.control, 5.0);
        assert_eq!(first.force, 15.0);
        assert_eq!(first.tick, 1);

        let second = sim.tick().unwrap();
        assert_eq!(second.disruption, 0.0);
        assert_eq!(second.force, 5.0);
        assert!(sim.state().x > 0.0);
    }

    #[test]
    fn test_controller_sees_state_before_step() {
        let mut seen = Vec::new();
        let mut sim = ControlLoop::new(
            config(PlantState::new(1.0, 0.0, 0.0, 0.0)),
            FnController::new("recorder", |s: &PlantState| {
                seen.push(s.x);
                100.0
            }),
        )
        .unwrap();
        sim.tick().unwrap();
        sim.tick().unwrap();
        drop(sim);
        assert_eq!(seen[0], 1.0);
        assert!(seen[1] > 1.0);
    }

    #[test]
    fn test_advance_emits_one_frame_per_frameskip_plus_one() {
        let mut sim = ControlLoop::new(
            LoopConfig {
                frameskip: 4,
                ..LoopConfig::default()
            },
            NullController,
        )
        .unwrap();
        let frame = sim.advance().unwrap();
        assert_eq!(frame.tick, 5);
        assert!((frame.time - 0.005).abs() < 1e-12);
        let frame = sim.advance().unwrap();
        assert_eq!(frame.tick, 10);
        assert_eq!(sim.stats().frames, 2);
        assert_eq!(sim.stats().ticks, 10);
    }

    #[test]
    fn test_out_of_bounds_terminates() {
        let mut sim = ControlLoop::new(
            config(PlantState::new(99.999, 0.0, 5.0, 0.0)),
            NullController,
        )
        .unwrap();
        let err = sim.tick().unwrap_err();
        assert!(matches!(err, SimulationError::OutOfBounds { tick: 1, .. }));
        assert_eq!(sim.status(), LoopStatus::Terminated);
        assert_eq!(sim.stats().terminations, 1);

        // the terminal error sticks and the state no longer moves
        let x = sim.state().x;
        assert_eq!(sim.advance().unwrap_err(), err);
        assert_eq!(sim.state().x, x);
    }

    #[test]
    fn test_sandbox_never_terminates() {
        let mut sim = ControlLoop::new(
            LoopConfig {
                initial: PlantState::new(99.999, 0.0, 5.0, 0.0),
                sandbox: true,
                frameskip: 0,
                ..LoopConfig::default()
            },
            NullController,
        )
        .unwrap();
        for _ in 0..1000 {
            sim.advance().unwrap();
        }
        assert!(sim.state().x > 100.0);
        assert_eq!(sim.status(), LoopStatus::Running);
    }

    #[test]
    fn test_singular_tick_is_skipped() {
        let mut sim = ControlLoop::new(
            LoopConfig {
                params: PlantParameters::new(1e-15, 1.0, 1.0),
                frameskip: 2,
                ..LoopConfig::default()
            },
            NullController,
        )
        .unwrap();
        let err = sim.tick().unwrap_err();
        assert!(!err.is_terminal());
        assert_eq!(*sim.state(), PlantState::default());

        let frame = sim.advance().unwrap();
        assert_eq!(frame.tick, 4);
        assert_eq!(sim.stats().singular_ticks, 4);
        assert_eq!(sim.status(), LoopStatus::Running);
    }

    #[test]
    fn test_halt_stops_frames() {
        let mut sim = ControlLoop::new(LoopConfig::default(), NullController).unwrap();
        sim.advance().unwrap();
        sim.halt();
        sim.halt();
        assert_eq!(sim.advance().unwrap_err(), SimulationError::Halted);
        assert_eq!(sim.stats().terminations, 1);
    }

    #[test]
    fn test_frames_yield_error_once() {
        let mut sim = ControlLoop::new(
            LoopConfig {
                initial: PlantState::new(0.0, 0.9, 0.0, 0.5),
                frameskip: 9,
                ..LoopConfig::default()
            },
            NullController,
        )
        .unwrap();
        let items: Vec<_> = sim.frames().take(10_000).collect();
        let (last, frames) = items.split_last().unwrap();
        assert!(frames.iter().all(|f| f.is_ok()));
        assert!(matches!(last, Err(SimulationError::OutOfBounds { .. })));
    }

    #[test]
    fn test_initial_angle_is_wrapped() {
        let sim = ControlLoop::new(
            LoopConfig {
                initial: PlantState::new(0.0, 2.0 * std::f64::consts::PI + 0.1, 0.0, 0.0),
                sandbox: true,
                ..LoopConfig::default()
            },
            NullController,
        )
        .unwrap();
        assert!((sim.state().theta - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad_dt = LoopConfig {
            dt: 0.0,
            ..LoopConfig::default()
        };
        assert!(matches!(
            ControlLoop::new(bad_dt, NullController),
            Err(CartpoleError::Config(_))
        ));
        let bad_mass = LoopConfig {
            params: PlantParameters::new(0.0, 5.0, 50.0),
            ..LoopConfig::default()
        };
        assert!(matches!(
            ControlLoop::new(bad_mass, NullController),
            Err(CartpoleError::Plant(_))
        ));
    }
}
