//! Prometheus metrics for the control loop

use cartpole_common::Frame;
use prometheus::{Encoder, Gauge, IntCounter, Registry, TextEncoder};

use crate::control_loop::LoopStats;

/// Loop counters and the latest plant readings
pub struct LoopMetrics {
    pub ticks_total: IntCounter,
    pub frames_total: IntCounter,
    pub singular_ticks_total: IntCounter,
    pub terminations_total: IntCounter,
    pub control_force: Gauge,
    pub cart_position: Gauge,
    pub pendulum_angle: Gauge,
}

impl LoopMetrics {
    pub fn new() -> prometheus::Result<Self> {
        Ok(Self {
            ticks_total: IntCounter::new("cartpole_ticks_total", "Integrator ticks executed")?,
            frames_total: IntCounter::new("cartpole_frames_total", "Frames emitted")?,
            singular_ticks_total: IntCounter::new(
                "cartpole_singular_ticks_total",
                "Ticks skipped because the plant could not be advanced",
            )?,
            terminations_total: IntCounter::new(
                "cartpole_terminations_total",
                "Times the control loop stopped",
            )?,
            control_force: Gauge::new(
                "cartpole_control_force",
                "Total force applied on the last tick",
            )?,
            cart_position: Gauge::new("cartpole_cart_position", "Cart position")?,
            pendulum_angle: Gauge::new("cartpole_pendulum_angle", "Pendulum angle in radians")?,
        })
    }

    pub fn register(&self, registry: &Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self.ticks_total.clone()))?;
        registry.register(Box::new(self.frames_total.clone()))?;
        registry.register(Box::new(self.singular_ticks_total.clone()))?;
        registry.register(Box::new(self.terminations_total.clone()))?;
        registry.register(Box::new(self.control_force.clone()))?;
        registry.register(Box::new(self.cart_position.clone()))?;
        registry.register(Box::new(self.pendulum_angle.clone()))?;
        Ok(())
    }

    /// Bring the counters up to `stats` and record the frame's readings
    pub fn observe(&self, stats: &LoopStats, frame: &Frame) {
        catch_up(&self.ticks_total, stats.ticks);
        catch_up(&self.frames_total, stats.frames);
        catch_up(&self.singular_ticks_total, stats.singular_ticks);
        catch_up(&self.terminations_total, stats.terminations);
        self.control_force.set(stats.last_force);
        self.cart_position.set(frame.x);
        self.pendulum_angle.set(frame.theta);
    }
}

fn catch_up(counter: &IntCounter, total: u64) {
    let delta = total.saturating_sub(counter.get());
    if delta > 0 {
        counter.inc_by(delta);
    }
}

/// Text exposition of everything in `registry`
pub fn render(registry: &Registry) -> prometheus::Result<String> {
    let mut buf = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartpole_common::PlantState;

    #[test]
    fn test_observe_tracks_stats() {
        let metrics = LoopMetrics::new().unwrap();
        let stats = LoopStats {
            ticks: 402,
            frames: 2,
            singular_ticks: 1,
            terminations: 0,
            last_force: -550.0,
        };
        let frame = Frame::new(402, 0.402, &PlantState::new(12.5, 0.03, 0.0, 0.0));
        metrics.observe(&stats, &frame);
        metrics.observe(&stats, &frame);

        assert_eq!(metrics.ticks_total.get(), 402);
        assert_eq!(metrics.frames_total.get(), 2);
        assert_eq!(metrics.singular_ticks_total.get(), 1);
        assert_eq!(metrics.control_force.get(), -550.0);
        assert_eq!(metrics.cart_position.get(), 12.5);
    }

    #[test]
    fn test_register_and_render() {
        let registry = Registry::new();
        let metrics = LoopMetrics::new().unwrap();
        metrics.register(&registry).unwrap();
        metrics.frames_total.inc();

        let text = render(&registry).unwrap();
        assert!(text.contains("cartpole_frames_total 1"));
        assert!(text.contains("cartpole_pendulum_angle"));

        // registering twice is a collision
        assert!(metrics.register(&registry).is_err());
    }
}
