//! cartpole-sim - runs the fuzzy cart-pole headless and streams frames as JSON lines
//!
//! Usage: `cartpole-sim [scenario-file]`

use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Duration;

use cartpole_common::SimulationError;
use cartpole_sim::{build_loop, telemetry, FrameWriter, LoopMetrics, SimConfig};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the frames
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting cartpole-sim v{}", cartpole_common::VERSION);

    let scenario = std::env::args_os().nth(1).map(PathBuf::from);
    let config = SimConfig::load(scenario.as_deref())?;

    let registry = prometheus::Registry::new();
    let metrics = LoopMetrics::new()?;
    metrics.register(&registry)?;

    let mut sim = build_loop(&config)?;
    let mut writer = FrameWriter::new(BufWriter::new(std::io::stdout()), config.plant.arm_length);
    writer.write_header(&config)?;
    info!(run_id = %writer.run_id(), "Simulation running");

    let mut interval = tokio::time::interval(Duration::from_millis(config.run.frame_interval_ms));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let outcome = loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Stop requested");
                sim.halt();
                break Ok(());
            }
            _ = interval.tick() => {
                match sim.advance() {
                    Ok(frame) => {
                        writer.write_frame(&frame)?;
                        metrics.observe(sim.stats(), &frame);
                        if config.run.max_frames.is_some_and(|max| writer.frames_written() >= max) {
                            break Ok(());
                        }
                    }
                    Err(err) => break Err(err),
                }
            }
        }
    };

    writer.flush()?;
    metrics.observe(sim.stats(), &sim.frame());
    match telemetry::render(&registry) {
        Ok(text) => info!("Final metrics:\n{}", text),
        Err(err) => warn!(error = %err, "Failed to render metrics"),
    }

    match outcome {
        Ok(()) | Err(SimulationError::Halted) => {
            info!(frames = writer.frames_written(), time = sim.time(), "Simulation stopped");
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "Simulation failed");
            Err(err.into())
        }
    }
}
