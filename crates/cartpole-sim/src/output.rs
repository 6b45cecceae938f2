//! Headless frame output as JSON lines
//!
//! The first line is a header describing the run, every following line is one
//! frame. Renderers and plotting scripts consume this instead of animating the
//! loop directly.

use std::io::Write;

use cartpole_common::{Frame, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SimConfig;

/// First record of every output stream
#[derive(Debug, Clone, Serialize)]
pub struct RunHeader {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub version: String,
    pub config: SimConfig,
}

/// One emitted frame plus the bob position derived from it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    #[serde(flatten)]
    pub frame: Frame,
    pub bob_x: f64,
    pub bob_y: f64,
}

impl FrameRecord {
    pub fn new(frame: Frame, arm_length: f64) -> Self {
        let (bob_x, bob_y) = frame.bob_position(arm_length);
        Self {
            frame,
            bob_x,
            bob_y,
        }
    }
}

pub struct FrameWriter<W: Write> {
    out: W,
    run_id: Uuid,
    arm_length: f64,
    frames_written: u64,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(out: W, arm_length: f64) -> Self {
        Self {
            out,
            run_id: Uuid::now_v7(),
            arm_length,
            frames_written: 0,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn write_header(&mut self, config: &SimConfig) -> Result<()> {
        let header = RunHeader {
            run_id: self.run_id,
            started_at: Utc::now(),
            version: cartpole_common::VERSION.to_string(),
            config: config.clone(),
        };
        serde_json::to_writer(&mut self.out, &header)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let record = FrameRecord::new(*frame, self.arm_length);
        serde_json::to_writer(&mut self.out, &record)?;
        self.out.write_all(b"\n")?;
        self.frames_written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
