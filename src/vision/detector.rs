//! Hand-landmark detector boundary.
//!
//! The detector itself is an external capability: any program that captures
//! camera frames, runs hand landmarking, and writes one JSON line per frame
//! to stdout. This module spawns that process, parses the stream, and
//! forwards per-frame events to the control pipeline.
//!
//! Wire format, one line per frame:
//!
//! ```text
//! {"hands": [[{"x": 0.1, "y": 0.2, "z": 0.0}, ... 21 points], ...]}
//! ```
//!
//! A line with `{"eof": true}` or the end of the stream means the capture is
//! gone, which is fatal to the frame loop and is not retried.

use crate::vision::landmarks::{Landmark, PoseSnapshot, LANDMARK_COUNT};
use chrono::Local;
use serde::Deserialize;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

// Detector settings
#[derive(Clone, Debug)]
pub struct DetectorSettings {
    /// Program producing the landmark stream on stdout.
    pub command: String,
    pub args: Vec<String>,
    /// Passed to the detector as `--min-confidence`.
    pub min_detection_confidence: f32,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            command: "python3".to_string(),
            args: vec!["hand_detector.py".to_string()],
            min_detection_confidence: 0.7,
        }
    }
}

// Detector errors
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("Failed to start detector process: {0}")]
    SpawnError(#[from] std::io::Error),

    #[error("Detector process has no stdout")]
    MissingStdout,
}

/// One frame worth of detector output.
#[derive(Clone, Debug)]
pub enum FrameEvent {
    /// Zero or more detected hands for this frame.
    Hands(Vec<PoseSnapshot>),

    /// The capture stream ended.
    CaptureLost,
}

#[derive(Deserialize, Debug)]
struct LandmarkWire {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Deserialize, Debug, Default)]
struct FrameWire {
    #[serde(default)]
    hands: Vec<Vec<LandmarkWire>>,

    #[serde(default)]
    eof: bool,
}

/// Handle owning the detector process and its stdout reader task.
pub struct DetectorHandle {
    child: Child,
}

impl DetectorHandle {
    /// Spawns the detector process and the reader task feeding `frame_sender`.
    pub fn spawn(
        settings: Option<DetectorSettings>,
        frame_sender: mpsc::Sender<FrameEvent>,
    ) -> Result<Self, DetectorError> {
        let settings = settings.unwrap_or_default();
        info!(
            "Starting detector process: {} {:?}",
            settings.command, settings.args
        );

        let mut child = Command::new(&settings.command)
            .args(&settings.args)
            .arg("--min-confidence")
            .arg(settings.min_detection_confidence.to_string())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child.stdout.take().ok_or(DetectorError::MissingStdout)?;

        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => match parse_frame_line(&line) {
                        Ok(Some(event)) => {
                            if frame_sender.send(event).await.is_err() {
                                debug!("Frame channel closed, stopping detector reader");
                                return;
                            }
                        }
                        Ok(None) => {
                            warn!("Detector signalled end of capture");
                            let _ = frame_sender.send(FrameEvent::CaptureLost).await;
                            return;
                        }
                        Err(e) => {
                            // One malformed line is dropped, the stream keeps going.
                            warn!("Skipping malformed detector line: {}", e);
                        }
                    },
                    Ok(None) => {
                        warn!("Detector stdout closed");
                        let _ = frame_sender.send(FrameEvent::CaptureLost).await;
                        return;
                    }
                    Err(e) => {
                        error!("Failed to read detector output: {}", e);
                        let _ = frame_sender.send(FrameEvent::CaptureLost).await;
                        return;
                    }
                }
            }
        });

        debug!("Detector reader task spawned");
        Ok(Self { child })
    }

    /// Stops the detector process. Called only after the controller has
    /// drained its held keys.
    pub async fn shutdown(mut self) {
        debug!("Stopping detector process");
        if let Err(e) = self.child.kill().await {
            warn!("Failed to kill detector process: {}", e);
        }
    }
}

/// Parses one stdout line. `Ok(None)` is the end-of-capture marker.
fn parse_frame_line(line: &str) -> Result<Option<FrameEvent>, serde_json::Error> {
    let frame: FrameWire = serde_json::from_str(line)?;
    if frame.eof {
        return Ok(None);
    }

    let timestamp = Local::now();
    let mut hands = Vec::with_capacity(frame.hands.len());
    for points in frame.hands {
        if points.len() != LANDMARK_COUNT {
            warn!(
                "Dropping hand with {} landmarks (expected {})",
                points.len(),
                LANDMARK_COUNT
            );
            continue;
        }
        let points: Vec<Landmark> = points
            .iter()
            .map(|p| Landmark {
                x: p.x,
                y: p.y,
                z: p.z,
            })
            .collect();
        if let Some(snapshot) = PoseSnapshot::from_points(points, timestamp) {
            hands.push(snapshot);
        }
    }
    Ok(Some(FrameEvent::Hands(hands)))
}
