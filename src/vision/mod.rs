//! Vision boundary: hand landmark types and the external detector process.

pub mod detector;
pub mod landmarks;

pub use detector::{DetectorError, DetectorHandle, DetectorSettings, FrameEvent};
pub use landmarks::{HandLandmark, Landmark, PoseSnapshot, LANDMARK_COUNT};
