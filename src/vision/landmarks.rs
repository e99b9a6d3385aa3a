//! Hand landmark types shared between the detector boundary and the classifier.

use chrono::{DateTime, Local};

/// Number of landmarks per detected hand (MediaPipe hand model).
pub const LANDMARK_COUNT: usize = 21;

/// Semantic identity of a single hand landmark.
///
/// Indices follow the MediaPipe hand landmark convention, see
/// <https://google.github.io/mediapipe/solutions/hands.html>
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum HandLandmark {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexFingerMcp = 5,
    IndexFingerPip = 6,
    IndexFingerDip = 7,
    IndexFingerTip = 8,
    MiddleFingerMcp = 9,
    MiddleFingerPip = 10,
    MiddleFingerDip = 11,
    MiddleFingerTip = 12,
    RingFingerMcp = 13,
    RingFingerPip = 14,
    RingFingerDip = 15,
    RingFingerTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

/// A single hand landmark in normalized image coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    /// X coordinate (0.0 to 1.0, normalized to image width)
    pub x: f32,
    /// Y coordinate (0.0 to 1.0, normalized to image height)
    pub y: f32,
    /// Z coordinate (depth, relative to the wrist)
    pub z: f32,
}

/// All landmarks of one hand in one frame. Immutable once built.
#[derive(Clone, Debug)]
pub struct PoseSnapshot {
    landmarks: [Landmark; LANDMARK_COUNT],
    timestamp: DateTime<Local>,
}

impl PoseSnapshot {
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT], timestamp: DateTime<Local>) -> Self {
        Self {
            landmarks,
            timestamp,
        }
    }

    /// Builds a snapshot from a detector point list.
    ///
    /// Returns `None` unless exactly [`LANDMARK_COUNT`] points are given.
    pub fn from_points(points: Vec<Landmark>, timestamp: DateTime<Local>) -> Option<Self> {
        let landmarks: [Landmark; LANDMARK_COUNT] = points.try_into().ok()?;
        Some(Self {
            landmarks,
            timestamp,
        })
    }

    pub fn landmark(&self, which: HandLandmark) -> Landmark {
        self.landmarks[which as usize]
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }
}
