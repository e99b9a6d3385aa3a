//! Geometric gesture classification from a single hand pose.

use crate::gesture::history::MotionHistory;
use crate::vision::landmarks::{HandLandmark, PoseSnapshot};
use std::fmt::{self, Display};
use tracing::debug;

/// Discrete meaning of one classified hand pose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureLabel {
    Forward,
    Stop,
    Attack,
    MoveForward,
    EnemySpotted,
    Cover,
    Rally,
    Unknown,
}

impl Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureLabel::Forward => write!(f, "Forward"),
            GestureLabel::Stop => write!(f, "Stop"),
            GestureLabel::Attack => write!(f, "Attack"),
            GestureLabel::MoveForward => write!(f, "Move Forward"),
            GestureLabel::EnemySpotted => write!(f, "Enemy Spotted"),
            GestureLabel::Cover => write!(f, "Cover"),
            GestureLabel::Rally => write!(f, "Rally"),
            GestureLabel::Unknown => write!(f, "Unknown"),
        }
    }
}

const WRIST_DEPTH_CAPACITY: usize = 10;
const INDEX_TIP_CAPACITY: usize = 20;

/// Classifies hand poses into gesture labels.
///
/// The label is a pure function of the snapshot. The motion histories are
/// updated on every call but never read for the decision; they exist so a
/// future motion-based gesture can consume them without re-plumbing.
pub struct GestureClassifier {
    wrist_depths: MotionHistory<f32>,
    index_positions: MotionHistory<(f32, f32)>,
}

impl GestureClassifier {
    pub fn new() -> Self {
        Self {
            wrist_depths: MotionHistory::new(WRIST_DEPTH_CAPACITY),
            index_positions: MotionHistory::new(INDEX_TIP_CAPACITY),
        }
    }

    /// Classifies one hand pose. Total: unmatched poses come back as
    /// [`GestureLabel::Unknown`], never an error.
    pub fn classify(&mut self, hand: &PoseSnapshot) -> GestureLabel {
        const FINGER_TIPS: [HandLandmark; 4] = [
            HandLandmark::IndexFingerTip,
            HandLandmark::MiddleFingerTip,
            HandLandmark::RingFingerTip,
            HandLandmark::PinkyTip,
        ];
        const FINGER_DIPS: [HandLandmark; 4] = [
            HandLandmark::IndexFingerDip,
            HandLandmark::MiddleFingerDip,
            HandLandmark::RingFingerDip,
            HandLandmark::PinkyDip,
        ];

        // Image-space y grows downwards, so "above" means numerically smaller.
        let mut fingers_up = [false; 4];
        for (i, (tip, dip)) in FINGER_TIPS.iter().zip(FINGER_DIPS.iter()).enumerate() {
            fingers_up[i] = hand.landmark(*tip).y < hand.landmark(*dip).y;
        }

        let thumb_tip = hand.landmark(HandLandmark::ThumbTip);
        let thumb_ip = hand.landmark(HandLandmark::ThumbIp);
        let wrist = hand.landmark(HandLandmark::Wrist);
        let index_tip = hand.landmark(HandLandmark::IndexFingerTip);

        self.wrist_depths.push(wrist.z);
        self.index_positions.push((index_tip.x, index_tip.y));

        // Mirrored left/right hands flip the horizontal axis, so the thumb
        // test picks its comparison direction from the tip's side of the wrist.
        let thumb_extended = if thumb_tip.x > wrist.x {
            thumb_tip.x > thumb_ip.x
        } else {
            thumb_tip.x < thumb_ip.x
        };

        let raised = fingers_up.iter().filter(|up| **up).count();

        // First match wins; everything else is Unknown.
        let label = match (fingers_up, raised, thumb_extended) {
            (_, 0, false) => GestureLabel::Forward, // closed fist
            (_, 4, true) => GestureLabel::Stop,     // open palm
            (_, 0, true) => GestureLabel::Attack,   // fist with thumb out
            ([true, false, false, false], _, false) => GestureLabel::MoveForward,
            ([true, true, false, false], _, false) => GestureLabel::EnemySpotted,
            ([false, true, true, true], _, false) => GestureLabel::Cover,
            ([true, false, false, true], _, false) => GestureLabel::Rally,
            _ => GestureLabel::Unknown,
        };

        debug!(
            "Classified pose as {} (fingers_up={:?}, thumb_extended={})",
            label, fingers_up, thumb_extended
        );
        label
    }

    /// Wrist depth history, oldest first. Extension point, unused by
    /// classification.
    pub fn wrist_depths(&self) -> &MotionHistory<f32> {
        &self.wrist_depths
    }

    /// Index fingertip history, oldest first. Extension point, unused by
    /// classification.
    pub fn index_positions(&self) -> &MotionHistory<(f32, f32)> {
        &self.index_positions
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::landmarks::{Landmark, LANDMARK_COUNT};
    use chrono::Local;

    // Builds a snapshot with the requested finger/thumb extension flags.
    // The wrist sits at (0.5, 0.9); finger dips at y=0.5 with tips above or
    // below; the thumb is laid out on the right side of the wrist so the
    // tip.x > wrist.x comparison branch applies.
    fn snapshot(fingers_up: [bool; 4], thumb_extended: bool) -> PoseSnapshot {
        let mut points = [Landmark::default(); LANDMARK_COUNT];
        points[HandLandmark::Wrist as usize] = Landmark {
            x: 0.5,
            y: 0.9,
            z: 0.0,
        };

        let tips = [
            HandLandmark::IndexFingerTip,
            HandLandmark::MiddleFingerTip,
            HandLandmark::RingFingerTip,
            HandLandmark::PinkyTip,
        ];
        let dips = [
            HandLandmark::IndexFingerDip,
            HandLandmark::MiddleFingerDip,
            HandLandmark::RingFingerDip,
            HandLandmark::PinkyDip,
        ];
        for (i, (tip, dip)) in tips.iter().zip(dips.iter()).enumerate() {
            let x = 0.3 + 0.1 * i as f32;
            points[*dip as usize] = Landmark { x, y: 0.5, z: 0.0 };
            let tip_y = if fingers_up[i] { 0.4 } else { 0.6 };
            points[*tip as usize] = Landmark { x, y: tip_y, z: 0.0 };
        }

        points[HandLandmark::ThumbIp as usize] = Landmark {
            x: 0.6,
            y: 0.7,
            z: 0.0,
        };
        let thumb_tip_x = if thumb_extended { 0.7 } else { 0.55 };
        points[HandLandmark::ThumbTip as usize] = Landmark {
            x: thumb_tip_x,
            y: 0.65,
            z: 0.0,
        };

        PoseSnapshot::new(points, Local::now())
    }

    // Fist with the thumb on the left side of the wrist, exercising the
    // mirrored-hand branch of the thumb test.
    fn mirrored_fist(thumb_extended: bool) -> PoseSnapshot {
        let mut points = [Landmark::default(); LANDMARK_COUNT];
        points[HandLandmark::Wrist as usize] = Landmark {
            x: 0.5,
            y: 0.9,
            z: 0.0,
        };
        let tips = [
            HandLandmark::IndexFingerTip,
            HandLandmark::MiddleFingerTip,
            HandLandmark::RingFingerTip,
            HandLandmark::PinkyTip,
        ];
        let dips = [
            HandLandmark::IndexFingerDip,
            HandLandmark::MiddleFingerDip,
            HandLandmark::RingFingerDip,
            HandLandmark::PinkyDip,
        ];
        for (tip, dip) in tips.iter().zip(dips.iter()) {
            points[*dip as usize] = Landmark {
                x: 0.6,
                y: 0.5,
                z: 0.0,
            };
            points[*tip as usize] = Landmark {
                x: 0.6,
                y: 0.6,
                z: 0.0,
            };
        }
        points[HandLandmark::ThumbIp as usize] = Landmark {
            x: 0.4,
            y: 0.7,
            z: 0.0,
        };
        let thumb_tip_x = if thumb_extended { 0.3 } else { 0.45 };
        points[HandLandmark::ThumbTip as usize] = Landmark {
            x: thumb_tip_x,
            y: 0.65,
            z: 0.0,
        };
        PoseSnapshot::new(points, Local::now())
    }

    #[test]
    fn fist_is_forward() {
        let mut classifier = GestureClassifier::new();
        assert_eq!(
            classifier.classify(&snapshot([false; 4], false)),
            GestureLabel::Forward
        );
    }

    #[test]
    fn open_palm_is_stop() {
        let mut classifier = GestureClassifier::new();
        assert_eq!(
            classifier.classify(&snapshot([true; 4], true)),
            GestureLabel::Stop
        );
    }

    #[test]
    fn fist_with_thumb_out_is_attack() {
        let mut classifier = GestureClassifier::new();
        assert_eq!(
            classifier.classify(&snapshot([false; 4], true)),
            GestureLabel::Attack
        );
    }

    #[test]
    fn index_only_is_move_forward() {
        let mut classifier = GestureClassifier::new();
        assert_eq!(
            classifier.classify(&snapshot([true, false, false, false], false)),
            GestureLabel::MoveForward
        );
    }

    #[test]
    fn peace_sign_is_enemy_spotted() {
        let mut classifier = GestureClassifier::new();
        assert_eq!(
            classifier.classify(&snapshot([true, true, false, false], false)),
            GestureLabel::EnemySpotted
        );
    }

    #[test]
    fn three_back_fingers_are_cover() {
        let mut classifier = GestureClassifier::new();
        assert_eq!(
            classifier.classify(&snapshot([false, true, true, true], false)),
            GestureLabel::Cover
        );
    }

    #[test]
    fn index_and_pinky_are_rally() {
        let mut classifier = GestureClassifier::new();
        assert_eq!(
            classifier.classify(&snapshot([true, false, false, true], false)),
            GestureLabel::Rally
        );
    }

    #[test]
    fn unmatched_patterns_are_unknown() {
        let mut classifier = GestureClassifier::new();
        assert_eq!(
            classifier.classify(&snapshot([false, true, false, false], false)),
            GestureLabel::Unknown
        );
        assert_eq!(
            classifier.classify(&snapshot([true, true, true, true], false)),
            GestureLabel::Unknown
        );
        assert_eq!(
            classifier.classify(&snapshot([true, false, false, false], true)),
            GestureLabel::Unknown
        );
    }

    #[test]
    fn mirrored_hand_thumb_test_still_works() {
        let mut classifier = GestureClassifier::new();
        assert_eq!(
            classifier.classify(&mirrored_fist(false)),
            GestureLabel::Forward
        );
        assert_eq!(
            classifier.classify(&mirrored_fist(true)),
            GestureLabel::Attack
        );
    }

    #[test]
    fn classification_is_independent_of_history() {
        let mut classifier = GestureClassifier::new();
        let pose = snapshot([true, false, false, false], false);
        // Push well past both buffer capacities.
        for _ in 0..50 {
            assert_eq!(classifier.classify(&pose), GestureLabel::MoveForward);
        }
        assert_eq!(classifier.wrist_depths().len(), 10);
        assert_eq!(classifier.index_positions().len(), 20);
    }
}
