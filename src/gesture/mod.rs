//! Gesture classification from hand poses.

pub mod classifier;
pub mod history;

pub use classifier::{GestureClassifier, GestureLabel};
pub use history::MotionHistory;
