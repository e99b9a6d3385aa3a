//! Frame-driven control pipeline tying detector, classifier and controller
//! together.

pub mod engine;

pub use engine::{ControlEngine, ControlEngineHandle, ControlError, EngineState};
