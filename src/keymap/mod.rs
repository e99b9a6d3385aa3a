//! Gesture-to-key mapping: static bindings plus the debounced hold
//! controller that keeps the OS key state consistent.

pub mod bindings;
pub mod controller;
pub mod error;

pub use bindings::{BindingConfig, KeyBinding, KeyId};
pub use controller::{ControllerSettings, ControllerState, KeyHoldController};
pub use error::BindingError;
