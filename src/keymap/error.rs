//! Error definitions for the keymap module.

use thiserror::Error;

/// Errors raised by binding configurations.
#[derive(Debug, Error)]
pub enum BindingError {
    /// The binding table violates a structural requirement.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
