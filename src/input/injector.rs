//! OS key-injection boundary.

use crate::keymap::bindings::KeyId;
use std::process::Command;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

// Injector errors
#[derive(Debug, Error)]
pub enum InjectorError {
    #[error("Failed to run injection command: {0}")]
    SpawnError(#[from] std::io::Error),

    #[error("Injection command rejected key '{key}' (exit status {status})")]
    CommandFailed { key: String, status: i32 },
}

/// Synchronous key-injection capability.
///
/// Calls are fire-and-forget from the controller's point of view; failures
/// are reported but never retried. Implementations: [`XdotoolInjector`] for
/// real OS input, recording doubles in tests.
pub trait KeyInjector: Send {
    /// Presses a key down and leaves it down.
    fn key_down(&mut self, key: KeyId) -> Result<(), InjectorError>;

    /// Releases a previously held key.
    fn key_up(&mut self, key: KeyId) -> Result<(), InjectorError>;

    /// Presses and immediately releases a key.
    fn press(&mut self, key: KeyId) -> Result<(), InjectorError>;
}

/// Key injection via the `xdotool` command line tool.
pub struct XdotoolInjector {
    // Pause between injected events so the target application's input
    // polling does not miss them.
    event_pause: Duration,
}

impl XdotoolInjector {
    pub fn new(event_pause: Duration) -> Self {
        Self { event_pause }
    }

    fn run(&mut self, subcommand: &str, key: KeyId) -> Result<(), InjectorError> {
        debug!("xdotool {} {}", subcommand, key);
        let status = Command::new("xdotool")
            .arg(subcommand)
            .arg(key.name())
            .status()?;
        if !status.success() {
            return Err(InjectorError::CommandFailed {
                key: key.name().to_string(),
                status: status.code().unwrap_or(-1),
            });
        }
        if !self.event_pause.is_zero() {
            std::thread::sleep(self.event_pause);
        }
        Ok(())
    }
}

impl KeyInjector for XdotoolInjector {
    fn key_down(&mut self, key: KeyId) -> Result<(), InjectorError> {
        self.run("keydown", key)
    }

    fn key_up(&mut self, key: KeyId) -> Result<(), InjectorError> {
        self.run("keyup", key)
    }

    fn press(&mut self, key: KeyId) -> Result<(), InjectorError> {
        self.run("key", key)
    }
}
