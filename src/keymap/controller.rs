//! Debounced key-hold state machine.
//!
//! Converts the noisy per-frame gesture stream into stable key presses,
//! holds and releases. The cooldown window suppresses classification jitter;
//! the `Stop` gesture is the sole release path during normal operation, with
//! [`KeyHoldController::drain`] as the unconditional shutdown counterpart.

use crate::gesture::GestureLabel;
use crate::input::KeyInjector;
use crate::keymap::bindings::{BindingConfig, KeyBinding, KeyId};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

// Controller settings
#[derive(Clone, Debug)]
pub struct ControllerSettings {
    /// Minimum time between accepted gesture transitions.
    pub gesture_cooldown: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            gesture_cooldown: Duration::from_millis(500),
        }
    }
}

/// The single long-lived mutable state of the control pipeline.
///
/// Invariant: `active_keys` equals the set of keys the OS currently believes
/// are held down. Every controller method restores that equality before
/// returning; a violation here means a stuck key in the target application.
#[derive(Clone, Debug)]
pub struct ControllerState {
    pub current_gesture: GestureLabel,
    pub active_keys: BTreeSet<KeyId>,
    pub last_transition: Option<Instant>,
}

impl ControllerState {
    fn new() -> Self {
        Self {
            current_gesture: GestureLabel::Unknown,
            active_keys: BTreeSet::new(),
            last_transition: None,
        }
    }
}

/// Stateful gesture-to-key controller. Single writer of the injection
/// boundary.
pub struct KeyHoldController {
    settings: ControllerSettings,
    bindings: BindingConfig,
    state: ControllerState,
    injector: Box<dyn KeyInjector>,
}

impl KeyHoldController {
    pub fn new(
        settings: ControllerSettings,
        bindings: BindingConfig,
        injector: Box<dyn KeyInjector>,
    ) -> Self {
        info!(
            "Creating key-hold controller with bindings '{}' and cooldown {:?}",
            bindings.name(),
            settings.gesture_cooldown
        );
        Self {
            settings,
            bindings,
            state: ControllerState::new(),
            injector,
        }
    }

    pub fn current_gesture(&self) -> GestureLabel {
        self.state.current_gesture
    }

    pub fn active_keys(&self) -> &BTreeSet<KeyId> {
        &self.state.active_keys
    }

    /// Feeds one classified gesture into the state machine.
    ///
    /// A label is accepted only if it differs from the current gesture, is
    /// not `Unknown`, and the cooldown window has elapsed since the last
    /// accepted transition. Anything else is a no-op: no state change, no
    /// key events. A fresh controller has no pending cooldown, so the first
    /// eligible gesture is never delayed.
    pub fn on_gesture(&mut self, label: GestureLabel, now: Instant) {
        if label == self.state.current_gesture || label == GestureLabel::Unknown {
            return;
        }
        if let Some(last) = self.state.last_transition {
            if now.duration_since(last) < self.settings.gesture_cooldown {
                debug!("Gesture {} suppressed by cooldown", label);
                return;
            }
        }

        match self.bindings.binding(label) {
            KeyBinding::ReleaseAll => {
                self.release_all();
                info!("Action triggered: {} - released all keys", label);
            }
            KeyBinding::Hold(keys) => {
                for key in &keys {
                    if self.state.active_keys.contains(key) {
                        // Already physically down, never re-trigger.
                        continue;
                    }
                    match self.injector.key_down(*key) {
                        Ok(()) => {
                            self.state.active_keys.insert(*key);
                        }
                        Err(e) => {
                            // The OS never saw the press, so the key stays
                            // out of the active set.
                            error!("Failed to press key {}: {}", key, e);
                        }
                    }
                }
                info!(
                    "Action triggered: {} - holding keys: {:?}",
                    label, self.state.active_keys
                );
            }
            KeyBinding::PressOnce(key) => {
                // Discrete tap, active_keys untouched.
                match self.injector.press(key) {
                    Ok(()) => info!("Action triggered: {} - pressed key: {}", label, key),
                    Err(e) => error!("Failed to press key {}: {}", key, e),
                }
            }
            KeyBinding::NoAction => {
                debug!("Gesture {} has no key binding", label);
            }
        }

        self.state.current_gesture = label;
        self.state.last_transition = Some(now);
    }

    /// Releases every held key unconditionally, ignoring the cooldown and
    /// gesture guards. Must run before the process exits, on both the quit
    /// signal and capture loss.
    pub fn drain(&mut self) {
        if self.state.active_keys.is_empty() {
            debug!("Drain requested with no held keys");
        } else {
            info!("Draining {} held keys", self.state.active_keys.len());
        }
        self.release_all();
        self.state.current_gesture = GestureLabel::Unknown;
    }

    fn release_all(&mut self) {
        // A failed release is logged but the key leaves the tracked set
        // anyway, so the set never exceeds what the OS could still hold.
        let keys: Vec<KeyId> = self.state.active_keys.iter().copied().collect();
        for key in keys {
            if let Err(e) = self.injector.key_up(key) {
                error!("Failed to release key {}: {}", key, e);
            }
            self.state.active_keys.remove(&key);
        }
    }
}
