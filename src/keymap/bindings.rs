//! Static gesture-to-key bindings.

use crate::gesture::GestureLabel;
use crate::keymap::error::BindingError;
use std::collections::HashMap;
use std::fmt;

/// Identifier for a key as understood by the injection boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(&'static str);

impl KeyId {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub const KEY_SHIFT: KeyId = KeyId::new("shift");
pub const KEY_W: KeyId = KeyId::new("w");
pub const KEY_K: KeyId = KeyId::new("k");
pub const KEY_J: KeyId = KeyId::new("j");
pub const KEY_C: KeyId = KeyId::new("c");
pub const KEY_L: KeyId = KeyId::new("l");

/// What a gesture does at the keyboard.
///
/// Resolved by exhaustive match in the controller; there is no null
/// sentinel, a gesture without an effect maps to [`KeyBinding::NoAction`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyBinding {
    /// Keys pressed down and kept down until released by `ReleaseAll`.
    Hold(Vec<KeyId>),

    /// A single press-and-release tap.
    PressOnce(KeyId),

    /// Release every currently held key.
    ReleaseAll,

    /// Gesture deliberately unbound.
    NoAction,
}

/// Configuration mapping each gesture to its key binding.
#[derive(Clone, Debug)]
pub struct BindingConfig {
    bindings: HashMap<GestureLabel, KeyBinding>,

    /// Name of the configuration
    name: String,
}

impl BindingConfig {
    /// Creates the standard binding table.
    pub fn default_config() -> Self {
        let mut bindings = HashMap::new();
        bindings.insert(
            GestureLabel::Forward,
            KeyBinding::Hold(vec![KEY_SHIFT, KEY_W]),
        );
        bindings.insert(GestureLabel::MoveForward, KeyBinding::Hold(vec![KEY_W]));
        bindings.insert(GestureLabel::Attack, KeyBinding::PressOnce(KEY_K));
        bindings.insert(GestureLabel::EnemySpotted, KeyBinding::PressOnce(KEY_J));
        bindings.insert(GestureLabel::Cover, KeyBinding::PressOnce(KEY_C));
        bindings.insert(GestureLabel::Rally, KeyBinding::PressOnce(KEY_L));
        bindings.insert(GestureLabel::Stop, KeyBinding::ReleaseAll);
        bindings.insert(GestureLabel::Unknown, KeyBinding::NoAction);

        BindingConfig {
            bindings,
            name: "Default-Bindings".to_string(),
        }
    }

    /// Resolves the binding for a label. Unmapped labels act as `NoAction`.
    pub fn binding(&self, label: GestureLabel) -> KeyBinding {
        self.bindings
            .get(&label)
            .cloned()
            .unwrap_or(KeyBinding::NoAction)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validates structural requirements of the table.
    pub fn validate(&self) -> Result<(), BindingError> {
        match self.bindings.get(&GestureLabel::Stop) {
            Some(KeyBinding::ReleaseAll) => {}
            _ => {
                return Err(BindingError::ConfigError(
                    "Stop must release all held keys".to_string(),
                ))
            }
        }

        for (label, binding) in &self.bindings {
            if let KeyBinding::Hold(keys) = binding {
                if keys.is_empty() {
                    return Err(BindingError::ConfigError(format!(
                        "Empty hold set for gesture {}",
                        label
                    )));
                }
            }
        }

        Ok(())
    }

    /// Human-readable listing for the startup banner, in a fixed order.
    pub fn describe(&self) -> Vec<String> {
        const BANNER_ORDER: [GestureLabel; 7] = [
            GestureLabel::Forward,
            GestureLabel::Stop,
            GestureLabel::Attack,
            GestureLabel::MoveForward,
            GestureLabel::EnemySpotted,
            GestureLabel::Cover,
            GestureLabel::Rally,
        ];

        let mut lines = Vec::new();
        for label in BANNER_ORDER {
            let line = match self.binding(label) {
                KeyBinding::Hold(keys) => {
                    let joined: Vec<&str> = keys.iter().map(|k| k.name()).collect();
                    format!("{}: holding '{}' continuously", label, joined.join("+"))
                }
                KeyBinding::PressOnce(key) => format!("{}: pressing '{}' once", label, key),
                KeyBinding::ReleaseAll => format!("{}: releasing all held keys", label),
                KeyBinding::NoAction => continue,
            };
            lines.push(line);
        }
        lines
    }
}
