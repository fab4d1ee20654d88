//! Keyboard input consumed by the text-edit sub-state.

use serde::{Deserialize, Serialize};

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key pressed.
    pub shift: bool,
    /// Control key pressed.
    pub ctrl: bool,
    /// Alt/Option key pressed.
    pub alt: bool,
    /// Meta/Command key pressed.
    pub meta: bool,
}

/// A key press delivered to an editing text surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", content = "text")]
pub enum EditKey {
    /// Inserted text (one or more characters).
    Text(String),
    /// Enter / Return.
    Enter,
    /// Escape.
    Escape,
    /// Delete the character before the cursor.
    Backspace,
    /// Delete the character after the cursor.
    Delete,
    /// Move the cursor one character left.
    Left,
    /// Move the cursor one character right.
    Right,
    /// Move the cursor to the start of the buffer.
    Home,
    /// Move the cursor to the end of the buffer.
    End,
}

impl EditKey {
    /// Map a browser-style key name to an edit key.
    ///
    /// Single printable characters become [`EditKey::Text`]; unknown named
    /// keys return `None`.
    #[must_use]
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "Enter" => Some(Self::Enter),
            "Escape" | "Esc" => Some(Self::Escape),
            "Backspace" => Some(Self::Backspace),
            "Delete" => Some(Self::Delete),
            "ArrowLeft" => Some(Self::Left),
            "ArrowRight" => Some(Self::Right),
            "Home" => Some(Self::Home),
            "End" => Some(Self::End),
            other if other.chars().count() == 1 => Some(Self::Text(other.to_string())),
            _ => None,
        }
    }
}
