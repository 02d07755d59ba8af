//! Commands and key vocabulary shared by all components.
//!
//! [`Command`] is what a [`CommandSource`](crate::traits::CommandSource)
//! delivers: show/hide signals from the user's hotkey binding and key presses
//! for the active overlay. [`KeyPress`] classifies raw keyboard input the way
//! the matcher consumes it.
//!
//! On the wire a command is one line of JSON: `"Show"`, `"Hide"`, or
//! `{"Key":"a"}` where the key string is a single character, `"escape"`, or
//! `"backspace"`.

use serde::de::Error as DeError;
use serde::ser::Serializer;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One classified key-down event.
///
/// Anything that is not a character, Escape, or Backspace never reaches this
/// type; sources drop such events before they enter the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    /// A printable character key (not yet case-normalized).
    Char(char),
    /// Escape — dismiss the overlay.
    Escape,
    /// Backspace — drop the buffered character.
    Backspace,
}

impl fmt::Display for KeyPress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPress::Char(c) => write!(f, "{}", c),
            KeyPress::Escape => write!(f, "escape"),
            KeyPress::Backspace => write!(f, "backspace"),
        }
    }
}

/// Parse a key string (case-insensitive for the control-key names).
fn parse_key(s: &str) -> Option<KeyPress> {
    let trimmed = s.trim();
    let lower = trimmed.to_lowercase();
    match lower.as_str() {
        "escape" | "esc" => Some(KeyPress::Escape),
        "backspace" => Some(KeyPress::Backspace),
        _ => {
            let mut chars = trimmed.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(KeyPress::Char(c)),
                _ => None,
            }
        }
    }
}

impl Serialize for KeyPress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for KeyPress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_key(&s).ok_or_else(|| DeError::custom(format!("invalid key: {:?}", s)))
    }
}

/// Every action a command source can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Show the overlay. A no-op while one is already visible.
    ///
    /// On the wire this is the JSON string `"Show"`. The user's compositor
    /// or hotkey daemon sends it when the configured key combination fires.
    Show,

    /// Close the overlay with no pointer action.
    ///
    /// Encoded as the JSON string `"Hide"`.
    Hide,

    /// A key press for the active overlay.
    ///
    /// Encoded as `{"Key":"a"}` / `{"Key":"escape"}` / `{"Key":"backspace"}`.
    Key(KeyPress),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_display() {
        assert_eq!(KeyPress::Char('a').to_string(), "a");
        assert_eq!(KeyPress::Escape.to_string(), "escape");
        assert_eq!(KeyPress::Backspace.to_string(), "backspace");
    }

    #[test]
    fn parse_char_key() {
        assert_eq!(parse_key("a"), Some(KeyPress::Char('a')));
        assert_eq!(parse_key("Q"), Some(KeyPress::Char('Q')));
        assert_eq!(parse_key("7"), Some(KeyPress::Char('7')));
    }

    #[test]
    fn parse_control_keys_case_insensitive() {
        assert_eq!(parse_key("escape"), Some(KeyPress::Escape));
        assert_eq!(parse_key("Esc"), Some(KeyPress::Escape));
        assert_eq!(parse_key("BACKSPACE"), Some(KeyPress::Backspace));
    }

    #[test]
    fn parse_rejects_multi_char_strings() {
        assert_eq!(parse_key("ab"), None);
        assert_eq!(parse_key(""), None);
    }

    #[test]
    fn command_wire_format() {
        assert_eq!(serde_json::to_string(&Command::Show).unwrap(), r#""Show""#);
        assert_eq!(serde_json::to_string(&Command::Hide).unwrap(), r#""Hide""#);
        assert_eq!(
            serde_json::to_string(&Command::Key(KeyPress::Char('a'))).unwrap(),
            r#"{"Key":"a"}"#
        );
    }

    #[test]
    fn command_round_trip() {
        for cmd in [
            Command::Show,
            Command::Hide,
            Command::Key(KeyPress::Char('z')),
            Command::Key(KeyPress::Escape),
            Command::Key(KeyPress::Backspace),
        ] {
            let json = serde_json::to_string(&cmd).unwrap();
            let back: Command = serde_json::from_str(&json).unwrap();
            assert_eq!(back, cmd);
        }
    }

    #[test]
    fn key_accepts_friendly_spellings() {
        let cmd: Command = serde_json::from_str(r#"{"Key":"esc"}"#).unwrap();
        assert_eq!(cmd, Command::Key(KeyPress::Escape));
        let cmd: Command = serde_json::from_str(r#"{"Key":"Backspace"}"#).unwrap();
        assert_eq!(cmd, Command::Key(KeyPress::Backspace));
    }

    #[test]
    fn invalid_key_string_fails() {
        assert!(serde_json::from_str::<Command>(r#"{"Key":"ctrl"}"#).is_err());
        assert!(serde_json::from_str::<Command>(r#"{"Key":""}"#).is_err());
    }
}
