//! Textual hotkey descriptions
//!
//! Hotkeys are configured as `+`-separated tokens, e.g. `ctrl+alt+prtscn`.
//! Parsing is platform independent; `input::hotkeys` maps the result onto
//! Win32 modifier flags and virtual-key codes.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Modifier keys for hotkey combinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HotkeyModifier {
    Control,
    Alt,
    Shift,
    Windows,
}

/// Non-modifier key that triggers the hotkey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotkeyKey {
    PrintScreen,
    Space,
    /// Function key F1-F24
    Function(u8),
    /// ASCII letter (stored uppercase) or digit
    Char(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HotkeyParseError {
    #[error("Hotkey is empty")]
    Empty,
    #[error("Unknown hotkey token '{0}'")]
    UnknownToken(String),
    #[error("Hotkey has no trigger key, only modifiers")]
    MissingKey,
    #[error("Hotkey names more than one trigger key")]
    MultipleKeys,
    #[error("Modifier '{0}' is repeated")]
    DuplicateModifier(String),
}

/// A parsed hotkey: a set of modifiers plus one trigger key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeySpec {
    modifiers: Vec<HotkeyModifier>,
    key: HotkeyKey,
}

impl HotkeySpec {
    pub fn new(modifiers: &[HotkeyModifier], key: HotkeyKey) -> Self {
        let mut modifiers = modifiers.to_vec();
        modifiers.sort();
        modifiers.dedup();
        Self { modifiers, key }
    }

    /// Parses a `+`-separated, case-insensitive hotkey string
    pub fn parse(text: &str) -> Result<Self, HotkeyParseError> {
        let tokens: Vec<String> = text
            .split('+')
            .map(|token| token.trim().to_ascii_lowercase())
            .collect();

        if tokens.iter().all(|token| token.is_empty()) {
            return Err(HotkeyParseError::Empty);
        }

        let mut modifiers = Vec::new();
        let mut key = None;

        for token in tokens {
            if let Some(modifier) = parse_modifier(&token) {
                if modifiers.contains(&modifier) {
                    return Err(HotkeyParseError::DuplicateModifier(token));
                }
                modifiers.push(modifier);
            } else if let Some(parsed) = parse_key(&token) {
                if key.replace(parsed).is_some() {
                    return Err(HotkeyParseError::MultipleKeys);
                }
            } else {
                return Err(HotkeyParseError::UnknownToken(token));
            }
        }

        let key = key.ok_or(HotkeyParseError::MissingKey)?;
        Ok(Self::new(&modifiers, key))
    }

    /// Modifiers in canonical order (Control, Alt, Shift, Windows)
    pub fn modifiers(&self) -> &[HotkeyModifier] {
        &self.modifiers
    }

    pub fn key(&self) -> HotkeyKey {
        self.key
    }
}

impl FromStr for HotkeySpec {
    type Err = HotkeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for HotkeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            let name = match modifier {
                HotkeyModifier::Control => "ctrl",
                HotkeyModifier::Alt => "alt",
                HotkeyModifier::Shift => "shift",
                HotkeyModifier::Windows => "win",
            };
            write!(f, "{name}+")?;
        }

        match self.key {
            HotkeyKey::PrintScreen => write!(f, "prtscn"),
            HotkeyKey::Space => write!(f, "space"),
            HotkeyKey::Function(n) => write!(f, "f{n}"),
            HotkeyKey::Char(c) => write!(f, "{}", c.to_ascii_lowercase()),
        }
    }
}

fn parse_modifier(token: &str) -> Option<HotkeyModifier> {
    match token {
        "ctrl" | "control" => Some(HotkeyModifier::Control),
        "alt" => Some(HotkeyModifier::Alt),
        "shift" => Some(HotkeyModifier::Shift),
        "win" | "windows" | "super" => Some(HotkeyModifier::Windows),
        _ => None,
    }
}

fn parse_key(token: &str) -> Option<HotkeyKey> {
    match token {
        "prtscn" | "prtsc" | "printscreen" | "print screen" | "print" => {
            return Some(HotkeyKey::PrintScreen);
        }
        "space" => return Some(HotkeyKey::Space),
        _ => {}
    }

    if let Some(number) = token.strip_prefix('f') {
        if let Ok(n) = number.parse::<u8>() {
            return (1..=24).contains(&n).then_some(HotkeyKey::Function(n));
        }
    }

    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphanumeric() => {
            Some(HotkeyKey::Char(c.to_ascii_uppercase()))
        }
        _ => None,
    }
}
