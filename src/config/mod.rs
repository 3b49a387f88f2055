//! Configuration module for screen-ocr
//!
//! Settings live in memory for the lifetime of the process. This module
//! holds the data structures the controller consults on every capture and
//! the hotkey description the platform layer registers.

pub mod hotkey;
pub mod settings;

pub use hotkey::{HotkeyKey, HotkeyModifier, HotkeyParseError, HotkeySpec};
pub use settings::{CaptureSettings, SettingsError, SettingsUpdate, SUPPORTED_LANGUAGES};
