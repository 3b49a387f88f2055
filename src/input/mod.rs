//! Input handling
//!
//! Registers the global capture hotkey. Pointer and Escape input reach the
//! app through the selection overlay window.

pub mod hotkeys;

pub use hotkeys::{HotkeyError, ThreadHotkey};
