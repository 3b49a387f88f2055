//! Global hotkey registration
//!
//! Hotkeys are registered against the calling thread (no window), so
//! `WM_HOTKEY` arrives in that thread's message queue. Registrations follow
//! RAII and are released on drop.

use windows::Win32::Foundation::HWND;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS, MOD_ALT, MOD_CONTROL, MOD_NOREPEAT,
    MOD_SHIFT, MOD_WIN,
};

use crate::config::hotkey::{HotkeyKey, HotkeyModifier, HotkeySpec};

/// Hotkey registration errors
#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    #[error("Failed to register hotkey {hotkey}: {reason}")]
    HotkeyRegistrationFailed { hotkey: String, reason: String },

    #[error("Failed to unregister hotkey: {id}")]
    HotkeyUnregistrationFailed { id: i32 },
}

/// Win32 modifier flags for a hotkey; auto-repeat is always suppressed
pub fn modifier_flags(spec: &HotkeySpec) -> HOT_KEY_MODIFIERS {
    spec.modifiers()
        .iter()
        .fold(MOD_NOREPEAT, |flags, modifier| {
            flags
                | match modifier {
                    HotkeyModifier::Control => MOD_CONTROL,
                    HotkeyModifier::Alt => MOD_ALT,
                    HotkeyModifier::Shift => MOD_SHIFT,
                    HotkeyModifier::Windows => MOD_WIN,
                }
        })
}

/// Virtual-key code of the trigger key
pub fn virtual_key(key: HotkeyKey) -> u32 {
    match key {
        HotkeyKey::PrintScreen => 0x2C, // VK_SNAPSHOT
        HotkeyKey::Space => 0x20,
        HotkeyKey::Function(n) => 0x70 + u32::from(n.saturating_sub(1)),
        // VK codes of letters and digits are their uppercase ASCII values
        HotkeyKey::Char(c) => c.to_ascii_uppercase() as u32,
    }
}

/// A hotkey registered for the current thread
#[derive(Debug)]
pub struct ThreadHotkey {
    id: i32,
    spec: HotkeySpec,
    registered: bool,
}

impl ThreadHotkey {
    pub fn register(id: i32, spec: &HotkeySpec) -> Result<Self, HotkeyError> {
        unsafe { RegisterHotKey(HWND(0), id, modifier_flags(spec), virtual_key(spec.key())) }
            .map_err(|e| HotkeyError::HotkeyRegistrationFailed {
                hotkey: spec.to_string(),
                reason: e.to_string(),
            })?;

        log::info!("Registered hotkey {spec} (id {id})");
        Ok(Self {
            id,
            spec: spec.clone(),
            registered: true,
        })
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn spec(&self) -> &HotkeySpec {
        &self.spec
    }

    /// True when a `WM_HOTKEY` wParam refers to this registration
    pub fn matches(&self, wparam: usize) -> bool {
        wparam == self.id as usize
    }

    pub fn unregister(mut self) -> Result<(), HotkeyError> {
        self.registered = false;
        unsafe { UnregisterHotKey(HWND(0), self.id) }
            .map_err(|_| HotkeyError::HotkeyUnregistrationFailed { id: self.id })
    }
}

impl Drop for ThreadHotkey {
    fn drop(&mut self) {
        if self.registered && unsafe { UnregisterHotKey(HWND(0), self.id) }.is_err() {
            log::warn!("Failed to unregister hotkey {}", self.spec);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_hotkey_maps_to_win32_codes() {
        let spec = HotkeySpec::parse("ctrl+alt+prtscn").unwrap();
        assert_eq!(modifier_flags(&spec), MOD_NOREPEAT | MOD_CONTROL | MOD_ALT);
        assert_eq!(virtual_key(spec.key()), 0x2C);
    }

    #[test]
    fn key_codes() {
        assert_eq!(virtual_key(HotkeyKey::Function(1)), 0x70);
        assert_eq!(virtual_key(HotkeyKey::Function(12)), 0x7B);
        assert_eq!(virtual_key(HotkeyKey::Char('S')), 0x53);
        assert_eq!(virtual_key(HotkeyKey::Char('7')), 0x37);
        assert_eq!(virtual_key(HotkeyKey::Space), 0x20);
    }

    #[test]
    fn registration_round_trip() {
        let spec = HotkeySpec::parse("ctrl+alt+shift+f12").unwrap();
        // Registration can fail when another process owns the combination
        match ThreadHotkey::register(0x5C01, &spec) {
            Ok(hotkey) => {
                assert!(hotkey.matches(0x5C01));
                hotkey.unregister().unwrap();
            }
            Err(e) => println!("Hotkey registration failed (expected): {e}"),
        }
    }
}
