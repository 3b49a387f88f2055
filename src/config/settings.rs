use std::path::PathBuf;

use thiserror::Error;

use crate::config::hotkey::{HotkeyKey, HotkeyModifier, HotkeyParseError, HotkeySpec};

/// OCR languages offered to the user, as (display name, Tesseract code)
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("English", "eng"),
    ("Chinese (Simplified)", "chi_sim"),
    ("Chinese (Traditional)", "chi_tra"),
    ("Japanese", "jpn"),
    ("Korean", "kor"),
    ("German", "deu"),
    ("French", "fra"),
    ("Spanish", "spa"),
    ("Russian", "rus"),
    ("Arabic", "ara"),
];

/// Looks up the display name for a language code
pub fn language_name(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(name, _)| *name)
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Unsupported OCR language '{0}'")]
    UnsupportedLanguage(String),
    #[error("Invalid hotkey: {0}")]
    InvalidHotkey(#[from] HotkeyParseError),
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Runtime settings for the capture pipeline
///
/// Owned by the host and handed to the controller; nothing here is global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSettings {
    pub hotkey: HotkeySpec,
    /// Tesseract language code, one of `SUPPORTED_LANGUAGES`
    pub language: String,
    /// Copy recognized text to the clipboard automatically
    pub auto_copy: bool,
    /// Tell the user how much text was copied
    pub show_notifications: bool,
    /// Explicit Tesseract executable; searched for when unset
    pub tesseract_path: Option<PathBuf>,
}

impl CaptureSettings {
    pub const DEFAULT_HOTKEY: &'static str = "ctrl+alt+prtscn";
    pub const DEFAULT_LANGUAGE: &'static str = "eng";

    /// Applies a partial update, leaving the settings untouched on error
    pub fn apply(&mut self, update: SettingsUpdate) -> Result<(), SettingsError> {
        let mut next = self.clone();

        if let Some(hotkey) = update.hotkey {
            next.hotkey = HotkeySpec::parse(&hotkey)?;
        }
        if let Some(language) = update.language {
            if language_name(&language).is_none() {
                return Err(SettingsError::UnsupportedLanguage(language));
            }
            next.language = language;
        }
        if let Some(auto_copy) = update.auto_copy {
            next.auto_copy = auto_copy;
        }
        if let Some(show_notifications) = update.show_notifications {
            next.show_notifications = show_notifications;
        }
        if let Some(path) = update.tesseract_path {
            next.tesseract_path = path;
        }

        *self = next;
        Ok(())
    }
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            hotkey: HotkeySpec::new(
                &[HotkeyModifier::Control, HotkeyModifier::Alt],
                HotkeyKey::PrintScreen,
            ),
            language: Self::DEFAULT_LANGUAGE.to_string(),
            auto_copy: true,
            show_notifications: false,
            tesseract_path: None,
        }
    }
}

/// Partial settings change; `None` fields are left as they are
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub hotkey: Option<String>,
    pub language: Option<String>,
    pub auto_copy: Option<bool>,
    pub show_notifications: Option<bool>,
    /// `Some(None)` clears an explicit path
    pub tesseract_path: Option<Option<PathBuf>>,
}

impl SettingsUpdate {
    pub const ENV_HOTKEY: &'static str = "SCREEN_OCR_HOTKEY";
    pub const ENV_LANGUAGE: &'static str = "SCREEN_OCR_LANGUAGE";
    pub const ENV_TESSERACT: &'static str = "SCREEN_OCR_TESSERACT";
    pub const ENV_AUTO_COPY: &'static str = "SCREEN_OCR_AUTO_COPY";
    pub const ENV_NOTIFY: &'static str = "SCREEN_OCR_NOTIFY";

    /// Reads overrides from the process environment
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds an update from `SCREEN_OCR_*` style variables
    ///
    /// Unset or blank variables leave the field alone. Values are checked
    /// later by `CaptureSettings::apply`, except booleans which are parsed here.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Ok(Self {
            hotkey: get(Self::ENV_HOTKEY),
            language: get(Self::ENV_LANGUAGE),
            auto_copy: get(Self::ENV_AUTO_COPY)
                .map(|value| parse_flag(Self::ENV_AUTO_COPY, value))
                .transpose()?,
            show_notifications: get(Self::ENV_NOTIFY)
                .map(|value| parse_flag(Self::ENV_NOTIFY, value))
                .transpose()?,
            tesseract_path: get(Self::ENV_TESSERACT).map(|path| Some(PathBuf::from(path))),
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn parse_flag(key: &'static str, value: String) -> Result<bool, SettingsError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SettingsError::InvalidValue { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tool_behaviour() {
        let settings = CaptureSettings::default();
        assert_eq!(settings.hotkey.to_string(), CaptureSettings::DEFAULT_HOTKEY);
        assert_eq!(settings.language, "eng");
        assert!(settings.auto_copy);
        assert!(!settings.show_notifications);
        assert_eq!(settings.tesseract_path, None);
    }

    #[test]
    fn supported_languages_include_english() {
        assert_eq!(language_name("eng"), Some("English"));
        assert_eq!(language_name("chi_sim"), Some("Chinese (Simplified)"));
        assert_eq!(language_name("xx"), None);
    }

    #[test]
    fn apply_updates_selected_fields() {
        let mut settings = CaptureSettings::default();
        settings
            .apply(SettingsUpdate {
                language: Some("deu".to_string()),
                show_notifications: Some(true),
                tesseract_path: Some(Some(PathBuf::from("/opt/tesseract"))),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(settings.language, "deu");
        assert!(settings.show_notifications);
        assert!(settings.auto_copy);
        assert_eq!(settings.tesseract_path, Some(PathBuf::from("/opt/tesseract")));
    }

    #[test]
    fn rejected_update_changes_nothing() {
        let mut settings = CaptureSettings::default();
        let result = settings.apply(SettingsUpdate {
            auto_copy: Some(false),
            language: Some("klingon".to_string()),
            ..Default::default()
        });

        assert!(matches!(result, Err(SettingsError::UnsupportedLanguage(_))));
        assert_eq!(settings, CaptureSettings::default());
    }

    #[test]
    fn invalid_hotkey_is_rejected() {
        let mut settings = CaptureSettings::default();
        let result = settings.apply(SettingsUpdate {
            hotkey: Some("ctrl+alt".to_string()),
            ..Default::default()
        });
        assert!(matches!(result, Err(SettingsError::InvalidHotkey(_))));
    }

    #[test]
    fn environment_overrides_are_collected() {
        let update = SettingsUpdate::from_lookup(|key| match key {
            "SCREEN_OCR_LANGUAGE" => Some("jpn".to_string()),
            "SCREEN_OCR_NOTIFY" => Some(" Yes ".to_string()),
            "SCREEN_OCR_HOTKEY" => Some("   ".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(update.language.as_deref(), Some("jpn"));
        assert_eq!(update.show_notifications, Some(true));
        assert_eq!(update.hotkey, None);
        assert_eq!(update.auto_copy, None);
        assert!(!update.is_empty());
    }

    #[test]
    fn malformed_flag_is_rejected() {
        let result = SettingsUpdate::from_lookup(|key| {
            (key == SettingsUpdate::ENV_AUTO_COPY).then(|| "maybe".to_string())
        });
        assert!(matches!(
            result,
            Err(SettingsError::InvalidValue { key: "SCREEN_OCR_AUTO_COPY", .. })
        ));
    }

    #[test]
    fn empty_environment_yields_empty_update() {
        let update = SettingsUpdate::from_lookup(|_| None).unwrap();
        assert!(update.is_empty());
    }
}
