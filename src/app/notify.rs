//! User-facing notices
//!
//! The controller never talks to a toast or dialog API directly. It emits a
//! `Notice` and the host decides how to surface it.

/// Something the user should be told about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Text was copied to the clipboard
    Copied { chars: usize },
    /// The user dismissed the selection
    Cancelled,
    /// No display could be enumerated when the hotkey fired
    NoDisplays,
    /// The selection did not cover any pixels of the chosen monitor
    NoRegion,
    CaptureFailed(String),
    OcrFailed(String),
    /// OCR ran but found nothing
    NoText,
    ClipboardFailed(String),
    /// "Show last result" was requested before any successful capture
    NoLastResult,
}

impl Notice {
    pub fn title(&self) -> &'static str {
        match self {
            Notice::Copied { .. } => "Text Copied",
            Notice::Cancelled => "Capture Cancelled",
            Notice::NoDisplays | Notice::NoRegion | Notice::CaptureFailed(_) => "Capture Error",
            Notice::OcrFailed(_) | Notice::NoText => "OCR Error",
            Notice::ClipboardFailed(_) => "Clipboard Error",
            Notice::NoLastResult => "No Result",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Notice::Copied { chars } => format!("Copied {chars} characters to clipboard."),
            Notice::Cancelled => "Screen capture was cancelled.".to_string(),
            Notice::NoDisplays => "No displays are available for capture.".to_string(),
            Notice::NoRegion => "The selected area is outside every screen.".to_string(),
            Notice::CaptureFailed(reason) => format!("Failed to capture screen: {reason}"),
            Notice::OcrFailed(reason) => format!("Text recognition failed: {reason}"),
            Notice::NoText => "No text found in the selected area.".to_string(),
            Notice::ClipboardFailed(reason) => format!("Failed to copy text: {reason}"),
            Notice::NoLastResult => "No previous OCR result available.".to_string(),
        }
    }

    /// True for notices reporting a failure
    pub fn is_error(&self) -> bool {
        !matches!(
            self,
            Notice::Copied { .. } | Notice::Cancelled | Notice::NoLastResult
        )
    }
}

/// Surfaces notices to the user
pub trait Notifier {
    fn notify(&mut self, notice: &Notice);
}

/// Writes notices to the log
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, notice: &Notice) {
        if notice.is_error() {
            log::warn!("{}: {}", notice.title(), notice.message());
        } else {
            log::info!("{}: {}", notice.title(), notice.message());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copied_notice_reports_character_count() {
        let notice = Notice::Copied { chars: 42 };
        assert_eq!(notice.message(), "Copied 42 characters to clipboard.");
        assert!(!notice.is_error());
    }

    #[test]
    fn failures_are_errors() {
        assert!(Notice::NoText.is_error());
        assert!(Notice::CaptureFailed("boom".into()).is_error());
        assert_eq!(Notice::OcrFailed("x".into()).title(), "OCR Error");
        assert!(!Notice::Cancelled.is_error());
    }

    #[test]
    fn no_last_result_message() {
        assert_eq!(
            Notice::NoLastResult.message(),
            "No previous OCR result available."
        );
    }
}
