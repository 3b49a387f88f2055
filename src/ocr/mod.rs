//! Text recognition
//!
//! `OcrEngine` is the seam the controller talks to. The only production
//! engine shells out to Tesseract (see `tesseract`).

pub mod tesseract;

use thiserror::Error;

use crate::config::CaptureSettings;

pub use tesseract::TesseractEngine;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Tesseract executable not found; install Tesseract-OCR or set its path")]
    EngineNotFound,
    #[error("Invalid OCR language code '{0}'")]
    InvalidLanguage(String),
    #[error("Failed to run OCR engine: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("OCR engine failed: {0}")]
    EngineFailed(String),
    #[error("No text found in the selected area")]
    NoText,
}

/// Recognizes text in a PNG-encoded image
pub trait OcrEngine {
    fn recognize(&self, png: &[u8], language: &str) -> Result<String, OcrError>;

    /// Picks up changed settings; engines without options ignore it
    fn configure(&mut self, _settings: &CaptureSettings) {}
}

/// Normalizes raw engine output
///
/// Line endings become `\n`, trailing whitespace is dropped from each line,
/// form feeds are removed and the whole text is trimmed.
pub fn clean_text(raw: &str) -> String {
    raw.replace("\r\n", "\n")
        .replace('\u{c}', "")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_trims_engine_noise() {
        let raw = "  Hello  \r\nWorld \n\n\u{c}";
        assert_eq!(clean_text(raw), "Hello\nWorld");
    }

    #[test]
    fn clean_text_keeps_interior_blank_lines() {
        assert_eq!(clean_text("a\n\nb\n"), "a\n\nb");
        assert_eq!(clean_text(" \n \u{c}"), "");
    }
}
