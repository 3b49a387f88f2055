//! Tesseract command-line backend
//!
//! The image is piped to `tesseract stdin stdout -l <lang>` and the text is
//! read back from stdout, so nothing touches the filesystem.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::CaptureSettings;
use crate::ocr::{OcrEngine, OcrError};

/// Install locations checked when no explicit path is configured
pub const COMMON_INSTALL_PATHS: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
    r"C:\Tesseract-OCR\tesseract.exe",
];

/// Tesseract engine
///
/// The executable is resolved on every run so a newly installed Tesseract or
/// a changed path is picked up without restarting.
#[derive(Debug, Clone, Default)]
pub struct TesseractEngine {
    configured: Option<PathBuf>,
}

impl TesseractEngine {
    pub fn new(configured: Option<PathBuf>) -> Self {
        Self { configured }
    }

    pub fn from_settings(settings: &CaptureSettings) -> Self {
        Self::new(settings.tesseract_path.clone())
    }

    pub fn configured_path(&self) -> Option<&Path> {
        self.configured.as_deref()
    }

    /// Finds a Tesseract executable
    ///
    /// Order: the configured path, the common Windows install locations,
    /// then `tesseract` on `PATH`.
    pub fn locate(configured: Option<&Path>) -> Result<PathBuf, OcrError> {
        if let Some(path) = configured {
            if path.is_file() {
                return Ok(path.to_path_buf());
            }
            log::warn!("Configured Tesseract path {} does not exist", path.display());
        }

        if let Some(path) = COMMON_INSTALL_PATHS
            .iter()
            .map(Path::new)
            .find(|path| path.is_file())
        {
            return Ok(path.to_path_buf());
        }

        which::which("tesseract").map_err(|_| OcrError::EngineNotFound)
    }

    /// Arguments for a stdin-to-stdout recognition run
    pub fn command_args(language: &str) -> Result<Vec<OsString>, OcrError> {
        validate_language(language)?;
        Ok(["stdin", "stdout", "-l", language]
            .into_iter()
            .map(OsString::from)
            .collect())
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, png: &[u8], language: &str) -> Result<String, OcrError> {
        let args = Self::command_args(language)?;
        let executable = Self::locate(self.configured_path())?;

        log::debug!(
            "Running {} on {} bytes (lang={})",
            executable.display(),
            png.len(),
            language
        );

        let mut command = Command::new(&executable);
        command
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        let mut child = command.spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(png)?;
        }
        let output = child.wait_with_output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(OcrError::EngineFailed(if stderr.is_empty() {
                format!("exit status {}", output.status)
            } else {
                stderr
            }));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn configure(&mut self, settings: &CaptureSettings) {
        self.configured = settings.tesseract_path.clone();
    }
}

/// Accepts `[a-z_]+` codes, optionally joined with `+` for combined models
fn validate_language(language: &str) -> Result<(), OcrError> {
    let valid = !language.is_empty()
        && language
            .split('+')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase() || c == '_'));

    if valid {
        Ok(())
    } else {
        Err(OcrError::InvalidLanguage(language.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_args_pipe_through_stdio() {
        let args = TesseractEngine::command_args("eng").unwrap();
        assert_eq!(args, vec!["stdin", "stdout", "-l", "eng"]);
    }

    #[test]
    fn language_codes_are_validated() {
        assert!(TesseractEngine::command_args("chi_sim").is_ok());
        assert!(TesseractEngine::command_args("eng+deu").is_ok());
        assert!(matches!(
            TesseractEngine::command_args("eng --psm 0"),
            Err(OcrError::InvalidLanguage(_))
        ));
        assert!(TesseractEngine::command_args("").is_err());
        assert!(TesseractEngine::command_args("eng+").is_err());
        assert!(TesseractEngine::command_args("ENG").is_err());
    }

    #[test]
    fn configured_path_is_preferred() {
        // Any existing file will do; locate() does not execute it
        let exe = std::env::current_exe().unwrap();
        let located = TesseractEngine::locate(Some(&exe)).unwrap();
        assert_eq!(located, exe);
    }

    #[test]
    fn invalid_language_fails_before_spawning() {
        let engine = TesseractEngine::new(Some(PathBuf::from("/nonexistent/tesseract")));
        assert!(matches!(
            engine.recognize(&[], "../eng"),
            Err(OcrError::InvalidLanguage(_))
        ));
    }

    #[test]
    fn configure_follows_settings() {
        let mut engine = TesseractEngine::default();
        assert_eq!(engine.configured_path(), None);

        let settings = CaptureSettings {
            tesseract_path: Some(PathBuf::from("/opt/tesseract/bin/tesseract")),
            ..CaptureSettings::default()
        };
        engine.configure(&settings);
        assert_eq!(
            engine.configured_path(),
            Some(Path::new("/opt/tesseract/bin/tesseract"))
        );
    }
}
