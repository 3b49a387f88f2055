//! Screen region OCR
//!
//! Press a global hotkey, drag a rectangle anywhere on the desktop and the
//! text inside it is recognized with Tesseract and copied to the clipboard.
//! The selection and monitor logic is platform independent; the Win32
//! surfaces (hotkey, overlay, GDI capture) live behind `cfg(windows)`.

pub mod app;
pub mod capture;
pub mod clipboard;
pub mod config;
pub mod domain;
pub mod ocr;
pub mod ui;

#[cfg(windows)]
pub mod input;
#[cfg(windows)]
pub mod platform;
