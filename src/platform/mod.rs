//! Platform-specific Windows implementations
//!
//! This module encapsulates all Win32 API interactions and provides
//! the live display source and screen capturer to the rest of the application.

pub mod monitors;
pub mod screen;
pub mod windows;

pub use monitors::{MonitorError, MonitorInfo, Win32Displays};
pub use screen::GdiCapturer;
