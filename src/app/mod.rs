//! Application orchestration layer
//!
//! This module coordinates between input, domain, UI, and platform layers.
//! It manages the application state and the capture pipeline.

pub mod controller;
pub mod notify;
#[cfg(windows)]
pub mod runtime;
pub mod state;

pub use controller::{AppError, CaptureController, CaptureReport, Services};
pub use notify::{LogNotifier, Notice, Notifier};
pub use state::{AppState, StateEvent, StateMachine};
