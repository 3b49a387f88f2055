//! Application controller and coordination layer
//!
//! The controller drives one capture at a time: it snapshots the display
//! layout when the hotkey fires, feeds pointer input to the selection
//! session, and runs capture, OCR and clipboard once a region is chosen.
//! Every collaborator sits behind a trait so the whole flow runs in tests.

use thiserror::Error;

use crate::app::notify::{Notice, Notifier};
use crate::app::state::{AppState, StateEvent, StateMachine};
use crate::capture::{CaptureError, DisplaySource, ScreenCapturer};
use crate::clipboard::{ClipboardError, ClipboardSink};
use crate::config::{CaptureSettings, SettingsError, SettingsUpdate};
use crate::domain::core::{Point, Rect};
use crate::domain::selection::{SessionEvent, SessionOutcome};
use crate::domain::topology::{CaptureInstruction, ScreenTopology, TopologyError};
use crate::ocr::{clean_text, OcrEngine, OcrError};

/// Application errors that can occur during controller operations
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),
    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
    #[cfg(windows)]
    #[error("Hotkey error: {0}")]
    Hotkey(#[from] crate::input::hotkeys::HotkeyError),
    #[cfg(windows)]
    #[error("Overlay error: {0}")]
    Overlay(#[from] crate::ui::overlay::OverlayError),
}

impl AppError {
    /// The notice shown to the user for this failure, if any
    pub fn notice(&self) -> Option<Notice> {
        match self {
            AppError::Capture(e) => Some(Notice::CaptureFailed(e.to_string())),
            AppError::Topology(TopologyError::NoDisplays) => Some(Notice::NoDisplays),
            AppError::Topology(TopologyError::EmptyAfterClamp { .. }) => Some(Notice::NoRegion),
            AppError::Ocr(OcrError::NoText) => Some(Notice::NoText),
            AppError::Ocr(e) => Some(Notice::OcrFailed(e.to_string())),
            AppError::Clipboard(e) => Some(Notice::ClipboardFailed(e.to_string())),
            _ => None,
        }
    }
}

/// How a finished selection ended
#[derive(Debug)]
pub enum CaptureReport {
    /// Text was recognized; `copied` is false when auto-copy is off
    Recognized { text: String, copied: bool },
    Cancelled,
    Failed(AppError),
}

/// External services the controller depends on
pub struct Services {
    pub displays: Box<dyn DisplaySource>,
    pub capturer: Box<dyn ScreenCapturer>,
    pub ocr: Box<dyn OcrEngine>,
    pub clipboard: Box<dyn ClipboardSink>,
    pub notifier: Box<dyn Notifier>,
}

/// Main application controller
///
/// Owns the settings and the last recognized text. Nothing here is global;
/// the host creates one controller and routes its events into it.
pub struct CaptureController {
    state: AppState,
    settings: CaptureSettings,
    services: Services,
    last_result: Option<String>,
}

impl CaptureController {
    pub fn new(settings: CaptureSettings, services: Services) -> Self {
        Self {
            state: AppState::default(),
            settings,
            services,
            last_result: None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    pub fn is_selecting(&self) -> bool {
        self.state.is_selecting()
    }

    /// True while the selection surface should be on screen
    pub fn surface_visible(&self) -> bool {
        self.state
            .session()
            .is_some_and(|session| session.surface_visible())
    }

    /// Rectangle being dragged, in global coordinates
    pub fn selection_rect(&self) -> Option<Rect> {
        self.state.session().and_then(|session| session.current_rect())
    }

    /// Desktop area the selection surface must cover
    pub fn overlay_geometry(&self) -> Option<Rect> {
        self.state.session().map(|session| session.overlay_geometry())
    }

    /// Most recent successfully recognized text
    pub fn last_result(&self) -> Option<&str> {
        self.last_result.as_deref()
    }

    /// Starts a selection over a fresh snapshot of the displays
    ///
    /// A session that is already running is cancelled first.
    pub fn request_capture(&mut self) -> Result<(), AppError> {
        let topology = match self.snapshot() {
            Ok(topology) => topology,
            Err(err) => {
                log::error!("Cannot start capture: {err}");
                self.report(&err);
                return Err(err);
            }
        };

        log::info!(
            "Capture requested, {} monitors spanning {:?}",
            topology.monitor_count(),
            topology.combined_geometry()
        );

        let transition = StateMachine::process_event(
            std::mem::take(&mut self.state),
            StateEvent::CaptureRequested(topology),
        );
        if transition.superseded {
            log::info!("Previous selection cancelled by a new capture request");
        }
        self.state = transition.state;
        Ok(())
    }

    pub fn pointer_down(&mut self, point: Point) -> Option<CaptureReport> {
        self.handle_session_event(SessionEvent::PointerDown(point))
    }

    pub fn pointer_move(&mut self, point: Point) -> Option<CaptureReport> {
        self.handle_session_event(SessionEvent::PointerMove(point))
    }

    pub fn pointer_up(&mut self, point: Point) -> Option<CaptureReport> {
        self.handle_session_event(SessionEvent::PointerUp(point))
    }

    pub fn cancel(&mut self) -> Option<CaptureReport> {
        self.handle_session_event(SessionEvent::Cancel)
    }

    /// Feeds input to the running session; returns a report once it finishes
    pub fn handle_session_event(&mut self, event: SessionEvent) -> Option<CaptureReport> {
        let transition = StateMachine::process_event(
            std::mem::take(&mut self.state),
            StateEvent::Session(event),
        );
        self.state = transition.state;
        transition.outcome.map(|outcome| self.finish(outcome))
    }

    /// Copies the last result to the clipboard again
    pub fn show_last_result(&mut self) -> Result<(), AppError> {
        let Some(text) = self.last_result.clone() else {
            self.services.notifier.notify(&Notice::NoLastResult);
            return Ok(());
        };

        if let Err(e) = self.services.clipboard.copy_text(&text) {
            let err = AppError::from(e);
            self.report(&err);
            return Err(err);
        }
        self.services.notifier.notify(&Notice::Copied {
            chars: text.chars().count(),
        });
        Ok(())
    }

    /// Validates and applies a settings change
    pub fn update_settings(&mut self, update: SettingsUpdate) -> Result<(), AppError> {
        self.settings.apply(update)?;
        self.services.ocr.configure(&self.settings);
        log::info!(
            "Settings updated: hotkey={} language={} auto_copy={} notifications={}",
            self.settings.hotkey,
            self.settings.language,
            self.settings.auto_copy,
            self.settings.show_notifications
        );
        Ok(())
    }

    fn snapshot(&self) -> Result<ScreenTopology, AppError> {
        let geometries = self.services.displays.displays()?;
        Ok(ScreenTopology::from_geometries(geometries)?)
    }

    fn finish(&mut self, outcome: SessionOutcome) -> CaptureReport {
        match outcome {
            SessionOutcome::Cancelled => {
                log::info!("Selection cancelled");
                self.services.notifier.notify(&Notice::Cancelled);
                CaptureReport::Cancelled
            }
            SessionOutcome::Unresolved(err) => {
                log::warn!("Selection not capturable: {err}");
                let err = AppError::from(err);
                self.report(&err);
                CaptureReport::Failed(err)
            }
            SessionOutcome::Resolved(instruction) => match self.run_pipeline(&instruction) {
                Ok(report) => report,
                Err(err) => {
                    log::error!("Capture pipeline failed: {err}");
                    self.report(&err);
                    CaptureReport::Failed(err)
                }
            },
        }
    }

    fn run_pipeline(&mut self, instruction: &CaptureInstruction) -> Result<CaptureReport, AppError> {
        log::info!(
            "Capturing {:?} on monitor {} (global {:?})",
            instruction.local,
            instruction.monitor.index,
            instruction.global_rect()
        );

        let image = self.services.capturer.capture(instruction)?;
        let png = image.to_png()?;
        let raw = self
            .services
            .ocr
            .recognize(&png, &self.settings.language)?;

        let text = clean_text(&raw);
        if text.is_empty() {
            return Err(OcrError::NoText.into());
        }

        let chars = text.chars().count();
        log::info!("Recognized {chars} characters");
        self.last_result = Some(text.clone());

        let copied = if self.settings.auto_copy {
            self.services.clipboard.copy_text(&text)?;
            if self.settings.show_notifications {
                self.services.notifier.notify(&Notice::Copied { chars });
            }
            true
        } else {
            false
        };

        Ok(CaptureReport::Recognized { text, copied })
    }

    fn report(&mut self, err: &AppError) {
        if let Some(notice) = err.notice() {
            self.services.notifier.notify(&notice);
        }
    }
}
