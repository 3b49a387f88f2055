//! Windows host for the capture controller
//!
//! Registers the capture hotkey on the main thread, owns the selection
//! overlay and pumps the thread's message queue. Hotkey presses and overlay
//! input are routed into the [`CaptureController`]; after every message the
//! overlay is brought in line with the controller state.

use std::thread;
use std::time::Duration;

use windows::Win32::Foundation::HWND;
use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, GetMessageW, ShowWindow, TranslateMessage, MSG, SW_HIDE, WM_HOTKEY,
};

use crate::app::controller::{AppError, CaptureController, CaptureReport, Services};
use crate::app::notify::LogNotifier;
use crate::capture::{CaptureError, CapturedImage, ScreenCapturer};
use crate::clipboard::ArboardClipboard;
use crate::config::settings::language_name;
use crate::config::CaptureSettings;
use crate::domain::topology::CaptureInstruction;
use crate::input::hotkeys::ThreadHotkey;
use crate::ocr::TesseractEngine;
use crate::platform::monitors::Win32Displays;
use crate::platform::screen::GdiCapturer;
use crate::platform::windows::{enable_dpi_awareness, system_dpi_scale};
use crate::ui::overlay::{take_events, OverlayEvent, SelectionOverlay};
use crate::ui::renderer::{OverlayStyle, SelectionRenderer};

/// Identifier of the capture hotkey registration
pub const CAPTURE_HOTKEY_ID: i32 = 1;

/// Time for the compositor to drop the overlay before pixels are read
const OVERLAY_HIDE_DELAY: Duration = Duration::from_millis(80);

/// Hides the selection overlay before delegating to the real capturer
///
/// The pipeline runs while the overlay is still on screen; without this the
/// dimmed overlay would end up in the captured pixels.
pub struct OverlayAwareCapturer<C> {
    overlay: HWND,
    inner: C,
}

impl<C: ScreenCapturer> OverlayAwareCapturer<C> {
    pub fn new(overlay: HWND, inner: C) -> Self {
        Self { overlay, inner }
    }
}

impl<C: ScreenCapturer> ScreenCapturer for OverlayAwareCapturer<C> {
    fn capture(&self, instruction: &CaptureInstruction) -> Result<CapturedImage, CaptureError> {
        unsafe {
            ShowWindow(self.overlay, SW_HIDE);
        }
        thread::sleep(OVERLAY_HIDE_DELAY);
        self.inner.capture(instruction)
    }
}

/// Runs the hotkey-driven capture loop until the thread receives `WM_QUIT`
pub fn run(settings: CaptureSettings) -> Result<(), AppError> {
    enable_dpi_awareness();

    match TesseractEngine::locate(settings.tesseract_path.as_deref()) {
        Ok(path) => log::info!("Using Tesseract at {}", path.display()),
        Err(e) => log::warn!("{e}; captures will fail until Tesseract is installed"),
    }

    let hotkey = ThreadHotkey::register(CAPTURE_HOTKEY_ID, &settings.hotkey)?;

    let renderer = SelectionRenderer::new(OverlayStyle::scaled(system_dpi_scale()));
    if !renderer.has_font() {
        log::warn!("No system font found, overlay labels will not be drawn");
    }
    let mut overlay = SelectionOverlay::new(renderer)?;

    let services = Services {
        displays: Box::new(Win32Displays),
        capturer: Box::new(OverlayAwareCapturer::new(overlay.hwnd(), GdiCapturer)),
        ocr: Box::new(TesseractEngine::from_settings(&settings)),
        clipboard: Box::new(ArboardClipboard::new()),
        notifier: Box::new(LogNotifier),
    };
    let mut controller = CaptureController::new(settings, services);

    let language = &controller.settings().language;
    log::info!(
        "Ready. Press {} to select a region (OCR language: {})",
        hotkey.spec(),
        language_name(language).unwrap_or(language.as_str())
    );

    let mut msg = MSG::default();
    loop {
        let result = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        if result.0 == 0 {
            break;
        } else if result.0 == -1 {
            log::error!("Message loop failed");
            break;
        }

        if msg.message == WM_HOTKEY && hotkey.matches(msg.wParam.0) {
            // Failures were already reported by the controller
            let _ = controller.request_capture();
        } else {
            unsafe {
                TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }

        for event in take_events() {
            if let Some(report) = route_event(&mut controller, event) {
                log_report(&report);
            }
        }

        sync_overlay(&controller, &mut overlay);
    }

    overlay.hide();
    hotkey.unregister()?;
    log::info!("Shutting down");
    Ok(())
}

fn route_event(controller: &mut CaptureController, event: OverlayEvent) -> Option<CaptureReport> {
    match event {
        OverlayEvent::PointerDown(point) => controller.pointer_down(point),
        OverlayEvent::PointerMove(point) => controller.pointer_move(point),
        OverlayEvent::PointerUp(point) => controller.pointer_up(point),
        OverlayEvent::Cancel => controller.cancel(),
    }
}

fn sync_overlay(controller: &CaptureController, overlay: &mut SelectionOverlay) {
    match controller.overlay_geometry() {
        Some(geometry) if controller.surface_visible() => {
            if let Err(e) = overlay.show(geometry, controller.selection_rect()) {
                log::error!("Overlay update failed: {e}");
            }
        }
        _ => {
            if overlay.is_visible() {
                overlay.hide();
            }
        }
    }
}

fn log_report(report: &CaptureReport) {
    match report {
        CaptureReport::Recognized { text, copied } => {
            log::info!(
                "Recognized {} characters{}",
                text.chars().count(),
                if *copied { ", copied to clipboard" } else { "" }
            );
            log::debug!("Recognized text: {text:?}");
        }
        CaptureReport::Cancelled => log::debug!("Capture cancelled"),
        CaptureReport::Failed(e) => log::debug!("Capture failed: {e}"),
    }
}
