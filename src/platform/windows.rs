//! General Windows platform utilities
//!
//! This module contains Win32 helper functions that don't fit into
//! other specialized platform modules.

use windows::Win32::Foundation::{LPARAM, RECT};
use windows::Win32::UI::HiDpi::{
    GetDpiForSystem, SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
};

use crate::domain::core::{Point, Rect};

/// Opts the process into per-monitor DPI awareness
///
/// Without it Windows reports scaled coordinates and the captured pixels
/// no longer line up with the selection. Failure (e.g. awareness already
/// set by a manifest) is logged and otherwise ignored.
pub fn enable_dpi_awareness() {
    let result = unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) };
    if let Err(e) = result {
        log::debug!("DPI awareness not changed: {e}");
    }
}

/// System DPI relative to 96
pub fn system_dpi_scale() -> f32 {
    let dpi = unsafe { GetDpiForSystem() };
    if dpi == 0 { 1.0 } else { dpi as f32 / 96.0 }
}

/// Extracts the signed client coordinates packed into a mouse message
pub fn point_from_lparam(lparam: LPARAM) -> Point {
    let x = (lparam.0 & 0xFFFF) as u16 as i16 as i32;
    let y = ((lparam.0 >> 16) & 0xFFFF) as u16 as i16 as i32;
    Point::new(x, y)
}

/// Converts a domain rectangle to Windows RECT structure
pub fn rect_to_win32_rect(rect: &Rect) -> RECT {
    RECT {
        left: rect.x,
        top: rect.y,
        right: rect.right(),
        bottom: rect.bottom(),
    }
}

/// Converts a Windows RECT to domain rectangle
pub fn win32_rect_to_rect(rect: &RECT) -> Rect {
    Rect {
        x: rect.left,
        y: rect.top,
        w: rect.right - rect.left,
        h: rect.bottom - rect.top,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_conversion_round_trips() {
        let rect = Rect::new(-1920, -200, 1920, 1080);
        let win32 = rect_to_win32_rect(&rect);
        assert_eq!((win32.left, win32.top, win32.right, win32.bottom), (-1920, -200, 0, 880));
        assert_eq!(win32_rect_to_rect(&win32), rect);
    }

    #[test]
    fn lparam_coordinates_are_signed() {
        // x = -5, y = 300
        let packed = ((300_isize) << 16) | (0xFFFB_isize);
        assert_eq!(point_from_lparam(LPARAM(packed)), Point::new(-5, 300));
    }
}
