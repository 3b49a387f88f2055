//! Monitor enumeration and DPI-aware coordinate handling
//!
//! This module is responsible for:
//! - Enumerating all connected monitors
//! - Getting DPI information for each monitor
//! - Handing display geometries to the capture pipeline
//!
//! Secondary monitors can have negative coordinates in the Windows virtual
//! desktop; geometries are passed through unchanged.

use thiserror::Error;
use windows::Win32::Foundation::{BOOL, FALSE, LPARAM, RECT, TRUE};
use windows::Win32::Graphics::Gdi::{
    EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFO, MONITORINFOEXW,
};
use windows::Win32::UI::HiDpi::{GetDpiForMonitor, MDT_EFFECTIVE_DPI};

use crate::capture::{CaptureError, DisplaySource};
use crate::domain::core::Rect;
use crate::platform::windows::win32_rect_to_rect;

/// A monitor as reported by Win32
#[derive(Debug, Clone)]
pub struct MonitorInfo {
    /// Windows handle to the monitor
    pub handle: HMONITOR,
    /// Zero-based enumeration order
    pub index: usize,
    /// Full monitor bounds in physical pixels
    pub geometry: Rect,
    /// Bounds excluding the taskbar
    pub work_area: Rect,
    /// DPI scale factor (1.0 = 96 DPI, 1.25 = 120 DPI, etc.)
    pub dpi_scale: f32,
    pub is_primary: bool,
}

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Failed to enumerate monitors")]
    EnumerationFailed,
}

impl From<MonitorError> for CaptureError {
    fn from(err: MonitorError) -> Self {
        CaptureError::Enumeration(err.to_string())
    }
}

/// Context for monitor enumeration callback
struct EnumContext {
    monitors: Vec<MonitorInfo>,
}

/// Callback function for monitor enumeration
///
/// Monitors whose info cannot be read are skipped; enumeration continues.
unsafe extern "system" fn enum_monitor_proc(
    hmonitor: HMONITOR,
    _hdc: HDC,
    _rect: *mut RECT,
    lparam: LPARAM,
) -> BOOL {
    unsafe {
        let context = &mut *(lparam.0 as *mut EnumContext);

        let mut monitor_info = MONITORINFOEXW {
            monitorInfo: MONITORINFO {
                cbSize: std::mem::size_of::<MONITORINFOEXW>() as u32,
                ..Default::default()
            },
            ..Default::default()
        };

        if GetMonitorInfoW(hmonitor, &mut monitor_info.monitorInfo) == FALSE {
            log::warn!("Skipping monitor {hmonitor:?}: GetMonitorInfoW failed");
            return TRUE;
        }

        let mut dpi_x: u32 = 96;
        let mut dpi_y: u32 = 96;
        if GetDpiForMonitor(hmonitor, MDT_EFFECTIVE_DPI, &mut dpi_x, &mut dpi_y).is_err() {
            dpi_x = 96;
        }

        let info = monitor_info.monitorInfo;
        context.monitors.push(MonitorInfo {
            handle: hmonitor,
            index: context.monitors.len(),
            geometry: win32_rect_to_rect(&info.rcMonitor),
            work_area: win32_rect_to_rect(&info.rcWork),
            dpi_scale: dpi_x as f32 / 96.0,
            // MONITORINFOF_PRIMARY
            is_primary: (info.dwFlags & 1) != 0,
        });

        TRUE
    }
}

/// Enumerates all monitors in Win32 order
pub fn enumerate_monitors() -> Result<Vec<MonitorInfo>, MonitorError> {
    let mut context = EnumContext {
        monitors: Vec::new(),
    };

    let ok = unsafe {
        EnumDisplayMonitors(
            None,
            None,
            Some(enum_monitor_proc),
            LPARAM(&mut context as *mut _ as isize),
        )
    };
    if ok == FALSE {
        return Err(MonitorError::EnumerationFailed);
    }

    Ok(context.monitors)
}

/// Geometries usable for capture; degenerate monitors are dropped
pub fn capture_geometries(monitors: &[MonitorInfo]) -> Vec<Rect> {
    monitors
        .iter()
        .filter(|monitor| {
            let usable = !monitor.geometry.is_empty();
            if !usable {
                log::warn!(
                    "Ignoring monitor {} with empty geometry {:?}",
                    monitor.index,
                    monitor.geometry
                );
            }
            usable
        })
        .map(|monitor| monitor.geometry)
        .collect()
}

/// Live display source backed by `EnumDisplayMonitors`
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Displays;

impl DisplaySource for Win32Displays {
    fn displays(&self) -> Result<Vec<Rect>, CaptureError> {
        let monitors = enumerate_monitors()?;
        for monitor in &monitors {
            log::debug!(
                "Monitor {}: {:?} (scale {:.2}{})",
                monitor.index,
                monitor.geometry,
                monitor.dpi_scale,
                if monitor.is_primary { ", primary" } else { "" }
            );
        }
        Ok(capture_geometries(&monitors))
    }
}
