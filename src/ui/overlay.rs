//! Selection overlay window
//!
//! One layered popup covers the combined geometry of every monitor while a
//! capture is armed. It dims the desktop, shows the dragged rectangle and
//! turns mouse and Escape input into [`OverlayEvent`]s in global
//! virtual-desktop coordinates. Events queue up on the UI thread and are
//! drained by the message loop with [`take_events`].

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::ffi::c_void;

use windows::Win32::Foundation::{
    GetLastError, COLORREF, ERROR_CLASS_ALREADY_EXISTS, HWND, LPARAM, LRESULT, POINT, SIZE,
    WPARAM,
};
use windows::Win32::Graphics::Gdi::{
    CreateCompatibleDC, CreateDIBSection, DeleteDC, DeleteObject, GetDC, ReleaseDC, SelectObject,
    AC_SRC_ALPHA, AC_SRC_OVER, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, BLENDFUNCTION,
    DIB_RGB_COLORS, HGDIOBJ,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{ReleaseCapture, SetCapture, SetFocus, VK_ESCAPE};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, LoadCursorW, RegisterClassW, SetCursor,
    SetForegroundWindow, SetWindowPos, ShowWindow, UpdateLayeredWindow, HTCLIENT, HWND_TOPMOST,
    IDC_CROSS, SWP_NOACTIVATE, SW_HIDE, SW_SHOW, ULW_ALPHA, WM_KEYDOWN, WM_LBUTTONDOWN,
    WM_LBUTTONUP, WM_MOUSEMOVE, WM_RBUTTONDOWN, WM_SETCURSOR, WNDCLASSW, WS_EX_LAYERED,
    WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
};
use windows::core::{w, PCWSTR};

use crate::domain::core::{Point, Rect};
use crate::platform::windows::point_from_lparam;
use crate::ui::renderer::{pixmap_to_bgra, RendererError, SelectionLayout, SelectionRenderer};

const CLASS_NAME: PCWSTR = w!("ScreenOcrSelectionOverlay");

/// Overlay management errors
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("Failed to register overlay window class")]
    WindowClassRegistrationFailed,

    #[error("Failed to create overlay window")]
    WindowCreationFailed,

    #[error("Failed to position overlay window over {0:?}")]
    PositioningFailed(Rect),

    #[error("Failed to acquire screen device context")]
    DeviceContextFailed,

    #[error("Failed to create memory device context")]
    MemoryDeviceContextFailed,

    #[error("Failed to create DIB section for overlay frame")]
    DibSectionCreationFailed,

    #[error("Failed to select bitmap into memory DC")]
    BitmapSelectionFailed,

    #[error("Failed to update layered window surface")]
    LayerUpdateFailed,

    #[error("Rendering failed: {0}")]
    RenderingError(#[from] RendererError),
}

/// User input on the overlay, in global coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayEvent {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
    Cancel,
}

thread_local! {
    static EVENTS: RefCell<VecDeque<OverlayEvent>> = const { RefCell::new(VecDeque::new()) };
    // Global position of the overlay's client origin
    static ORIGIN: Cell<Point> = const { Cell::new(Point { x: 0, y: 0 }) };
}

fn push_event(event: OverlayEvent) {
    EVENTS.with(|events| events.borrow_mut().push_back(event));
}

/// Drains the input queued by overlay windows on this thread
pub fn take_events() -> Vec<OverlayEvent> {
    EVENTS.with(|events| events.borrow_mut().drain(..).collect())
}

/// Translates a client-area point of a surface placed at `origin`
pub fn client_to_global(origin: Point, client: Point) -> Point {
    Point::new(origin.x + client.x, origin.y + client.y)
}

fn global_point(lparam: LPARAM) -> Point {
    client_to_global(ORIGIN.with(Cell::get), point_from_lparam(lparam))
}

unsafe extern "system" fn overlay_window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_LBUTTONDOWN => {
            // Keep receiving moves when the pointer leaves the window mid-drag
            unsafe { SetCapture(hwnd) };
            push_event(OverlayEvent::PointerDown(global_point(lparam)));
            LRESULT(0)
        }
        WM_MOUSEMOVE => {
            push_event(OverlayEvent::PointerMove(global_point(lparam)));
            LRESULT(0)
        }
        WM_LBUTTONUP => {
            unsafe { ReleaseCapture() }.ok();
            push_event(OverlayEvent::PointerUp(global_point(lparam)));
            LRESULT(0)
        }
        WM_RBUTTONDOWN => {
            push_event(OverlayEvent::Cancel);
            LRESULT(0)
        }
        WM_KEYDOWN if wparam.0 == VK_ESCAPE.0 as usize => {
            push_event(OverlayEvent::Cancel);
            LRESULT(0)
        }
        WM_SETCURSOR if (lparam.0 & 0xFFFF) as u32 == HTCLIENT => {
            if let Ok(cursor) = unsafe { LoadCursorW(None, IDC_CROSS) } {
                unsafe { SetCursor(cursor) };
                return LRESULT(1);
            }
            unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

/// The full-desktop selection surface
pub struct SelectionOverlay {
    hwnd: HWND,
    renderer: SelectionRenderer,
    /// Geometry the window currently covers
    geometry: Option<Rect>,
    /// Last presented selection, to skip identical frames
    presented: Option<Option<Rect>>,
    visible: bool,
}

impl SelectionOverlay {
    /// Creates the (hidden) overlay window
    pub fn new(renderer: SelectionRenderer) -> Result<Self, OverlayError> {
        Self::register_window_class()?;
        let hwnd = Self::create_overlay_window()?;

        Ok(Self {
            hwnd,
            renderer,
            geometry: None,
            presented: None,
            visible: false,
        })
    }

    fn register_window_class() -> Result<(), OverlayError> {
        let hinstance = unsafe { GetModuleHandleW(None) }
            .map_err(|_| OverlayError::WindowClassRegistrationFailed)?;

        let wc = WNDCLASSW {
            lpfnWndProc: Some(overlay_window_proc),
            hInstance: hinstance.into(),
            lpszClassName: CLASS_NAME,
            hCursor: unsafe { LoadCursorW(None, IDC_CROSS) }.unwrap_or_default(),
            ..Default::default()
        };

        let atom = unsafe { RegisterClassW(&wc) };
        if atom == 0 && unsafe { GetLastError() } != ERROR_CLASS_ALREADY_EXISTS {
            return Err(OverlayError::WindowClassRegistrationFailed);
        }
        Ok(())
    }

    fn create_overlay_window() -> Result<HWND, OverlayError> {
        let hinstance = unsafe { GetModuleHandleW(None) }
            .map_err(|_| OverlayError::WindowCreationFailed)?;

        let hwnd = unsafe {
            CreateWindowExW(
                WS_EX_LAYERED | WS_EX_TOPMOST | WS_EX_TOOLWINDOW,
                CLASS_NAME,
                w!("Screen OCR Selection"),
                WS_POPUP,
                0,
                0,
                1,
                1,
                None,
                None,
                hinstance,
                None,
            )
        };

        if hwnd.0 == 0 {
            return Err(OverlayError::WindowCreationFailed);
        }
        Ok(hwnd)
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Covers `geometry`, draws the current selection and takes focus
    pub fn show(&mut self, geometry: Rect, selection: Option<Rect>) -> Result<(), OverlayError> {
        if self.geometry != Some(geometry) {
            unsafe {
                SetWindowPos(
                    self.hwnd,
                    HWND_TOPMOST,
                    geometry.x,
                    geometry.y,
                    geometry.w,
                    geometry.h,
                    SWP_NOACTIVATE,
                )
            }
            .map_err(|_| OverlayError::PositioningFailed(geometry))?;
            self.geometry = Some(geometry);
            self.presented = None;
            ORIGIN.with(|origin| origin.set(geometry.origin()));
        }

        self.render(selection)?;

        if !self.visible {
            unsafe {
                ShowWindow(self.hwnd, SW_SHOW);
                // Escape only reaches the window while it has keyboard focus
                SetForegroundWindow(self.hwnd);
                SetFocus(self.hwnd);
            }
            self.visible = true;
            log::debug!("Overlay shown over {geometry:?}");
        }
        Ok(())
    }

    /// Redraws the frame for `selection` (global coordinates)
    pub fn render(&mut self, selection: Option<Rect>) -> Result<(), OverlayError> {
        let Some(geometry) = self.geometry else {
            return Ok(());
        };
        if self.presented == Some(selection) {
            return Ok(());
        }

        let layout = SelectionLayout::compute(geometry, selection, self.renderer.style());
        let pixmap = self.renderer.render_layout(&layout)?;
        self.present_pixmap(&pixmap, geometry)?;
        self.presented = Some(selection);
        Ok(())
    }

    /// Hides the window; safe to call when already hidden
    pub fn hide(&mut self) {
        unsafe {
            ShowWindow(self.hwnd, SW_HIDE);
            ReleaseCapture().ok();
        }
        if self.visible {
            log::debug!("Overlay hidden");
        }
        self.visible = false;
        self.presented = None;
    }

    /// Present the pixmap via UpdateLayeredWindow for flicker-free rendering
    fn present_pixmap(&self, pixmap: &tiny_skia::Pixmap, at: Rect) -> Result<(), OverlayError> {
        let width = pixmap.width() as i32;
        let height = pixmap.height() as i32;
        let bgra = pixmap_to_bgra(pixmap);

        unsafe {
            let screen_dc = GetDC(HWND(0));
            if screen_dc.is_invalid() {
                return Err(OverlayError::DeviceContextFailed);
            }

            let memory_dc = CreateCompatibleDC(screen_dc);
            if memory_dc.is_invalid() {
                ReleaseDC(HWND(0), screen_dc);
                return Err(OverlayError::MemoryDeviceContextFailed);
            }

            let mut bitmap_info = BITMAPINFO::default();
            bitmap_info.bmiHeader = BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width,
                biHeight: -height, // top-down bitmap so we can copy directly
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            };

            let mut pixel_ptr: *mut c_void = std::ptr::null_mut();
            let dib = match CreateDIBSection(
                memory_dc,
                &bitmap_info,
                DIB_RGB_COLORS,
                &mut pixel_ptr,
                None,
                0,
            ) {
                Ok(bitmap) => bitmap,
                Err(_) => {
                    DeleteDC(memory_dc);
                    ReleaseDC(HWND(0), screen_dc);
                    return Err(OverlayError::DibSectionCreationFailed);
                }
            };
            let dib_object: HGDIOBJ = dib.into();

            if pixel_ptr.is_null() {
                DeleteObject(dib_object);
                DeleteDC(memory_dc);
                ReleaseDC(HWND(0), screen_dc);
                return Err(OverlayError::DibSectionCreationFailed);
            }

            std::slice::from_raw_parts_mut(pixel_ptr as *mut u8, bgra.len()).copy_from_slice(&bgra);

            let old_bitmap = SelectObject(memory_dc, dib_object);
            if old_bitmap.0 == 0 {
                DeleteObject(dib_object);
                DeleteDC(memory_dc);
                ReleaseDC(HWND(0), screen_dc);
                return Err(OverlayError::BitmapSelectionFailed);
            }

            let size = SIZE {
                cx: width,
                cy: height,
            };
            let dst_point = POINT { x: at.x, y: at.y };
            let src_point = POINT { x: 0, y: 0 };
            let blend = BLENDFUNCTION {
                BlendOp: AC_SRC_OVER as u8,
                BlendFlags: 0,
                SourceConstantAlpha: 255,
                AlphaFormat: AC_SRC_ALPHA as u8,
            };

            let update_result = UpdateLayeredWindow(
                self.hwnd,
                screen_dc,
                Some(&dst_point),
                Some(&size),
                memory_dc,
                Some(&src_point),
                COLORREF(0),
                Some(&blend),
                ULW_ALPHA,
            );

            SelectObject(memory_dc, old_bitmap);
            DeleteObject(dib_object);
            DeleteDC(memory_dc);
            ReleaseDC(HWND(0), screen_dc);

            update_result.map_err(|_| OverlayError::LayerUpdateFailed)
        }
    }
}

impl Drop for SelectionOverlay {
    fn drop(&mut self) {
        unsafe {
            DestroyWindow(self.hwnd).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::renderer::OverlayStyle;

    #[test]
    fn client_points_are_offset_by_the_surface_origin() {
        let origin = Point::new(-1920, -120);
        assert_eq!(
            client_to_global(origin, Point::new(100, 200)),
            Point::new(-1820, 80)
        );
    }

    #[test]
    fn events_are_drained_in_order() {
        take_events();
        push_event(OverlayEvent::PointerDown(Point::new(1, 2)));
        push_event(OverlayEvent::PointerUp(Point::new(3, 4)));
        push_event(OverlayEvent::Cancel);

        assert_eq!(
            take_events(),
            vec![
                OverlayEvent::PointerDown(Point::new(1, 2)),
                OverlayEvent::PointerUp(Point::new(3, 4)),
                OverlayEvent::Cancel,
            ]
        );
        assert!(take_events().is_empty());
    }

    #[test]
    fn overlay_show_and_hide() {
        let renderer = SelectionRenderer::without_font(OverlayStyle::default());
        // Window creation may fail without an interactive desktop
        let Ok(mut overlay) = SelectionOverlay::new(renderer) else {
            println!("Overlay creation failed (expected in test environment)");
            return;
        };
        assert!(!overlay.is_visible());

        if overlay.show(Rect::new(0, 0, 64, 48), Some(Rect::new(4, 4, 20, 10))).is_ok() {
            assert!(overlay.is_visible());
        }
        overlay.hide();
        assert!(!overlay.is_visible());
    }
}
