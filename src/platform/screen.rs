//! GDI screen capture
//!
//! Copies a rectangle of the virtual desktop into a top-down 32-bit DIB.

use std::ffi::c_void;

use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Gdi::{
    BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, DeleteDC, DeleteObject, GetDC, GetDIBits,
    ReleaseDC, SelectObject, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, CAPTUREBLT, DIB_RGB_COLORS,
    HBITMAP, HDC, HGDIOBJ, ROP_CODE, SRCCOPY,
};

use crate::capture::{CaptureError, CapturedImage, ScreenCapturer};
use crate::domain::core::Rect;
use crate::domain::topology::CaptureInstruction;

/// Captures from the screen device context
#[derive(Debug, Default, Clone, Copy)]
pub struct GdiCapturer;

impl ScreenCapturer for GdiCapturer {
    fn capture(&self, instruction: &CaptureInstruction) -> Result<CapturedImage, CaptureError> {
        let region = instruction.global_rect();
        log::debug!(
            "BitBlt {:?} (monitor {} local {:?})",
            region,
            instruction.monitor.index,
            instruction.local
        );
        let bgra = grab_region(&region)?;
        CapturedImage::from_bgra(region.w as u32, region.h as u32, bgra)
    }
}

/// Reads the pixels of `region` (virtual-desktop coordinates) as BGRA
fn grab_region(region: &Rect) -> Result<Vec<u8>, CaptureError> {
    if region.is_empty() {
        return Err(CaptureError::Grab(format!("empty region {region:?}")));
    }

    unsafe {
        let screen_dc = GetDC(HWND(0));
        if screen_dc.is_invalid() {
            return Err(CaptureError::Grab("GetDC failed".to_string()));
        }

        let memory_dc = CreateCompatibleDC(screen_dc);
        if memory_dc.is_invalid() {
            ReleaseDC(HWND(0), screen_dc);
            return Err(CaptureError::Grab("CreateCompatibleDC failed".to_string()));
        }

        let bitmap = CreateCompatibleBitmap(screen_dc, region.w, region.h);
        if bitmap.is_invalid() {
            DeleteDC(memory_dc);
            ReleaseDC(HWND(0), screen_dc);
            return Err(CaptureError::Grab("CreateCompatibleBitmap failed".to_string()));
        }
        let bitmap_object: HGDIOBJ = bitmap.into();
        let old_bitmap = SelectObject(memory_dc, bitmap_object);

        let blit = BitBlt(
            memory_dc,
            0,
            0,
            region.w,
            region.h,
            screen_dc,
            region.x,
            region.y,
            ROP_CODE(SRCCOPY.0 | CAPTUREBLT.0),
        );

        // The bitmap must not be selected into a DC while GetDIBits reads it
        SelectObject(memory_dc, old_bitmap);

        let result = match blit {
            Ok(()) => read_bits(memory_dc, bitmap, region.w, region.h),
            Err(e) => Err(CaptureError::Grab(format!("BitBlt failed: {e}"))),
        };

        DeleteObject(bitmap_object);
        DeleteDC(memory_dc);
        ReleaseDC(HWND(0), screen_dc);

        result
    }
}

unsafe fn read_bits(
    dc: HDC,
    bitmap: HBITMAP,
    width: i32,
    height: i32,
) -> Result<Vec<u8>, CaptureError> {
    let mut info = BITMAPINFO::default();
    info.bmiHeader = BITMAPINFOHEADER {
        biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
        biWidth: width,
        biHeight: -height, // top-down rows
        biPlanes: 1,
        biBitCount: 32,
        biCompression: BI_RGB.0,
        ..Default::default()
    };

    let mut pixels = vec![0u8; width as usize * height as usize * 4];
    let lines = unsafe {
        GetDIBits(
            dc,
            bitmap,
            0,
            height as u32,
            Some(pixels.as_mut_ptr() as *mut c_void),
            &mut info,
            DIB_RGB_COLORS,
        )
    };

    if lines != height {
        return Err(CaptureError::Grab(format!(
            "GetDIBits copied {lines} of {height} lines"
        )));
    }
    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::topology::Monitor;

    #[test]
    fn empty_region_is_rejected() {
        assert!(matches!(
            grab_region(&Rect::new(0, 0, 0, 10)),
            Err(CaptureError::Grab(_))
        ));
    }

    #[test]
    fn captures_small_region_of_primary_monitor() {
        let instruction = CaptureInstruction {
            monitor: Monitor::new(0, Rect::new(0, 0, 1, 1)),
            local: Rect::new(0, 0, 16, 8),
        };
        // Headless CI sessions have no desktop to copy from
        if let Ok(image) = GdiCapturer.capture(&instruction) {
            assert_eq!((image.width(), image.height()), (16, 8));
            assert!(image.pixels().chunks_exact(4).all(|p| p[3] == 255));
        }
    }
}
