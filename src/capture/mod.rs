//! Screen capture abstractions
//!
//! The controller only sees these traits. The GDI implementations live in
//! `platform::screen` and `platform::monitors`; tests substitute fakes.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};
use thiserror::Error;

use crate::domain::core::Rect;
use crate::domain::topology::CaptureInstruction;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Failed to enumerate displays: {0}")]
    Enumeration(String),
    #[error("Screen grab failed: {0}")]
    Grab(String),
    #[error("Pixel buffer of {len} bytes does not match {width}x{height}")]
    BufferSize { width: u32, height: u32, len: usize },
    #[error("PNG encoding failed: {0}")]
    Encoding(String),
}

/// Reports the geometry of every attached display, in enumeration order
pub trait DisplaySource {
    fn displays(&self) -> Result<Vec<Rect>, CaptureError>;
}

/// Grabs the pixels of one monitor-local rectangle
pub trait ScreenCapturer {
    fn capture(&self, instruction: &CaptureInstruction) -> Result<CapturedImage, CaptureError>;
}

/// Tightly packed RGBA8 pixels of a captured region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl CapturedImage {
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, CaptureError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(CaptureError::BufferSize {
                width,
                height,
                len: rgba.len(),
            });
        }
        Ok(Self { width, height, rgba })
    }

    /// Converts a top-down BGRA buffer as produced by `GetDIBits`
    pub fn from_bgra(width: u32, height: u32, mut bgra: Vec<u8>) -> Result<Self, CaptureError> {
        for pixel in bgra.chunks_exact_mut(4) {
            pixel.swap(0, 2);
            // GDI leaves the alpha byte undefined for screen DCs
            pixel[3] = 255;
        }
        Self::from_rgba(width, height, bgra)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.rgba
    }

    /// Encodes the image as PNG for the OCR engine
    pub fn to_png(&self) -> Result<Vec<u8>, CaptureError> {
        let image = RgbaImage::from_raw(self.width, self.height, self.rgba.clone()).ok_or(
            CaptureError::BufferSize {
                width: self.width,
                height: self.height,
                len: self.rgba.len(),
            },
        )?;

        let mut png_bytes: Vec<u8> = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
            .map_err(|e| CaptureError::Encoding(e.to_string()))?;

        Ok(png_bytes)
    }
}
