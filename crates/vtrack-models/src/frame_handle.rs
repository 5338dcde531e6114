//! Opaque, shareable image buffer.

use std::sync::Arc;

use crate::error::{ValidationError, ValidationResult};

/// A decoded RGB8 frame buffer, shared (never copied) between the Frame
/// that owns it and the Events that reference it.
///
/// `Arc` gives us the "reclaimed once no Event still holds it" lifecycle
/// from §3.3 for free: when the last clone is dropped the buffer is
/// deallocated.
#[derive(Debug, Clone)]
pub struct FrameHandle {
    pixels: Arc<[u8]>,
    width: u32,
    height: u32,
}

impl FrameHandle {
    /// `pixels` must be a contiguous RGB8 buffer of length
    /// `width * height * 3`.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(pixels.len(), (width as usize) * (height as usize) * 3);
        Self {
            pixels: Arc::from(pixels),
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// A read-only view of the pixel buffer; never copies.
    pub fn view(&self) -> &[u8] {
        &self.pixels
    }

    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.pixels)
    }

    /// Encode the buffer as a JPEG at the given quality (1-100).
    pub fn encode_jpeg(&self, quality: u8) -> ValidationResult<Vec<u8>> {
        let mut out = Vec::new();
        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality);
        encoder
            .encode(&self.pixels, self.width, self.height, image::ExtendedColorType::Rgb8)
            .map_err(|e| ValidationError::JpegEncode(e.to_string()))?;
        Ok(out)
    }
}
