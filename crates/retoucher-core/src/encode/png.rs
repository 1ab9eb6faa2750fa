//! PNG encoding using the `image` crate's PNG encoder.

use image::codecs::png::PngEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;
use thiserror::Error;

use crate::PixelBuffer;

/// PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Errors that can occur during PNG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode a buffer to PNG bytes (RGBA, 8 bits per channel).
///
/// # Errors
///
/// Returns `EncodeError::InvalidDimensions` for an empty buffer, or
/// `EncodeError::EncodingFailed` if the encoder rejects the data.
pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = buffer.dimensions();
    if buffer.is_empty() {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let mut out = Cursor::new(Vec::new());
    let encoder = PngEncoder::new(&mut out);

    encoder
        .write_image(buffer.samples(), width, height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(out.into_inner())
}


// ============================================================================
// Property-Based Tests
// ============================================================================
