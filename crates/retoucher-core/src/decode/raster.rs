//! Raster decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::DynamicImage;
use image::ImageReader;
use log::{debug, warn};

use super::{DecodeError, Orientation};
use crate::PixelBuffer;

/// Decode an uploaded image from bytes, applying EXIF orientation correction.
///
/// The format is sniffed from the content, not trusted from a MIME type.
///
/// # Arguments
///
/// * `bytes` - Raw file bytes (PNG or JPEG)
///
/// # Returns
///
/// A `PixelBuffer` with RGBA samples and the correct orientation applied.
/// Formats without alpha decode as fully opaque.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format cannot be recognized.
/// Returns `DecodeError::CorruptedFile` if the data is corrupted or truncated.
/// Returns `DecodeError::EmptyImage` if the image has zero width or height.
pub fn decode_image(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    let orientation = extract_orientation(bytes);
    let img = read_dynamic(bytes)?;
    let oriented = apply_orientation(img, orientation);
    into_buffer(oriented)
}

/// Decode an image from bytes without applying EXIF orientation.
///
/// Used for re-reading snapshots this crate encoded itself, which never
/// carry orientation tags.
pub fn decode_image_no_orientation(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    let img = read_dynamic(bytes)?;
    into_buffer(img)
}

fn read_dynamic(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    let cursor = Cursor::new(bytes);
    let reader = ImageReader::new(cursor)
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        warn!("rejected upload of {} bytes: unknown format", bytes.len());
        return Err(DecodeError::InvalidFormat);
    }

    reader.decode().map_err(|e| {
        warn!("image decode failed: {e}");
        DecodeError::CorruptedFile(e.to_string())
    })
}

fn into_buffer(img: DynamicImage) -> Result<PixelBuffer, DecodeError> {
    let rgba = img.into_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyImage { width, height });
    }
    debug!("decoded {width}x{height} image");
    Ok(PixelBuffer::from_rgba_image(rgba))
}

/// Extract EXIF orientation from image bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let exif_reader = Reader::new();
    let mut cursor = Cursor::new(bytes);

    match exif_reader.read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
