//! Image decoding for uploaded files.
//!
//! This module provides:
//! - Decoding any supported raster format (PNG, JPEG) into an RGBA [`PixelBuffer`]
//! - EXIF orientation correction, so the buffer matches what a browser draws
//! - Downscaling used when storing images in the gallery
//!
//! All operations are synchronous. Decoding is the only step the UI awaits;
//! every transform after it runs on the returned buffer in memory.
//!
//! [`PixelBuffer`]: crate::PixelBuffer

mod raster;
mod resize;
mod types;

pub use raster::{decode_image, decode_image_no_orientation};
pub use resize::resize_to_fit;
pub use types::{DecodeError, FilterType, Orientation};
