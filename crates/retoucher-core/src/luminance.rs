//! Luminance calculation using ITU-R BT.601 coefficients.
//!
//! Grayscale conversion and the edge detector both read pixel intensity
//! through these helpers, so the two always agree on what "gray" means.

/// ITU-R BT.601 coefficient for red channel in luminance calculation.
pub const LUMA_R: f64 = 0.299;

/// ITU-R BT.601 coefficient for green channel in luminance calculation.
pub const LUMA_G: f64 = 0.587;

/// ITU-R BT.601 coefficient for blue channel in luminance calculation.
pub const LUMA_B: f64 = 0.114;

/// Unrounded luma of an 8-bit RGB triple (0.0 to 255.0).
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> f64 {
    LUMA_R * r as f64 + LUMA_G * g as f64 + LUMA_B * b as f64
}

/// Luma rounded to the nearest 8-bit value.
///
/// # Arguments
/// * `r` - Red channel value (0-255)
/// * `g` - Green channel value (0-255)
/// * `b` - Blue channel value (0-255)
#[inline]
pub fn luma_u8(r: u8, g: u8, b: u8) -> u8 {
    crate::buffer::clamp_channel(luma(r, g, b))
}
