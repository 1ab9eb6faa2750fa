//! Slider-driven adjustments.
//!
//! Each adjustment takes an intensity in `0.0..=1.0` (the UI slider's 0-100
//! mapped linearly) and produces a new buffer of the same dimensions. Alpha
//! is never touched and every output channel saturates into 0..=255.
//!
//! ## Formulas (per R, G, B channel `c`)
//! - Brightness: `c + intensity * 100 - 50`
//! - Contrast: `factor * (c - 128) + 128` with
//!   `factor = 259 * (i*200 + 255) / (255 * (259 - i*200))`
//! - Sharpen: `c * 1.5 * intensity` (a multiplicative approximation)
//! - Blur: running average with the preceding pixel in linear order

use serde::{Deserialize, Serialize};

use crate::buffer::{clamp_channel, CHANNELS};
use crate::PixelBuffer;

/// Tools whose result depends on the intensity slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntensityTool {
    Brightness,
    Contrast,
    Blur,
    Sharpen,
}

impl IntensityTool {
    /// Every slider tool, in toolbar order.
    pub const ALL: [IntensityTool; 4] = [
        IntensityTool::Blur,
        IntensityTool::Sharpen,
        IntensityTool::Brightness,
        IntensityTool::Contrast,
    ];

    /// Label recorded in history when a preview from this tool is committed.
    pub fn commit_label(self) -> &'static str {
        match self {
            IntensityTool::Brightness => "Brightness Adjusted",
            IntensityTool::Contrast => "Contrast Adjusted",
            IntensityTool::Blur => "Blur Applied",
            IntensityTool::Sharpen => "Sharpen Applied",
        }
    }

    /// Name shown in the controls panel header.
    pub fn display_name(self) -> &'static str {
        match self {
            IntensityTool::Brightness => "Brightness",
            IntensityTool::Contrast => "Contrast",
            IntensityTool::Blur => "Blur",
            IntensityTool::Sharpen => "Sharpen",
        }
    }
}

/// Map a slider position (0-100) to an intensity in `0.0..=1.0`.
///
/// Values above 100 saturate.
#[inline]
pub fn intensity_from_percent(percent: u8) -> f32 {
    percent.min(100) as f32 / 100.0
}

/// Run `tool` against `source` and return the preview buffer.
///
/// `intensity` is clamped to `0.0..=1.0`; NaN is treated as 0.
pub fn apply_intensity(source: &PixelBuffer, tool: IntensityTool, intensity: f32) -> PixelBuffer {
    let intensity = normalize_intensity(intensity);
    match tool {
        IntensityTool::Brightness => adjust_brightness(source, intensity),
        IntensityTool::Contrast => adjust_contrast(source, intensity),
        IntensityTool::Blur => blur(source),
        IntensityTool::Sharpen => sharpen(source, intensity),
    }
}

#[inline]
fn normalize_intensity(intensity: f32) -> f32 {
    if intensity.is_nan() {
        0.0
    } else {
        intensity.clamp(0.0, 1.0)
    }
}

/// Apply `f` to the R, G, B channels of every pixel of a copy of `source`.
fn map_rgb(source: &PixelBuffer, f: impl Fn(u8) -> u8) -> PixelBuffer {
    let mut out = source.clone();
    for chunk in out.samples_mut().chunks_exact_mut(CHANNELS) {
        chunk[0] = f(chunk[0]);
        chunk[1] = f(chunk[1]);
        chunk[2] = f(chunk[2]);
    }
    out
}

/// Shift every color channel by `intensity * 100 - 50`.
///
/// Clamped on both ends, so `intensity = 0.0` darkens by 50 without
/// wrapping and `intensity = 1.0` brightens by 50 without overflow.
pub fn adjust_brightness(source: &PixelBuffer, intensity: f32) -> PixelBuffer {
    let offset = normalize_intensity(intensity) as f64 * 100.0 - 50.0;
    map_rgb(source, |c| clamp_channel(c as f64 + offset))
}

/// Contrast multiplier for a given intensity.
///
/// The denominator stays at least `259 - 200 = 59`, so the factor is
/// finite over the whole intensity range.
#[inline]
pub fn contrast_factor(intensity: f32) -> f64 {
    let amount = normalize_intensity(intensity) as f64 * 200.0;
    (259.0 * (amount + 255.0)) / (255.0 * (259.0 - amount))
}

/// Stretch every color channel away from (or towards) mid-gray 128.
pub fn adjust_contrast(source: &PixelBuffer, intensity: f32) -> PixelBuffer {
    let factor = contrast_factor(intensity);
    map_rgb(source, |c| clamp_channel(factor * (c as f64 - 128.0) + 128.0))
}

/// Scale every color channel by `1.5 * intensity`.
pub fn sharpen(source: &PixelBuffer, intensity: f32) -> PixelBuffer {
    let scale = 1.5 * normalize_intensity(intensity) as f64;
    map_rgb(source, |c| clamp_channel(c as f64 * scale))
}

/// Cheap one-dimensional blur.
///
/// Walking the flat sample sequence, each pixel after the first takes the
/// average of itself and the pixel before it. The predecessor has already
/// been blurred, so the smoothing trails along each row and wraps into the
/// next one. The last pixel is blurred too. Alpha is left as is.
pub fn blur(source: &PixelBuffer) -> PixelBuffer {
    let mut out = source.clone();
    let samples = out.samples_mut();
    for i in (CHANNELS..samples.len()).step_by(CHANNELS) {
        for c in 0..3 {
            let avg = (samples[i + c] as f64 + samples[i + c - CHANNELS] as f64) / 2.0;
            samples[i + c] = clamp_channel(avg);
        }
    }
    out
}


// ============================================================================
// Property-Based Tests
// ============================================================================
