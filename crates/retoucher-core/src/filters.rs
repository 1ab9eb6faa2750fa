//! One-shot filters: grayscale, Sobel edge detection and color presets.
//!
//! These run straight against the committed source and are committed
//! immediately; they take no intensity parameter.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::buffer::{clamp_channel, CHANNELS};
use crate::luminance::luma_u8;
use crate::PixelBuffer;

/// Convert to grayscale with BT.601 weights.
///
/// R, G and B all become `round(0.299R + 0.587G + 0.114B)`; alpha is kept.
/// Applying it twice gives the same result as applying it once.
pub fn grayscale(source: &PixelBuffer) -> PixelBuffer {
    let mut out = source.clone();
    for chunk in out.samples_mut().chunks_exact_mut(CHANNELS) {
        let gray = luma_u8(chunk[0], chunk[1], chunk[2]);
        chunk[0] = gray;
        chunk[1] = gray;
        chunk[2] = gray;
    }
    out
}

/// Sobel edge detection.
///
/// The image is first converted to grayscale. Every interior pixel is then
/// replaced by `min(255, 2 * sqrt(Gx² + Gy²))` computed from its eight
/// grayscale neighbours. The outer one-pixel frame keeps its grayscale
/// value. Alpha is kept.
pub fn detect_edges(source: &PixelBuffer) -> PixelBuffer {
    let gray = grayscale(source);
    let (w, h) = (source.width() as usize, source.height() as usize);
    if w < 3 || h < 3 {
        return gray;
    }

    let g = gray.samples();
    let at = |x: usize, y: usize| g[(y * w + x) * CHANNELS] as f64;

    let mut out = gray.clone();
    let samples = out.samples_mut();

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let top_left = at(x - 1, y - 1);
            let top = at(x, y - 1);
            let top_right = at(x + 1, y - 1);
            let left = at(x - 1, y);
            let right = at(x + 1, y);
            let bottom_left = at(x - 1, y + 1);
            let bottom = at(x, y + 1);
            let bottom_right = at(x + 1, y + 1);

            let gx = -top_left - 2.0 * left - bottom_left + top_right + 2.0 * right + bottom_right;
            let gy = -top_left - 2.0 * top - top_right + bottom_left + 2.0 * bottom + bottom_right;

            let magnitude = (gx * gx + gy * gy).sqrt();
            let edge = clamp_channel((magnitude * 2.0).min(255.0));

            let idx = (y * w + x) * CHANNELS;
            samples[idx] = edge;
            samples[idx + 1] = edge;
            samples[idx + 2] = edge;
        }
    }

    out
}

/// Named channel-multiplier presets used by the random filter tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorPreset {
    Vintage,
    Cool,
    Warm,
    HighContrast,
}

impl ColorPreset {
    /// All presets; the random tool picks uniformly from this list.
    pub const ALL: [ColorPreset; 4] = [
        ColorPreset::Vintage,
        ColorPreset::Cool,
        ColorPreset::Warm,
        ColorPreset::HighContrast,
    ];

    /// (red, green, blue) multipliers.
    pub fn factors(self) -> (f64, f64, f64) {
        match self {
            ColorPreset::Vintage => (1.1, 0.9, 0.8),
            ColorPreset::Cool => (0.8, 0.9, 1.1),
            ColorPreset::Warm => (1.2, 1.1, 0.9),
            ColorPreset::HighContrast => (1.3, 1.3, 1.3),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ColorPreset::Vintage => "Vintage",
            ColorPreset::Cool => "Cool",
            ColorPreset::Warm => "Warm",
            ColorPreset::HighContrast => "High Contrast",
        }
    }

    /// Pick a preset uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// Multiply R, G and B by the preset's factors, saturating at 255.
pub fn apply_color_filter(source: &PixelBuffer, preset: ColorPreset) -> PixelBuffer {
    let (fr, fg, fb) = preset.factors();
    let mut out = source.clone();
    for chunk in out.samples_mut().chunks_exact_mut(CHANNELS) {
        chunk[0] = clamp_channel(chunk[0] as f64 * fr);
        chunk[1] = clamp_channel(chunk[1] as f64 * fg);
        chunk[2] = clamp_channel(chunk[2] as f64 * fb);
    }
    out
}

/// Apply a randomly chosen preset, returning the result and the choice.
pub fn apply_random_color_filter<R: Rng + ?Sized>(
    source: &PixelBuffer,
    rng: &mut R,
) -> (PixelBuffer, ColorPreset) {
    let preset = ColorPreset::random(rng);
    (apply_color_filter(source, preset), preset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    // ===== Grayscale Tests =====

    #[test]
    fn test_grayscale_red_fixture() {
        let src = PixelBuffer::filled(2, 2, [255, 0, 0, 255]);
        let result = grayscale(&src);
        for y in 0..2 {
            for x in 0..2 {
                assert_eq!(result.get(x, y).unwrap(), [76, 76, 76, 255]);
            }
        }
    }

    #[test]
    fn test_grayscale_keeps_alpha() {
        let src = PixelBuffer::filled(1, 1, [0, 255, 0, 12]);
        assert_eq!(grayscale(&src).get(0, 0).unwrap(), [150, 150, 150, 12]);
    }

    #[test]
    fn test_grayscale_channels_equal() {
        let samples: Vec<u8> = (0..64u32).map(|i| (i * 37 % 256) as u8).collect();
        let src = PixelBuffer::from_raw(4, 4, samples).unwrap();
        for p in grayscale(&src).samples().chunks_exact(4) {
            assert!(p[0] == p[1] && p[1] == p[2]);
        }
    }

    // ===== Edge Detection Tests =====

    #[test]
    fn test_edges_uniform_image_interior_is_zero() {
        let src = PixelBuffer::filled(5, 4, [120, 60, 200, 255]);
        let result = detect_edges(&src);
        for y in 1..3 {
            for x in 1..4 {
                assert_eq!(result.get(x, y).unwrap(), [0, 0, 0, 255]);
            }
        }
    }

    #[test]
    fn test_edges_border_keeps_grayscale() {
        let src = PixelBuffer::filled(4, 4, [255, 0, 0, 255]);
        let result = detect_edges(&src);
        for &(x, y) in &[(0, 0), (3, 0), (0, 3), (3, 3), (1, 0), (0, 2)] {
            assert_eq!(result.get(x, y).unwrap(), [76, 76, 76, 255]);
        }
    }

    #[test]
    fn test_edges_vertical_step() {
        // Left column black, everything else white
        let mut src = PixelBuffer::filled(3, 3, [255, 255, 255, 255]);
        for y in 0..3 {
            src.set(0, y, [0, 0, 0, 255]).unwrap();
        }
        let result = detect_edges(&src);
        // Gx = 4 * 255 = 1020, saturates
        assert_eq!(result.get(1, 1).unwrap(), [255, 255, 255, 255]);
    }

    #[test]
    fn test_edges_small_gradient_magnitude() {
        // Column values 0, 0, 10: Gx = 40, Gy = 0 -> 80
        let mut src = PixelBuffer::filled(3, 3, [0, 0, 0, 255]);
        for y in 0..3 {
            src.set(2, y, [10, 10, 10, 255]).unwrap();
        }
        let result = detect_edges(&src);
        assert_eq!(result.get(1, 1).unwrap(), [80, 80, 80, 255]);
    }

    #[test]
    fn test_edges_tiny_image_is_just_grayscale() {
        let src = PixelBuffer::filled(2, 5, [0, 0, 255, 255]);
        assert_eq!(detect_edges(&src), grayscale(&src));
    }

    // ===== Color Filter Tests =====

    #[test]
    fn test_color_filter_vintage() {
        let src = PixelBuffer::filled(1, 1, [100, 100, 100, 200]);
        let result = apply_color_filter(&src, ColorPreset::Vintage);
        assert_eq!(result.get(0, 0).unwrap(), [110, 90, 80, 200]);
    }

    #[test]
    fn test_color_filter_saturates() {
        let src = PixelBuffer::filled(1, 1, [250, 250, 250, 255]);
        let result = apply_color_filter(&src, ColorPreset::HighContrast);
        assert_eq!(result.get(0, 0).unwrap(), [255, 255, 255, 255]);
    }

    #[test]
    fn test_random_preset_is_deterministic_per_seed() {
        let src = PixelBuffer::filled(2, 2, [90, 120, 150, 255]);
        let mut a = SmallRng::seed_from_u64(7);
        let mut b = SmallRng::seed_from_u64(7);
        let (out_a, preset_a) = apply_random_color_filter(&src, &mut a);
        let (out_b, preset_b) = apply_random_color_filter(&src, &mut b);
        assert_eq!(preset_a, preset_b);
        assert_eq!(out_a, out_b);
        assert_eq!(out_a, apply_color_filter(&src, preset_a));
    }

    #[test]
    fn test_random_preset_covers_all() {
        let mut rng = SmallRng::seed_from_u64(1234);
        let seen: HashSet<ColorPreset> = (0..200).map(|_| ColorPreset::random(&mut rng)).collect();
        assert_eq!(seen.len(), ColorPreset::ALL.len());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
