//! WASM bindings for the standalone pixel transforms.
//!
//! These run one transform on a `JsPixelBuffer` and return a new one, without
//! touching any editor session or history. Intensities are `0.0..=1.0`.

use crate::types::JsPixelBuffer;
use retoucher_core::{adjustments, filters, transform, ColorPreset};
use wasm_bindgen::prelude::*;

/// BT.601 grayscale.
#[wasm_bindgen]
pub fn grayscale(image: &JsPixelBuffer) -> JsPixelBuffer {
    JsPixelBuffer::from_buffer(filters::grayscale(image.buffer()))
}

/// Sobel edge detection (border pixels keep their grayscale value).
#[wasm_bindgen]
pub fn detect_edges(image: &JsPixelBuffer) -> JsPixelBuffer {
    JsPixelBuffer::from_buffer(filters::detect_edges(image.buffer()))
}

#[wasm_bindgen]
pub fn adjust_brightness(image: &JsPixelBuffer, intensity: f32) -> JsPixelBuffer {
    JsPixelBuffer::from_buffer(adjustments::adjust_brightness(image.buffer(), intensity))
}

#[wasm_bindgen]
pub fn adjust_contrast(image: &JsPixelBuffer, intensity: f32) -> JsPixelBuffer {
    JsPixelBuffer::from_buffer(adjustments::adjust_contrast(image.buffer(), intensity))
}

#[wasm_bindgen]
pub fn sharpen(image: &JsPixelBuffer, intensity: f32) -> JsPixelBuffer {
    JsPixelBuffer::from_buffer(adjustments::sharpen(image.buffer(), intensity))
}

#[wasm_bindgen]
pub fn blur(image: &JsPixelBuffer) -> JsPixelBuffer {
    JsPixelBuffer::from_buffer(adjustments::blur(image.buffer()))
}

/// Apply a named color preset.
///
/// # Arguments
///
/// * `preset` - One of `"vintage"`, `"cool"`, `"warm"`, `"high-contrast"`
///
/// # Example (TypeScript)
///
/// ```typescript
/// const warm = apply_color_filter(image, 'warm');
/// ```
#[wasm_bindgen]
pub fn apply_color_filter(image: &JsPixelBuffer, preset: JsValue) -> Result<JsPixelBuffer, JsValue> {
    let preset: ColorPreset = serde_wasm_bindgen::from_value(preset)
        .map_err(|e| JsValue::from_str(&format!("Invalid color preset: {}", e)))?;
    Ok(JsPixelBuffer::from_buffer(filters::apply_color_filter(
        image.buffer(),
        preset,
    )))
}

/// Rotate by a multiple of 90 degrees (positive = clockwise).
///
/// # Errors
///
/// Returns an error for any other angle.
#[wasm_bindgen]
pub fn rotate(image: &JsPixelBuffer, degrees: i32) -> Result<JsPixelBuffer, JsValue> {
    transform::rotate(image.buffer(), degrees)
        .map(JsPixelBuffer::from_buffer)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn test_image() -> JsPixelBuffer {
        JsPixelBuffer::new(2, 2, vec![100u8; 16]).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_rotation_rejects_45_degrees() {
        assert!(rotate(&test_image(), 45).is_err());
    }

    #[wasm_bindgen_test]
    fn test_color_filter_by_name() {
        let result = apply_color_filter(&test_image(), JsValue::from_str("vintage")).unwrap();
        assert_eq!(&result.pixels()[0..4], &[110, 90, 80, 100]);
    }

    #[wasm_bindgen_test]
    fn test_color_filter_unknown_name() {
        assert!(apply_color_filter(&test_image(), JsValue::from_str("sepia")).is_err());
    }
}
