//! Image encoding WASM bindings.
//!
//! Export always produces PNG so erased (transparent) areas survive.
//!
//! # Example
//!
//! ```typescript
//! import { encode_png_from_image } from '@retoucher/wasm';
//!
//! const png = encode_png_from_image(image);
//! const link = document.createElement('a');
//! link.download = 'edited-image.png';
//! link.href = URL.createObjectURL(new Blob([png], { type: 'image/png' }));
//! link.click();
//! ```

use crate::types::JsPixelBuffer;
use retoucher_core::{encode, PixelBuffer};
use wasm_bindgen::prelude::*;

/// Encode RGBA pixel data to PNG bytes.
///
/// # Errors
///
/// Returns an error if:
/// - The pixel data length doesn't match width * height * 4
/// - Width or height is zero
#[wasm_bindgen]
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, JsValue> {
    let buffer = PixelBuffer::from_raw(width, height, pixels.to_vec())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    encode::encode_png(&buffer).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode a JsPixelBuffer to PNG bytes.
#[wasm_bindgen]
pub fn encode_png_from_image(image: &JsPixelBuffer) -> Result<Vec<u8>, JsValue> {
    encode::encode_png(image.buffer()).map_err(|e| JsValue::from_str(&e.to_string()))
}
