//! Image decoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { decode_image, grayscale } from '@retoucher/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const gray = grayscale(decode_image(bytes));
//! ```

use crate::types::JsPixelBuffer;
use retoucher_core::decode;
use wasm_bindgen::prelude::*;

/// Decode an uploaded image from bytes.
///
/// The format is detected from the content. EXIF orientation is applied so
/// the pixels match what an `<img>` element would show.
///
/// # Errors
///
/// Returns an error if:
/// - The bytes are not a supported image format
/// - The image is corrupted or truncated
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsPixelBuffer, JsValue> {
    decode::decode_image(bytes)
        .map(JsPixelBuffer::from_buffer)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
