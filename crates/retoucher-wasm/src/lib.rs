//! Retoucher WASM - WebAssembly bindings for Retoucher
//!
//! This crate provides WASM bindings to expose the retoucher-core functionality
//! to the browser UI.
//!
//! # Module Structure
//!
//! - `editor` - `JsEditor`, the stateful editing session plus upload gallery
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Image decoding bindings (PNG/JPEG with EXIF orientation)
//! - `encode` - Image encoding bindings (PNG export)
//! - `transform` - Standalone pixel transforms
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditor } from '@retoucher/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const editor = new JsEditor(undefined);
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! editor.load_image(bytes);
//! console.log(`Loaded ${editor.width}x${editor.height}`);
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod editor;
mod encode;
mod logging;
mod transform;
mod types;

// Re-export public types
pub use decode::decode_image;
pub use editor::JsEditor;
pub use encode::{encode_png, encode_png_from_image};
pub use transform::{
    adjust_brightness, adjust_contrast, apply_color_filter, blur, detect_edges, grayscale, rotate,
    sharpen,
};
pub use types::JsPixelBuffer;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::install(log::LevelFilter::Info);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Change how much the core logs to the console.
///
/// `level` is one of `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"` or
/// `"off"`; anything else keeps the current level.
#[wasm_bindgen]
pub fn set_log_level(level: &str) {
    if let Some(filter) = parse_level(level) {
        logging::install(filter);
    }
}

fn parse_level(level: &str) -> Option<log::LevelFilter> {
    level.parse().ok()
}
