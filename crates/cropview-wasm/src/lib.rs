//! Cropview WASM - WebAssembly bindings for the crop engine
//!
//! This crate exposes cropview-core to a JavaScript/TypeScript UI. The UI
//! decodes images, owns the canvas and forwards input; the engine keeps the
//! crop state and produces the cropped pixels.
//!
//! # Module Structure
//!
//! - `engine` - `JsCropEngine`, the stateful crop session
//! - `types` - WASM-compatible wrapper for raster data
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsCropEngine, JsRasterImage } from '@cropview/wasm';
//!
//! await init();
//!
//! const engine = new JsCropEngine();
//! engine.resize_viewport(1000, 600);
//! engine.load_image(new JsRasterImage(width, height, rgbBytes));
//! engine.set_aspect_ratio('16:9');
//! const preview = engine.render_preview();
//! ```

use wasm_bindgen::prelude::*;

mod engine;
mod types;

pub use engine::JsCropEngine;
pub use types::JsRasterImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Names accepted by `JsCropEngine.set_aspect_ratio`, in menu order.
#[wasm_bindgen]
pub fn aspect_ratio_names() -> Vec<String> {
    cropview_core::AspectRatio::ALL
        .iter()
        .map(|a| a.name().to_string())
        .collect()
}
