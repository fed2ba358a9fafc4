//! The crop engine exposed to JavaScript.
//!
//! `JsCropEngine` wraps one [`InteractionController`]. The UI forwards
//! canvas pointer events, keyboard commands and viewport sizes, and calls
//! `recompute_display()` from `requestAnimationFrame`.
//!
//! # Example (TypeScript)
//!
//! ```typescript
//! const engine = new JsCropEngine();
//! engine.resize_viewport(canvas.width, canvas.height);
//! engine.load_image(new JsRasterImage(w, h, rgb));
//!
//! canvas.onpointerdown = (e) => engine.pointer_down(e.offsetX, e.offsetY);
//! canvas.onpointermove = (e) => {
//!   engine.pointer_move(e.offsetX, e.offsetY);
//!   canvas.style.cursor = engine.cursor_at(e.offsetX, e.offsetY);
//! };
//!
//! function tick() {
//!   const frame = engine.recompute_display();
//!   if (frame) draw(frame);
//!   requestAnimationFrame(tick);
//! }
//! ```

use std::sync::Arc;

use cropview_core::{Command, CropError, EngineConfig, InteractionController, Point, Rect};
use wasm_bindgen::prelude::*;

use crate::types::JsRasterImage;

fn to_js_error(e: CropError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct JsCropEngine {
    inner: InteractionController,
}

impl Default for JsCropEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl JsCropEngine {
    /// Engine with default tunables.
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsCropEngine {
        JsCropEngine {
            inner: InteractionController::default(),
        }
    }

    /// Engine configured from a plain JS object. Missing fields take their
    /// defaults.
    pub fn with_config(config: JsValue) -> Result<JsCropEngine, JsValue> {
        let config: EngineConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("Invalid engine config: {}", e)))?;
        Self::from_config(config).map_err(to_js_error)
    }

    /// Engine configured from a TOML document.
    pub fn with_toml_config(toml: &str) -> Result<JsCropEngine, JsValue> {
        EngineConfig::from_toml_str(toml)
            .and_then(Self::from_config)
            .map_err(to_js_error)
    }

    /// Current configuration as a JS object.
    pub fn config(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.inner.config())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Replace the source image; view and region reset.
    pub fn load_image(&mut self, image: &JsRasterImage) {
        self.inner.load_image(Arc::new(image.to_raster()));
    }

    pub fn resize_viewport(&mut self, width: f64, height: f64) {
        self.inner.resize_viewport(width, height);
    }

    /// Space bar pressed or released.
    pub fn set_pan_modifier(&mut self, held: bool) {
        self.inner.set_pan_modifier(held);
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.inner.pointer_down(Point::new(x, y));
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.inner.pointer_move(Point::new(x, y));
    }

    pub fn pointer_up(&mut self) {
        self.inner.pointer_up();
    }

    pub fn pointer_leave(&mut self) {
        self.inner.pointer_leave();
    }

    pub fn zoom_in(&mut self) {
        self.inner.apply(Command::ZoomIn);
    }

    pub fn zoom_out(&mut self) {
        self.inner.apply(Command::ZoomOut);
    }

    pub fn zoom_reset(&mut self) {
        self.inner.apply(Command::ZoomReset);
    }

    pub fn rotate_cw(&mut self) {
        self.inner.apply(Command::RotateCw);
    }

    pub fn rotate_ccw(&mut self) {
        self.inner.apply(Command::RotateCcw);
    }

    /// Free rotation, positive clockwise.
    pub fn rotate_by(&mut self, degrees: f64) {
        self.inner.rotate_by(degrees);
    }

    pub fn reset(&mut self) {
        self.inner.apply(Command::Reset);
    }

    pub fn clear(&mut self) {
        self.inner.apply(Command::Clear);
    }

    /// One of `free`, `square`, `4:3`, `16:9`, `3:2`, `2:3`, `9:16`.
    /// Unknown names reset to free and throw.
    pub fn set_aspect_ratio(&mut self, name: &str) -> Result<(), JsValue> {
        self.inner.set_aspect_ratio(name).map_err(to_js_error)
    }

    /// Place the region directly, in display pixels.
    pub fn set_region(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.inner.set_region(Rect::new(x, y, width, height));
    }

    #[wasm_bindgen(getter)]
    pub fn zoom_percent(&self) -> u32 {
        self.inner.zoom_percent()
    }

    #[wasm_bindgen(getter)]
    pub fn rotation_degrees(&self) -> f64 {
        self.inner.rotation_degrees()
    }

    #[wasm_bindgen(getter)]
    pub fn has_region(&self) -> bool {
        self.inner.region().is_some()
    }

    #[wasm_bindgen(getter)]
    pub fn needs_redraw(&self) -> bool {
        self.inner.needs_redraw()
    }

    /// CSS cursor keyword for the pointer at `(x, y)`.
    pub fn cursor_at(&self, x: f64, y: f64) -> String {
        self.inner.cursor_at(Point::new(x, y)).css_name().to_string()
    }

    /// Current region `{x, y, width, height, aspect_lock}` or `null`.
    pub fn region(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.region())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Source pixels the export will read, as `{x, y, width, height}`, or `null`.
    pub fn source_rect(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.source_rect())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Next display frame, or `null` if nothing changed since the last one.
    pub fn recompute_display(&mut self) -> Result<JsValue, JsValue> {
        match self.inner.recompute_display() {
            Some(frame) => serde_wasm_bindgen::to_value(&frame)
                .map_err(|e| JsValue::from_str(&e.to_string())),
            None => Ok(JsValue::NULL),
        }
    }

    /// Preview-sized crop (longest side 300 by default).
    pub fn render_preview(&self) -> Result<JsRasterImage, JsValue> {
        self.preview().map_err(to_js_error)
    }

    /// Crop at native source resolution.
    pub fn export_full(&self) -> Result<JsRasterImage, JsValue> {
        self.full().map_err(to_js_error)
    }
}

impl JsCropEngine {
    fn from_config(config: EngineConfig) -> cropview_core::Result<JsCropEngine> {
        let inner = InteractionController::new(config)?;
        Ok(JsCropEngine { inner })
    }

    pub(crate) fn preview(&self) -> cropview_core::Result<JsRasterImage> {
        self.inner.render_preview().map(JsRasterImage::from_raster)
    }

    pub(crate) fn full(&self) -> cropview_core::Result<JsRasterImage> {
        self.inner.export_full().map(JsRasterImage::from_raster)
    }
}
