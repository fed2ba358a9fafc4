//! Cropview Core - interactive crop-region engine
//!
//! This crate maps between a source image's native pixels and the display
//! surface it is drawn on, keeps a validated crop rectangle under pointer
//! interaction, and renders the selected region back out of the source.
//!
//! # Components
//!
//! - [`render`]: source/display transform under zoom, pan and rotation
//! - [`region`]: the crop rectangle value type and aspect presets
//! - [`interaction`]: pointer state machine, commands and redraw coalescing
//! - [`export`]: source-rectangle extraction, rotation and scaling
//!
//! The host supplies decoded pixels and input events; file formats are its
//! business.

pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod interaction;
pub mod raster;
pub mod region;
pub mod render;
pub mod view;

pub use config::EngineConfig;
pub use error::{CropError, Result};
pub use export::{ExportPlan, ExportQuality, ExportRenderer, PixelRect};
pub use geometry::{Point, Rect, Size};
pub use interaction::{
    Command, CursorIcon, DisplayFrame, ImagePlacement, InteractionController, InteractionMode,
    InteractionState,
};
pub use raster::{FilterType, RasterImage};
pub use region::{AspectRatio, CropRegion, Handle, RegionBounds};
pub use render::RenderTransform;
pub use view::ViewState;
