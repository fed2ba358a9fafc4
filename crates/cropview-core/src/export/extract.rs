//! Integer source rectangles and pixel extraction.

use serde::{Deserialize, Serialize};

use crate::error::{CropError, Result};
use crate::geometry::Rect;
use crate::raster::RasterImage;

/// Values this close to an integer are treated as that integer, so float
/// noise from the inverse transform does not add a stray row or column.
const SNAP_EPSILON: f64 = 1e-6;

/// Pixel-aligned rectangle inside a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest pixel rectangle covering `rect`, clipped to `width` x `height`.
    pub fn covering(rect: &Rect, width: u32, height: u32) -> Self {
        let clip = |v: f64, max: u32| v.clamp(0.0, max as f64) as u32;

        let left = clip(snap(rect.x).floor(), width);
        let top = clip(snap(rect.y).floor(), height);
        let right = clip(snap(rect.right()).ceil(), width);
        let bottom = clip(snap(rect.bottom()).ceil(), height);

        Self {
            x: left,
            y: top,
            width: right.saturating_sub(left),
            height: bottom.saturating_sub(top),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

fn snap(v: f64) -> f64 {
    let rounded = v.round();
    if (v - rounded).abs() < SNAP_EPSILON {
        rounded
    } else {
        v
    }
}

/// Copy the pixels under `rect` into a new raster.
///
/// # Errors
///
/// `RenderUnavailable` if the rectangle is empty or reaches outside the
/// image, or the source buffer does not match its declared size.
pub fn extract(image: &RasterImage, rect: &PixelRect) -> Result<RasterImage> {
    if rect.is_empty() {
        return Err(CropError::RenderUnavailable(
            "crop covers no source pixels".to_string(),
        ));
    }
    if !image.is_consistent() {
        return Err(CropError::RenderUnavailable(format!(
            "source buffer does not match {}x{}",
            image.width, image.height
        )));
    }
    let right = rect.x as u64 + rect.width as u64;
    let bottom = rect.y as u64 + rect.height as u64;
    if right > image.width as u64 || bottom > image.height as u64 {
        return Err(CropError::RenderUnavailable(format!(
            "{}x{} at ({}, {}) exceeds {}x{} source",
            rect.width, rect.height, rect.x, rect.y, image.width, image.height
        )));
    }

    // Whole image: no copy loop needed
    if rect.x == 0 && rect.y == 0 && rect.width == image.width && rect.height == image.height {
        return Ok(image.clone());
    }

    let src_stride = image.width as usize * 3;
    let row_bytes = rect.width as usize * 3;
    let mut pixels = Vec::with_capacity(row_bytes * rect.height as usize);

    for row in rect.y..rect.y + rect.height {
        let start = row as usize * src_stride + rect.x as usize * 3;
        pixels.extend_from_slice(&image.pixels[start..start + row_bytes]);
    }

    Ok(RasterImage::new(rect.width, rect.height, pixels))
}
