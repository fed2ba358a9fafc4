//! Export Renderer: turn the committed view and crop region into pixels.
//!
//! # Pipeline
//!
//! 1. Map the four region corners to source space and take their
//!    axis-aligned bounding box, clipped to the image.
//! 2. Copy those source pixels.
//! 3. Rotate the copy by the view rotation onto an expanded canvas.
//! 4. Previews are scaled to fit `preview_max_dimension`; full exports
//!    keep native resolution.
//!
//! Previews at arbitrary angles shrink the copy before step 3 so the
//! resampling pass only touches about as many pixels as the output has.
//!
//! Step 3 rotates the extracted bounding box, so a rotated export shows the
//! content the way it appeared on screen, including the canvas exposed at
//! the corners.

mod extract;
mod resize;
mod rotation;

pub use extract::{extract, PixelRect};
pub use resize::{preview_dimensions, resize_exact};
pub use rotation::{prerotation_size, rotate, rotated_bounds};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{CropError, Result};
use crate::raster::{FilterType, RasterImage};
use crate::region::CropRegion;
use crate::render::RenderTransform;
use crate::view::ViewState;

/// Preview or full-resolution export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportQuality {
    /// Small output for on-screen preview, bilinear.
    #[default]
    Preview,
    /// Native source resolution, Lanczos3.
    Full,
}

impl ExportQuality {
    pub fn filter(self) -> FilterType {
        match self {
            Self::Preview => FilterType::Bilinear,
            Self::Full => FilterType::Lanczos3,
        }
    }
}

/// Resolved export: what will be read and how big the result is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportPlan {
    pub source_rect: PixelRect,
    pub rotation_degrees: f64,
    /// Final output size.
    pub output_width: u32,
    pub output_height: u32,
}

/// Produces cropped rasters from a source image, view and region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportRenderer {
    preview_max_dimension: u32,
    preview_min_dimension: u32,
}

impl Default for ExportRenderer {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl ExportRenderer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            preview_max_dimension: config.preview_max_dimension,
            preview_min_dimension: config.preview_min_dimension,
        }
    }

    /// Work out the source rectangle and output size without touching pixels.
    ///
    /// # Errors
    ///
    /// `RenderUnavailable` when the image or region is missing, the viewport
    /// has no size, or the region does not overlap the image.
    pub fn plan(
        &self,
        source: Option<&RasterImage>,
        view: &ViewState,
        region: Option<&CropRegion>,
        quality: ExportQuality,
    ) -> Result<ExportPlan> {
        let source = source.ok_or_else(|| unavailable("no source image loaded"))?;
        let region = region.ok_or_else(|| unavailable("no crop region"))?;
        let transform = RenderTransform::new(source.width, source.height, view)
            .ok_or_else(|| unavailable("image or viewport has no size"))?;

        let source_rect = PixelRect::covering(
            &transform.display_rect_to_source(&region.rect()),
            source.width,
            source.height,
        );
        if source_rect.is_empty() {
            return Err(unavailable("crop region does not overlap the image"));
        }

        let rotation_degrees = transform.rotation_degrees();
        let (output_width, output_height) = match quality {
            ExportQuality::Preview => preview_dimensions(
                region.width,
                region.height,
                self.preview_max_dimension,
                self.preview_min_dimension,
            )
            .ok_or_else(|| unavailable("crop region has no area"))?,
            ExportQuality::Full => {
                rotated_bounds(source_rect.width, source_rect.height, rotation_degrees)
            }
        };

        Ok(ExportPlan {
            source_rect,
            rotation_degrees,
            output_width,
            output_height,
        })
    }

    /// Run the full pipeline. Either the whole output is produced or an
    /// error is returned; there is no partial result.
    pub fn render(
        &self,
        source: Option<&RasterImage>,
        view: &ViewState,
        region: Option<&CropRegion>,
        quality: ExportQuality,
    ) -> Result<RasterImage> {
        let plan = self.plan(source, view, region, quality)?;
        let source = source.ok_or_else(|| unavailable("no source image loaded"))?;

        let filter = quality.filter();
        let mut cropped = extract(source, &plan.source_rect)?;
        if quality == ExportQuality::Preview {
            if let Some((w, h)) = prerotation_size(
                cropped.width,
                cropped.height,
                plan.rotation_degrees,
                plan.output_width,
                plan.output_height,
            ) {
                debug!(
                    from_width = cropped.width,
                    from_height = cropped.height,
                    to_width = w,
                    to_height = h,
                    "downscaling preview before rotation"
                );
                cropped = resize_exact(&cropped, w, h, filter)?;
            }
        }
        let rotated = rotate(&cropped, plan.rotation_degrees, filter)?;
        resize_exact(&rotated, plan.output_width, plan.output_height, filter)
    }
}

fn unavailable(reason: &str) -> CropError {
    CropError::RenderUnavailable(reason.to_string())
}
