//! Zoom, rotation, pan and viewport size.
//!
//! `ViewState` is a plain value: every operation takes `self` and returns the
//! updated state. It knows nothing about the crop region.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::geometry::Size;

/// Display parameters for the source image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Zoom multiplier on top of the contain scale. Always positive.
    pub zoom: f64,
    /// Rotation about the viewport centre, clockwise, normalised to `[0, 360)`.
    pub rotation_degrees: f64,
    /// Horizontal pan offset in display pixels.
    pub pan_x: f64,
    /// Vertical pan offset in display pixels.
    pub pan_y: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            rotation_degrees: 0.0,
            pan_x: 0.0,
            pan_y: 0.0,
            viewport_width: 0.0,
            viewport_height: 0.0,
        }
    }
}

impl ViewState {
    /// Default view for a viewport of the given size.
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            viewport_width,
            viewport_height,
            ..Self::default()
        }
    }

    pub fn viewport(&self) -> Size {
        Size::new(self.viewport_width, self.viewport_height)
    }

    /// Zoom expressed as a whole percentage for status display.
    pub fn zoom_percent(&self) -> u32 {
        (self.zoom * 100.0).round() as u32
    }

    #[must_use]
    pub fn zoom_in(self, config: &EngineConfig) -> Self {
        self.with_zoom(self.zoom * config.zoom_step, config)
    }

    #[must_use]
    pub fn zoom_out(self, config: &EngineConfig) -> Self {
        self.with_zoom(self.zoom / config.zoom_step, config)
    }

    /// Back to 1.0 exactly, with pan cleared.
    #[must_use]
    pub fn zoom_reset(self) -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            ..self
        }
    }

    #[must_use]
    pub fn with_zoom(self, zoom: f64, config: &EngineConfig) -> Self {
        if !zoom.is_finite() {
            return self;
        }
        Self {
            zoom: zoom.clamp(config.min_zoom, config.max_zoom),
            ..self
        }
    }

    /// Rotate by an arbitrary angle; positive is clockwise.
    #[must_use]
    pub fn rotate_by(self, degrees: f64) -> Self {
        if !degrees.is_finite() {
            return self;
        }
        Self {
            rotation_degrees: normalize_degrees(self.rotation_degrees + degrees),
            ..self
        }
    }

    #[must_use]
    pub fn pan_by(self, dx: f64, dy: f64) -> Self {
        if !dx.is_finite() || !dy.is_finite() {
            return self;
        }
        Self {
            pan_x: self.pan_x + dx,
            pan_y: self.pan_y + dy,
            ..self
        }
    }

    #[must_use]
    pub fn with_viewport(self, width: f64, height: f64) -> Self {
        Self {
            viewport_width: width,
            viewport_height: height,
            ..self
        }
    }
}

/// Wrap an angle into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
