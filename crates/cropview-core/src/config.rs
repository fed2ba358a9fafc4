//! Tunable engine parameters.
//!
//! All sizes are in display-space pixels except the preview dimensions,
//! which are output pixels. Every field has a default, so a partial TOML
//! document (or an empty one) is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::error::{CropError, Result};

/// Configuration for the interactive crop engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum crop width and height.
    pub min_region_size: f64,
    /// Side length of a region created by clicking on empty canvas.
    pub new_region_size: f64,
    /// Drawn size of a corner handle.
    pub handle_size: f64,
    /// Grab radius around each corner. Larger than half the handle size.
    pub handle_hit_tolerance: f64,
    /// Multiplicative factor applied by zoom in / zoom out.
    pub zoom_step: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Degrees added or removed by a single rotate command.
    pub rotation_step: f64,
    /// Fraction of the pointer delta applied to the pan offset.
    pub pan_damping: f64,
    /// Longest side of a preview export.
    pub preview_max_dimension: u32,
    /// Floor for the shorter side of a preview export.
    pub preview_min_dimension: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_region_size: 20.0,
            new_region_size: 100.0,
            handle_size: 8.0,
            handle_hit_tolerance: 12.0,
            zoom_step: 1.25,
            min_zoom: 0.1,
            max_zoom: 10.0,
            rotation_step: 90.0,
            pan_damping: 0.5,
            preview_max_dimension: 300,
            preview_min_dimension: 50,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document and validate the result.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(contents).map_err(|e| CropError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a pretty-printed TOML document.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CropError::Config(e.to_string()))
    }

    /// Reject values that would break the engine's invariants.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("min_region_size", self.min_region_size),
            ("new_region_size", self.new_region_size),
            ("handle_size", self.handle_size),
            ("handle_hit_tolerance", self.handle_hit_tolerance),
            ("min_zoom", self.min_zoom),
            ("max_zoom", self.max_zoom),
            ("pan_damping", self.pan_damping),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(CropError::Config(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        if !self.zoom_step.is_finite() || self.zoom_step <= 1.0 {
            return Err(CropError::Config(format!(
                "zoom_step must be greater than 1, got {}",
                self.zoom_step
            )));
        }
        if self.min_zoom > self.max_zoom {
            return Err(CropError::Config(format!(
                "min_zoom ({}) exceeds max_zoom ({})",
                self.min_zoom, self.max_zoom
            )));
        }
        if !(self.min_zoom..=self.max_zoom).contains(&1.0) {
            return Err(CropError::Config(
                "zoom range must include 1.0".to_string(),
            ));
        }
        if !self.rotation_step.is_finite() {
            return Err(CropError::Config("rotation_step must be finite".to_string()));
        }
        if self.new_region_size < self.min_region_size {
            return Err(CropError::Config(format!(
                "new_region_size ({}) is below min_region_size ({})",
                self.new_region_size, self.min_region_size
            )));
        }
        if self.preview_min_dimension == 0
            || self.preview_min_dimension > self.preview_max_dimension
        {
            return Err(CropError::Config(format!(
                "preview dimensions must satisfy 0 < min ({}) <= max ({})",
                self.preview_min_dimension, self.preview_max_dimension
            )));
        }
        Ok(())
    }
}
