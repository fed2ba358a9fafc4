//! Error types for the crop engine.

use thiserror::Error;

/// Errors surfaced by the crop engine.
///
/// Pointer-driven geometry problems are clamped where they happen and never
/// reach the caller; only export, aspect-ratio selection and configuration
/// loading return these.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CropError {
    /// Degenerate rectangle input (zero or negative extent, non-finite values).
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// No source image, no crop region, or the output buffer could not be built.
    #[error("Render unavailable: {0}")]
    RenderUnavailable(String),

    /// Aspect ratio name outside the supported preset list.
    #[error("Unsupported aspect ratio: {0}")]
    UnsupportedAspectRatio(String),

    /// Configuration could not be parsed or failed validation.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CropError>;
