//! The crop rectangle in display space.
//!
//! `CropRegion` is a `Copy` value. Every mutation takes the region by value
//! and returns a new, validated region; nothing aliases a shared rectangle.
//! Out-of-range input is clamped, never rejected, because it arrives from
//! continuous pointer motion.
//!
//! # Invariants (after every operation)
//!
//! - `0 <= x`, `0 <= y`, `x + width <= viewport_width`, `y + height <= viewport_height`
//! - `width >= min_size` and `height >= min_size`, unless the viewport itself is smaller
//! - with an aspect lock `r`, `height == width / r`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CropError;
use crate::geometry::{Point, Rect, Size};

/// One of the four corner handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handle {
    Nw,
    Ne,
    Sw,
    Se,
}

impl Handle {
    pub const ALL: [Handle; 4] = [Handle::Nw, Handle::Ne, Handle::Sw, Handle::Se];

    /// The handle drags the left edge (otherwise the right edge).
    pub fn moves_left(self) -> bool {
        matches!(self, Handle::Nw | Handle::Sw)
    }

    /// The handle drags the top edge (otherwise the bottom edge).
    pub fn moves_top(self) -> bool {
        matches!(self, Handle::Nw | Handle::Ne)
    }

    /// Corner position of this handle on `rect`.
    pub fn corner_of(self, rect: &Rect) -> Point {
        let x = if self.moves_left() { rect.x } else { rect.right() };
        let y = if self.moves_top() { rect.y } else { rect.bottom() };
        Point::new(x, y)
    }
}

/// Named aspect-ratio presets offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    Free,
    Square,
    FourByThree,
    SixteenByNine,
    ThreeByTwo,
    TwoByThree,
    NineBySixteen,
}

impl AspectRatio {
    pub const ALL: &[Self] = &[
        Self::Free,
        Self::Square,
        Self::FourByThree,
        Self::SixteenByNine,
        Self::ThreeByTwo,
        Self::TwoByThree,
        Self::NineBySixteen,
    ];

    /// Width / height, or `None` for free.
    pub fn ratio(self) -> Option<f64> {
        match self {
            Self::Free => None,
            Self::Square => Some(1.0),
            Self::FourByThree => Some(4.0 / 3.0),
            Self::SixteenByNine => Some(16.0 / 9.0),
            Self::ThreeByTwo => Some(3.0 / 2.0),
            Self::TwoByThree => Some(2.0 / 3.0),
            Self::NineBySixteen => Some(9.0 / 16.0),
        }
    }

    /// Name used by UI commands.
    pub fn name(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Square => "square",
            Self::FourByThree => "4:3",
            Self::SixteenByNine => "16:9",
            Self::ThreeByTwo => "3:2",
            Self::TwoByThree => "2:3",
            Self::NineBySixteen => "9:16",
        }
    }
}

impl FromStr for AspectRatio {
    type Err = CropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "free" => Ok(Self::Free),
            "square" | "1:1" => Ok(Self::Square),
            "4:3" => Ok(Self::FourByThree),
            "16:9" => Ok(Self::SixteenByNine),
            "3:2" => Ok(Self::ThreeByTwo),
            "2:3" => Ok(Self::TwoByThree),
            "9:16" => Ok(Self::NineBySixteen),
            _ => Err(CropError::UnsupportedAspectRatio(s.to_string())),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Space a region must live in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionBounds {
    pub viewport: Size,
    pub min_size: f64,
}

impl RegionBounds {
    pub fn new(viewport: Size, min_size: f64) -> Self {
        Self { viewport, min_size }
    }

    /// Smallest allowed (width, height). Under a lock the width floor grows so
    /// the derived height still meets `min_size`. Never larger than the viewport.
    fn min_extent(&self, aspect_lock: Option<f64>) -> (f64, f64) {
        let vw = self.viewport.width.max(0.0);
        let vh = self.viewport.height.max(0.0);
        let min_w = match aspect_lock {
            Some(r) => self.min_size.max(self.min_size * r),
            None => self.min_size,
        };
        (min_w.min(vw), self.min_size.min(vh))
    }
}

/// Axis-aligned crop rectangle in display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Locked width / height ratio. Width is authoritative.
    pub aspect_lock: Option<f64>,
}

impl CropRegion {
    /// Build a region from an arbitrary rectangle, clamped into `bounds`.
    ///
    /// Fails only on non-finite coordinates or a non-positive extent.
    pub fn from_rect(
        rect: Rect,
        aspect_lock: Option<f64>,
        bounds: &RegionBounds,
    ) -> Result<Self, CropError> {
        let finite = [rect.x, rect.y, rect.width, rect.height]
            .iter()
            .all(|v| v.is_finite());
        if !finite || rect.width <= 0.0 || rect.height <= 0.0 {
            return Err(CropError::InvalidGeometry(format!(
                "{}x{} at ({}, {})",
                rect.width, rect.height, rect.x, rect.y
            )));
        }
        Ok(Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            aspect_lock: sanitize_ratio(aspect_lock),
        }
        .clamp_to(bounds))
    }

    /// A `width` x `height` region centred on `center`, clamped into `bounds`.
    pub fn centered_at(
        center: Point,
        width: f64,
        height: f64,
        aspect_lock: Option<f64>,
        bounds: &RegionBounds,
    ) -> Self {
        let aspect_lock = sanitize_ratio(aspect_lock);
        let height = match aspect_lock {
            Some(r) => width / r,
            None => height,
        };
        Self {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
            aspect_lock,
        }
        .clamp_to(bounds)
    }

    /// Default region: half the viewport in each dimension, centred.
    pub fn default_for(aspect_lock: Option<f64>, bounds: &RegionBounds) -> Self {
        let vp = bounds.viewport;
        Self::centered_at(
            vp.center(),
            vp.width / 2.0,
            vp.height / 2.0,
            aspect_lock,
            bounds,
        )
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, p: Point) -> bool {
        self.rect().contains(p)
    }

    /// Translate, clamping each axis independently so the region stays inside.
    #[must_use]
    pub fn move_by(self, dx: f64, dy: f64, bounds: &RegionBounds) -> Self {
        if !dx.is_finite() || !dy.is_finite() {
            return self;
        }
        let max_x = (bounds.viewport.width - self.width).max(0.0);
        let max_y = (bounds.viewport.height - self.height).max(0.0);
        Self {
            x: (self.x + dx).clamp(0.0, max_x),
            y: (self.y + dy).clamp(0.0, max_y),
            ..self
        }
    }

    /// Drag the two edges incident to `handle` by `(dx, dy)`.
    ///
    /// The free-form adjustment is clamped to the minimum size and viewport;
    /// then, if a ratio is locked, height is recomputed from width. The
    /// opposite corner stays fixed unless the locked height would leave the
    /// viewport, in which case the region is shrunk and shifted back inside.
    #[must_use]
    pub fn resize_from_handle(
        self,
        handle: Handle,
        dx: f64,
        dy: f64,
        bounds: &RegionBounds,
    ) -> Self {
        if !dx.is_finite() || !dy.is_finite() {
            return self;
        }
        let (min_w, min_h) = bounds.min_extent(self.aspect_lock);
        let vw = bounds.viewport.width.max(0.0);
        let vh = bounds.viewport.height.max(0.0);

        let mut left = self.x;
        let mut top = self.y;
        let mut right = self.right();
        let mut bottom = self.bottom();

        if handle.moves_left() {
            left = (left + dx).clamp(0.0, (right - min_w).max(0.0));
        } else {
            right = (right + dx).clamp((left + min_w).min(vw), vw);
        }
        if handle.moves_top() {
            top = (top + dy).clamp(0.0, (bottom - min_h).max(0.0));
        } else {
            bottom = (bottom + dy).clamp((top + min_h).min(vh), vh);
        }

        let resized = Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
            ..self
        };

        match self.aspect_lock {
            Some(ratio) => resized.apply_lock(ratio, handle, bounds),
            None => resized,
        }
    }

    /// Set or clear the ratio lock. Setting a ratio recomputes the height from
    /// the current width immediately, keeping the region centred where it was.
    #[must_use]
    pub fn set_aspect_lock(self, aspect_lock: Option<f64>, bounds: &RegionBounds) -> Self {
        let aspect_lock = sanitize_ratio(aspect_lock);
        let center = self.rect().center();
        let height = match aspect_lock {
            Some(r) => self.width / r,
            None => self.height,
        };
        Self {
            x: center.x - self.width / 2.0,
            y: center.y - height / 2.0,
            width: self.width,
            height,
            aspect_lock,
        }
        .clamp_to(bounds)
    }

    /// Recentre a default-sized region, keeping the current lock.
    #[must_use]
    pub fn reset(self, bounds: &RegionBounds) -> Self {
        Self::default_for(self.aspect_lock, bounds)
    }

    /// Re-establish every invariant against `bounds`. Used after the viewport
    /// changes size.
    #[must_use]
    pub fn clamp_to(self, bounds: &RegionBounds) -> Self {
        let (min_w, min_h) = bounds.min_extent(self.aspect_lock);
        let vw = bounds.viewport.width.max(0.0);
        let vh = bounds.viewport.height.max(0.0);

        let mut width = sanitize_extent(self.width).clamp(min_w, vw);
        let height = match self.aspect_lock {
            Some(r) => {
                let mut h = width / r;
                if h > vh {
                    h = vh;
                    width = h * r;
                }
                h
            }
            None => sanitize_extent(self.height).clamp(min_h, vh),
        };

        let x = if self.x.is_finite() { self.x } else { 0.0 };
        let y = if self.y.is_finite() { self.y } else { 0.0 };
        Self {
            x: x.clamp(0.0, (vw - width).max(0.0)),
            y: y.clamp(0.0, (vh - height).max(0.0)),
            width,
            height,
            aspect_lock: self.aspect_lock,
        }
    }

    /// Whether every invariant holds against `bounds` (within `eps`).
    pub fn is_valid_within(&self, bounds: &RegionBounds, eps: f64) -> bool {
        let (min_w, min_h) = bounds.min_extent(self.aspect_lock);
        let inside = self.x >= -eps
            && self.y >= -eps
            && self.right() <= bounds.viewport.width + eps
            && self.bottom() <= bounds.viewport.height + eps;
        let sized = self.width + eps >= min_w && self.height + eps >= min_h;
        let locked = self
            .aspect_lock
            .map_or(true, |r| (self.height - self.width / r).abs() <= 1.0);
        inside && sized && locked
    }

    /// Height from width under the lock, shrinking and shifting if the
    /// result overflows the viewport vertically.
    fn apply_lock(self, ratio: f64, handle: Handle, bounds: &RegionBounds) -> Self {
        let vw = bounds.viewport.width.max(0.0);
        let vh = bounds.viewport.height.max(0.0);

        let mut width = self.width;
        let mut height = width / ratio;
        if height > vh {
            height = vh;
            width = height * ratio;
        }

        let x = if handle.moves_left() {
            self.right() - width
        } else {
            self.x
        };
        let y = if handle.moves_top() {
            self.bottom() - height
        } else {
            self.y
        };

        Self {
            x: x.clamp(0.0, (vw - width).max(0.0)),
            y: y.clamp(0.0, (vh - height).max(0.0)),
            width,
            height,
            ..self
        }
    }
}

fn sanitize_ratio(ratio: Option<f64>) -> Option<f64> {
    ratio.filter(|r| r.is_finite() && *r > 0.0)
}

fn sanitize_extent(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
