//! Redraw coalescing.
//!
//! Mutations mark the scheduler dirty; the host's frame callback pulls a
//! single [`DisplayFrame`] per tick. Any number of requests between two
//! pulls produce one frame, and a pull with nothing pending produces none.

use serde::Serialize;

use crate::geometry::{Point, Rect};
use crate::region::CropRegion;

/// Dirty flag plus a frame counter.
#[derive(Debug, Clone, Default)]
pub struct RedrawScheduler {
    pending: bool,
    /// Requests folded into the pending frame.
    coalesced: u32,
    frames: u64,
}

impl RedrawScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark spatial state as changed.
    pub fn request(&mut self) {
        self.pending = true;
        self.coalesced = self.coalesced.saturating_add(1);
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consume the pending request. Returns the number of requests it
    /// covered, or `None` when nothing changed.
    pub fn take(&mut self) -> Option<u32> {
        if !self.pending {
            return None;
        }
        let covered = self.coalesced;
        self.pending = false;
        self.coalesced = 0;
        self.frames += 1;
        Some(covered)
    }

    /// Frames emitted so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

/// Where the image lands on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImagePlacement {
    /// Unrotated drawn rectangle; the host rotates it about the viewport centre.
    pub drawn: Rect,
    /// Image corners after rotation, NW, NE, SW, SE of the source.
    pub corners: [Point; 4],
}

/// Everything a host needs to paint one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayFrame {
    pub frame: u64,
    pub image: Option<ImagePlacement>,
    pub rotation_degrees: f64,
    pub zoom_percent: u32,
    pub region: Option<CropRegion>,
    /// Handle squares in NW, NE, SW, SE order; empty without a region.
    pub handles: Vec<Rect>,
}

/// Square of side `size` centred on each corner of `region`.
pub fn handle_rects(region: &CropRegion, size: f64) -> Vec<Rect> {
    let half = size / 2.0;
    region
        .rect()
        .corners()
        .iter()
        .map(|c| Rect::new(c.x - half, c.y - half, size, size))
        .collect()
}
