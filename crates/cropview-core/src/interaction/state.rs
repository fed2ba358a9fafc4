//! Pointer interaction state and the discrete commands that bypass it.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::region::Handle;

/// The four pointer modes. There are no others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InteractionMode {
    #[default]
    Idle,
    /// Moving the whole region.
    Dragging,
    /// Dragging one corner handle.
    Resizing(Handle),
    /// Moving the image under the viewport.
    Panning,
}

/// Live state of one pointer gesture.
///
/// Created on pointer-down and dropped on pointer-up or leave.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InteractionState {
    pub mode: InteractionMode,
    /// Last pointer position seen. Deltas are measured from here, not from
    /// where the gesture started.
    pub anchor: Option<Point>,
    pub active_handle: Option<Handle>,
}

impl InteractionState {
    pub fn idle() -> Self {
        Self::default()
    }

    /// Start a gesture in `mode` at `at`.
    pub fn begin(mode: InteractionMode, at: Point) -> Self {
        let active_handle = match mode {
            InteractionMode::Resizing(handle) => Some(handle),
            _ => None,
        };
        Self {
            mode,
            anchor: Some(at),
            active_handle,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.mode == InteractionMode::Idle
    }

    /// Move the anchor to `to` and return the incremental delta.
    ///
    /// Returns `None` when no gesture is in progress.
    pub fn advance(&mut self, to: Point) -> Option<(f64, f64)> {
        if self.is_idle() {
            return None;
        }
        let from = self.anchor.replace(to)?;
        Some((to.x - from.x, to.y - from.y))
    }
}

/// Keyboard and toolbar commands. None of them touch the pointer mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    ZoomIn,
    ZoomOut,
    ZoomReset,
    RotateCw,
    RotateCcw,
    /// Recentre a default-sized region.
    Reset,
    /// Remove the region entirely.
    Clear,
}

/// Pointer cursor a UI should show at a given position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorIcon {
    #[default]
    Default,
    /// Over empty canvas: a click creates a new region.
    Crosshair,
    Move,
    ResizeNwSe,
    ResizeNeSw,
    /// Pan modifier held, not yet pressed.
    Grab,
    Grabbing,
}

impl CursorIcon {
    /// CSS `cursor` keyword.
    pub fn css_name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Crosshair => "crosshair",
            Self::Move => "move",
            Self::ResizeNwSe => "nwse-resize",
            Self::ResizeNeSw => "nesw-resize",
            Self::Grab => "grab",
            Self::Grabbing => "grabbing",
        }
    }

    /// Diagonal resize cursor matching a corner.
    pub fn for_handle(handle: Handle) -> Self {
        match handle {
            Handle::Nw | Handle::Se => Self::ResizeNwSe,
            Handle::Ne | Handle::Sw => Self::ResizeNeSw,
        }
    }
}
