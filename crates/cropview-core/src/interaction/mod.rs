//! Pointer and command handling.
//!
//! [`InteractionController`] owns the view, the crop region and the pointer
//! state. Pointer events go through a four-mode state machine:
//!
//! ```text
//!            down on handle         down inside           down on canvas / space held
//!   Idle ─────────────────▶ Resizing   Idle ─────▶ Dragging   Idle ─────▶ Dragging / Panning
//!    ▲                                                                   │
//!    └────────────────────────── up / leave ─────────────────────────────┘
//! ```
//!
//! Commands (zoom, rotate, reset, clear) bypass the machine. Every spatial
//! change marks a pending redraw that the host pulls with
//! [`InteractionController::recompute_display`].

mod controller;
mod hit;
mod redraw;
mod state;

pub use controller::InteractionController;
pub use hit::{hit_test, HitTarget};
pub use redraw::{handle_rects, DisplayFrame, ImagePlacement, RedrawScheduler};
pub use state::{Command, CursorIcon, InteractionMode, InteractionState};
