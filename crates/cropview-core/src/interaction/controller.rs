//! The Interaction Controller: sole owner of view, region and pointer state.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::export::{ExportPlan, ExportQuality, ExportRenderer, PixelRect};
use crate::geometry::{Point, Rect, Size};
use crate::raster::RasterImage;
use crate::region::{AspectRatio, CropRegion, RegionBounds};
use crate::render::RenderTransform;
use crate::view::ViewState;

use super::hit::{hit_test, HitTarget};
use super::redraw::{handle_rects, DisplayFrame, ImagePlacement, RedrawScheduler};
use super::state::{Command, CursorIcon, InteractionMode, InteractionState};

/// Translates pointer events and commands into region and view updates.
///
/// Collaborators only read committed values (status, frames, exports) or
/// hand in a new image; every mutation goes through this type.
#[derive(Debug, Clone)]
pub struct InteractionController {
    config: EngineConfig,
    renderer: ExportRenderer,
    source: Option<Arc<RasterImage>>,
    view: ViewState,
    region: Option<CropRegion>,
    aspect: AspectRatio,
    state: InteractionState,
    /// Space bar held: pointer-down pans instead of hit-testing.
    pan_modifier: bool,
    /// Set once a usable viewport size has been seen.
    viewport_known: bool,
    redraw: RedrawScheduler,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::with_valid_config(EngineConfig::default())
    }
}

impl InteractionController {
    /// Build a controller after checking `config`. Zoom clamping and region
    /// minimums rely on a validated config, so an invalid one is rejected
    /// with [`CropError::Config`](crate::CropError::Config).
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: EngineConfig) -> Self {
        Self {
            renderer: ExportRenderer::new(&config),
            config,
            source: None,
            view: ViewState::default(),
            region: None,
            aspect: AspectRatio::Free,
            state: InteractionState::idle(),
            pan_modifier: false,
            viewport_known: false,
            redraw: RedrawScheduler::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Inputs from the host
    // ------------------------------------------------------------------

    /// Replace the source image. View and region go back to their defaults;
    /// the selected aspect preset is kept.
    pub fn load_image(&mut self, image: Arc<RasterImage>) {
        info!(width = image.width, height = image.height, "source image loaded");
        if !image.is_consistent() {
            warn!(
                width = image.width,
                height = image.height,
                bytes = image.pixels.len(),
                "source buffer does not match its dimensions; exports will fail"
            );
        }
        self.source = Some(image);
        self.view = ViewState::new(self.view.viewport_width, self.view.viewport_height);
        self.state = InteractionState::idle();
        self.region = self
            .viewport_known
            .then(|| CropRegion::default_for(self.aspect.ratio(), &self.bounds()));
        self.redraw.request();
    }

    pub fn source(&self) -> Option<&Arc<RasterImage>> {
        self.source.as_ref()
    }

    /// New display-surface size. The first usable size initialises the
    /// region; later sizes clamp the existing one.
    pub fn resize_viewport(&mut self, width: f64, height: f64) {
        let size = Size::new(width, height);
        if !size.is_valid() {
            debug!(width, height, "ignoring unusable viewport size");
            return;
        }
        if self.view.viewport() == size {
            return;
        }

        self.view = self.view.with_viewport(width, height);
        let bounds = self.bounds();
        if self.viewport_known {
            self.region = self.region.map(|r| r.clamp_to(&bounds));
        } else {
            info!(width, height, "viewport initialised");
            self.viewport_known = true;
            self.region = Some(CropRegion::default_for(self.aspect.ratio(), &bounds));
        }
        self.redraw.request();
    }

    /// Space-bar state. Takes effect on the next pointer-down.
    pub fn set_pan_modifier(&mut self, held: bool) {
        self.pan_modifier = held;
    }

    // ------------------------------------------------------------------
    // Pointer state machine
    // ------------------------------------------------------------------

    pub fn pointer_down(&mut self, p: Point) {
        if !self.accepts_pointer(p) {
            return;
        }

        let mode = if self.pan_modifier {
            InteractionMode::Panning
        } else {
            match hit_test(self.region.as_ref(), p, self.config.handle_hit_tolerance) {
                HitTarget::Handle(handle) => InteractionMode::Resizing(handle),
                HitTarget::Interior => InteractionMode::Dragging,
                HitTarget::Canvas => {
                    self.region = Some(self.new_region_at(p));
                    self.redraw.request();
                    InteractionMode::Dragging
                }
            }
        };

        debug!(?mode, x = p.x, y = p.y, "pointer down");
        self.state = InteractionState::begin(mode, p);
    }

    pub fn pointer_move(&mut self, p: Point) {
        if !p.x.is_finite() || !p.y.is_finite() {
            return;
        }
        let Some((dx, dy)) = self.state.advance(p) else {
            return;
        };
        let bounds = self.bounds();

        let changed = match self.state.mode {
            InteractionMode::Idle => false,
            InteractionMode::Dragging => self.update_region(|r| r.move_by(dx, dy, &bounds)),
            InteractionMode::Resizing(handle) => {
                self.update_region(|r| r.resize_from_handle(handle, dx, dy, &bounds))
            }
            InteractionMode::Panning => {
                let damping = self.config.pan_damping;
                let next = self.view.pan_by(dx * damping, dy * damping);
                let changed = next != self.view;
                self.view = next;
                changed
            }
        };

        if changed {
            self.redraw.request();
        }
    }

    pub fn pointer_up(&mut self) {
        self.end_gesture("pointer up");
    }

    /// Leaving the canvas ends the gesture exactly like pointer-up.
    pub fn pointer_leave(&mut self) {
        self.end_gesture("pointer left canvas");
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Apply a keyboard/toolbar command. The pointer mode is untouched.
    pub fn apply(&mut self, command: Command) {
        let config = &self.config;
        let bounds = self.bounds();
        let before_view = self.view;
        let before_region = self.region;

        match command {
            Command::ZoomIn => self.view = self.view.zoom_in(config),
            Command::ZoomOut => self.view = self.view.zoom_out(config),
            Command::ZoomReset => self.view = self.view.zoom_reset(),
            Command::RotateCw => self.view = self.view.rotate_by(config.rotation_step),
            Command::RotateCcw => self.view = self.view.rotate_by(-config.rotation_step),
            Command::Reset => {
                if self.viewport_known {
                    self.region = Some(CropRegion::default_for(self.aspect.ratio(), &bounds));
                }
            }
            Command::Clear => self.region = None,
        }

        if self.view != before_view || self.region != before_region {
            debug!(
                ?command,
                zoom = self.view.zoom,
                rotation = self.view.rotation_degrees,
                has_region = self.region.is_some(),
                "command applied"
            );
            self.redraw.request();
        }
    }

    /// Rotate by an arbitrary angle; positive is clockwise.
    pub fn rotate_by(&mut self, degrees: f64) {
        let next = self.view.rotate_by(degrees);
        if next != self.view {
            debug!(rotation = next.rotation_degrees, "rotation changed");
            self.view = next;
            self.redraw.request();
        }
    }

    /// Select an aspect preset by name.
    ///
    /// # Errors
    ///
    /// `UnsupportedAspectRatio` for an unknown name. The lock is cleared
    /// (free) before the error is returned.
    pub fn set_aspect_ratio(&mut self, name: &str) -> Result<()> {
        match name.parse::<AspectRatio>() {
            Ok(aspect) => {
                self.set_aspect(aspect);
                Ok(())
            }
            Err(e) => {
                warn!(name, "unsupported aspect ratio, falling back to free");
                self.set_aspect(AspectRatio::Free);
                Err(e)
            }
        }
    }

    pub fn set_aspect(&mut self, aspect: AspectRatio) {
        debug!(%aspect, "aspect ratio selected");
        self.aspect = aspect;
        let bounds = self.bounds();
        if self.update_region(|r| r.set_aspect_lock(aspect.ratio(), &bounds)) {
            self.redraw.request();
        }
    }

    /// Place the region programmatically. Degenerate input is dropped.
    pub fn set_region(&mut self, rect: Rect) {
        if !self.viewport_known {
            debug!("no viewport yet, region ignored");
            return;
        }
        match CropRegion::from_rect(rect, self.aspect.ratio(), &self.bounds()) {
            Ok(region) => {
                self.region = Some(region);
                self.redraw.request();
            }
            Err(e) => debug!(error = %e, "region ignored"),
        }
    }

    // ------------------------------------------------------------------
    // Outputs
    // ------------------------------------------------------------------

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn region(&self) -> Option<&CropRegion> {
        self.region.as_ref()
    }

    pub fn aspect(&self) -> AspectRatio {
        self.aspect
    }

    pub fn interaction_state(&self) -> &InteractionState {
        &self.state
    }

    pub fn mode(&self) -> InteractionMode {
        self.state.mode
    }

    pub fn zoom_percent(&self) -> u32 {
        self.view.zoom_percent()
    }

    pub fn rotation_degrees(&self) -> f64 {
        self.view.rotation_degrees
    }

    /// Transform for the current image and view, if both have a size.
    pub fn render_transform(&self) -> Option<RenderTransform> {
        let source = self.source.as_ref()?;
        RenderTransform::new(source.width, source.height, &self.view)
    }

    /// Source pixels the next export would read.
    pub fn source_rect(&self) -> Option<PixelRect> {
        self.export_plan(ExportQuality::Full)
            .ok()
            .map(|plan| plan.source_rect)
    }

    pub fn export_plan(&self, quality: ExportQuality) -> Result<ExportPlan> {
        self.renderer.plan(
            self.source.as_deref(),
            &self.view,
            self.region.as_ref(),
            quality,
        )
    }

    /// Cursor to show at `p`, using the same hit-test as pointer-down.
    pub fn cursor_at(&self, p: Point) -> CursorIcon {
        match self.state.mode {
            InteractionMode::Panning => return CursorIcon::Grabbing,
            InteractionMode::Dragging => return CursorIcon::Move,
            InteractionMode::Resizing(handle) => return CursorIcon::for_handle(handle),
            InteractionMode::Idle => {}
        }
        if !self.accepts_pointer(p) {
            return CursorIcon::Default;
        }
        if self.pan_modifier {
            return CursorIcon::Grab;
        }
        match hit_test(self.region.as_ref(), p, self.config.handle_hit_tolerance) {
            HitTarget::Handle(handle) => CursorIcon::for_handle(handle),
            HitTarget::Interior => CursorIcon::Move,
            HitTarget::Canvas => CursorIcon::Crosshair,
        }
    }

    pub fn needs_redraw(&self) -> bool {
        self.redraw.is_pending()
    }

    /// Build the next frame if anything spatial changed since the last one.
    ///
    /// Call once per host animation frame; mutations in between coalesce.
    pub fn recompute_display(&mut self) -> Option<DisplayFrame> {
        let coalesced = self.redraw.take()?;

        let image = self.render_transform().map(|t| ImagePlacement {
            drawn: t.drawn_rect(),
            corners: t.image_corners(),
        });
        let handles = self
            .region
            .as_ref()
            .map(|r| handle_rects(r, self.config.handle_size))
            .unwrap_or_default();

        let frame = DisplayFrame {
            frame: self.redraw.frame_count(),
            image,
            rotation_degrees: self.view.rotation_degrees,
            zoom_percent: self.view.zoom_percent(),
            region: self.region,
            handles,
        };
        debug!(frame = frame.frame, coalesced, "redraw");
        Some(frame)
    }

    /// Small cropped raster sized for on-screen preview.
    pub fn render_preview(&self) -> Result<RasterImage> {
        self.export(ExportQuality::Preview)
    }

    /// Cropped raster at native source resolution.
    pub fn export_full(&self) -> Result<RasterImage> {
        self.export(ExportQuality::Full)
    }

    fn export(&self, quality: ExportQuality) -> Result<RasterImage> {
        let result = self.renderer.render(
            self.source.as_deref(),
            &self.view,
            self.region.as_ref(),
            quality,
        );
        match &result {
            Ok(image) => info!(
                ?quality,
                width = image.width,
                height = image.height,
                "crop exported"
            ),
            Err(e) => warn!(?quality, error = %e, "export failed"),
        }
        result
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn bounds(&self) -> RegionBounds {
        RegionBounds::new(self.view.viewport(), self.config.min_region_size)
    }

    fn accepts_pointer(&self, p: Point) -> bool {
        self.viewport_known && p.x.is_finite() && p.y.is_finite()
    }

    /// Default-sized region centred on `p`, honouring the current lock.
    fn new_region_at(&self, p: Point) -> CropRegion {
        let side = self.config.new_region_size;
        CropRegion::centered_at(p, side, side, self.aspect.ratio(), &self.bounds())
    }

    /// Replace the region with `f(region)`. Returns whether it changed.
    fn update_region(&mut self, f: impl FnOnce(CropRegion) -> CropRegion) -> bool {
        let Some(region) = self.region else {
            return false;
        };
        let next = f(region);
        self.region = Some(next);
        next != region
    }

    fn end_gesture(&mut self, reason: &str) {
        if !self.state.is_idle() {
            debug!(mode = ?self.state.mode, reason, "gesture ended");
        }
        self.state = InteractionState::idle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CropError;
    use crate::region::Handle;

    fn controller() -> InteractionController {
        let mut c = InteractionController::default();
        c.resize_viewport(1000.0, 600.0);
        c.load_image(Arc::new(RasterImage::new(200, 100, vec![90; 200 * 100 * 3])));
        c
    }

    fn rect_of(c: &InteractionController) -> (f64, f64, f64, f64) {
        let r = c.region().unwrap();
        (r.x, r.y, r.width, r.height)
    }

    #[test]
    fn test_region_initialised_with_viewport() {
        let mut c = InteractionController::default();
        assert!(c.region().is_none());
        c.resize_viewport(1000.0, 600.0);
        assert_eq!(rect_of(&c), (250.0, 150.0, 500.0, 300.0));
    }

    #[test]
    fn test_later_resize_clamps_region() {
        let mut c = controller();
        c.set_region(Rect::new(600.0, 300.0, 300.0, 200.0));
        c.resize_viewport(500.0, 400.0);
        let r = c.region().unwrap();
        assert!(r.right() <= 500.0 && r.bottom() <= 400.0);
        assert_eq!((r.width, r.height), (300.0, 200.0));
    }

    #[test]
    fn test_drag_interior_moves_region() {
        let mut c = controller();
        c.pointer_down(Point::new(500.0, 300.0));
        assert_eq!(c.mode(), InteractionMode::Dragging);
        c.pointer_move(Point::new(520.0, 310.0));
        c.pointer_move(Point::new(530.0, 305.0));
        assert_eq!(rect_of(&c), (280.0, 155.0, 500.0, 300.0));
        c.pointer_up();
        assert_eq!(*c.interaction_state(), InteractionState::idle());
    }

    #[test]
    fn test_handle_resize() {
        let mut c = controller();
        // SE corner of the default region is (750, 450)
        c.pointer_down(Point::new(745.0, 455.0));
        assert_eq!(c.mode(), InteractionMode::Resizing(Handle::Se));
        assert_eq!(c.interaction_state().active_handle, Some(Handle::Se));
        c.pointer_move(Point::new(795.0, 475.0));
        assert_eq!(rect_of(&c), (250.0, 150.0, 550.0, 320.0));
    }

    #[test]
    fn test_empty_canvas_creates_region() {
        let mut c = controller();
        c.pointer_down(Point::new(100.0, 80.0));
        assert_eq!(c.mode(), InteractionMode::Dragging);
        assert_eq!(rect_of(&c), (50.0, 30.0, 100.0, 100.0));
    }

    #[test]
    fn test_new_region_honours_lock() {
        let mut c = controller();
        c.set_aspect_ratio("16:9").unwrap();
        c.pointer_down(Point::new(100.0, 100.0));
        let r = c.region().unwrap();
        assert_eq!(r.width, 100.0);
        assert!((r.height - 56.25).abs() < 1e-9);
    }

    #[test]
    fn test_pan_mode_damps_and_leaves_region() {
        let mut c = controller();
        let before = *c.region().unwrap();
        c.set_pan_modifier(true);
        c.pointer_down(Point::new(500.0, 300.0));
        assert_eq!(c.mode(), InteractionMode::Panning);
        c.pointer_move(Point::new(540.0, 280.0));
        assert_eq!((c.view().pan_x, c.view().pan_y), (20.0, -10.0));
        assert_eq!(*c.region().unwrap(), before);
    }

    #[test]
    fn test_pointer_leave_cleans_up() {
        let mut c = controller();
        c.pointer_down(Point::new(500.0, 300.0));
        c.pointer_move(Point::new(510.0, 300.0));
        c.pointer_leave();
        assert!(c.interaction_state().is_idle());
        assert_eq!(c.interaction_state().anchor, None);
        assert_eq!(c.interaction_state().active_handle, None);

        // Moves after leaving do nothing
        let before = *c.region().unwrap();
        c.pointer_move(Point::new(900.0, 500.0));
        assert_eq!(*c.region().unwrap(), before);
    }

    #[test]
    fn test_commands_keep_pointer_mode() {
        let mut c = controller();
        c.pointer_down(Point::new(500.0, 300.0));
        c.apply(Command::ZoomIn);
        c.apply(Command::RotateCw);
        assert_eq!(c.mode(), InteractionMode::Dragging);
        assert_eq!(c.zoom_percent(), 125);
        assert_eq!(c.rotation_degrees(), 90.0);

        c.apply(Command::RotateCcw);
        c.apply(Command::RotateCcw);
        assert_eq!(c.rotation_degrees(), 270.0);
    }

    #[test]
    fn test_reset_and_clear() {
        let mut c = controller();
        c.set_region(Rect::new(10.0, 10.0, 50.0, 50.0));
        c.apply(Command::Reset);
        assert_eq!(rect_of(&c), (250.0, 150.0, 500.0, 300.0));

        c.apply(Command::Clear);
        assert!(c.region().is_none());
        assert!(matches!(c.render_preview(), Err(CropError::RenderUnavailable(_))));
    }

    #[test]
    fn test_unknown_aspect_falls_back_to_free() {
        let mut c = controller();
        c.set_aspect_ratio("square").unwrap();
        assert_eq!(c.region().unwrap().aspect_lock, Some(1.0));

        let err = c.set_aspect_ratio("7:5").unwrap_err();
        assert!(matches!(err, CropError::UnsupportedAspectRatio(_)));
        assert_eq!(c.aspect(), AspectRatio::Free);
        assert_eq!(c.region().unwrap().aspect_lock, None);
    }

    #[test]
    fn test_degenerate_set_region_ignored() {
        let mut c = controller();
        let before = *c.region().unwrap();
        c.set_region(Rect::new(0.0, 0.0, -5.0, 10.0));
        assert_eq!(*c.region().unwrap(), before);
    }

    #[test]
    fn test_redraws_coalesce() {
        let mut c = controller();
        assert!(c.recompute_display().is_some());
        assert!(c.recompute_display().is_none());

        c.pointer_down(Point::new(500.0, 300.0));
        for i in 1..=10 {
            c.pointer_move(Point::new(500.0 + i as f64, 300.0));
        }
        let frame = c.recompute_display().unwrap();
        assert_eq!(frame.region.unwrap().x, 260.0);
        assert_eq!(frame.handles.len(), 4);
        assert!(c.recompute_display().is_none());
    }

    #[test]
    fn test_no_redraw_without_spatial_change() {
        let mut c = controller();
        let _ = c.recompute_display();

        // Pressing inside and moving against a wall changes nothing
        c.set_region(Rect::new(0.0, 0.0, 100.0, 100.0));
        let _ = c.recompute_display();
        c.pointer_down(Point::new(50.0, 50.0));
        c.pointer_move(Point::new(40.0, 40.0));
        c.pointer_up();
        assert!(!c.needs_redraw());
        assert!(c.recompute_display().is_none());
    }

    #[test]
    fn test_cursor_feedback() {
        let mut c = controller();
        assert_eq!(c.cursor_at(Point::new(252.0, 152.0)), CursorIcon::ResizeNwSe);
        assert_eq!(c.cursor_at(Point::new(748.0, 152.0)), CursorIcon::ResizeNeSw);
        assert_eq!(c.cursor_at(Point::new(500.0, 300.0)), CursorIcon::Move);
        assert_eq!(c.cursor_at(Point::new(20.0, 20.0)), CursorIcon::Crosshair);

        c.set_pan_modifier(true);
        assert_eq!(c.cursor_at(Point::new(20.0, 20.0)), CursorIcon::Grab);
        c.pointer_down(Point::new(20.0, 20.0));
        assert_eq!(c.cursor_at(Point::new(20.0, 20.0)), CursorIcon::Grabbing);
    }

    #[test]
    fn test_load_image_resets_view_and_region() {
        let mut c = controller();
        c.apply(Command::ZoomIn);
        c.rotate_by(15.0);
        c.set_region(Rect::new(0.0, 0.0, 100.0, 100.0));

        c.load_image(Arc::new(RasterImage::new(10, 10, vec![0; 300])));
        assert_eq!(c.zoom_percent(), 100);
        assert_eq!(c.rotation_degrees(), 0.0);
        assert_eq!(rect_of(&c), (250.0, 150.0, 500.0, 300.0));
        assert_eq!(c.view().viewport_width, 1000.0);
    }

    #[test]
    fn test_source_rect_and_export() {
        let c = controller();
        // Default region (250, 150, 500, 300) over a 5x contain scale
        assert_eq!(c.source_rect(), Some(PixelRect::new(50, 20, 100, 60)));

        let preview = c.render_preview().unwrap();
        assert_eq!((preview.width, preview.height), (300, 180));
        let full = c.export_full().unwrap();
        assert_eq!((full.width, full.height), (100, 60));
    }

    #[test]
    fn test_export_without_image_fails() {
        let mut c = InteractionController::default();
        c.resize_viewport(1000.0, 600.0);
        assert!(matches!(c.export_full(), Err(CropError::RenderUnavailable(_))));
    }

    #[test]
    fn test_pointer_before_viewport_ignored() {
        let mut c = InteractionController::default();
        c.pointer_down(Point::new(10.0, 10.0));
        assert!(c.interaction_state().is_idle());
        assert!(c.region().is_none());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let negative_min = EngineConfig {
            min_region_size: -50.0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            InteractionController::new(negative_min),
            Err(CropError::Config(_))
        ));

        let inverted_zoom = EngineConfig {
            min_zoom: 4.0,
            max_zoom: 2.0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            InteractionController::new(inverted_zoom),
            Err(CropError::Config(_))
        ));
    }

    #[test]
    fn test_new_accepts_valid_config() {
        let config = EngineConfig {
            min_region_size: 32.0,
            ..EngineConfig::default()
        };
        let c = InteractionController::new(config).unwrap();
        assert_eq!(c.config().min_region_size, 32.0);
    }

    #[test]
    fn test_viewport_shrink_keeps_lock() {
        let mut c = controller();
        c.set_region(Rect::new(100.0, 100.0, 400.0, 300.0));
        c.set_aspect_ratio("16:9").unwrap();
        assert_eq!(rect_of(&c).3, 225.0);

        let ratio = 16.0 / 9.0;
        let check = |c: &InteractionController, vw: f64, vh: f64| {
            let r = c.region().unwrap();
            assert_eq!(r.aspect_lock, Some(ratio));
            assert!(r.x >= 0.0 && r.y >= 0.0);
            assert!(r.right() <= vw + 1e-9 && r.bottom() <= vh + 1e-9);
            assert!((r.height - r.width / ratio).abs() <= 1.0);
        };

        // Too short: height caps at the viewport and width follows
        c.resize_viewport(1000.0, 150.0);
        check(&c, 1000.0, 150.0);
        assert_eq!(rect_of(&c).3, 150.0);

        // Too narrow: width caps and height follows
        c.resize_viewport(200.0, 600.0);
        check(&c, 200.0, 600.0);
        assert_eq!(rect_of(&c).2, 200.0);
    }
}
