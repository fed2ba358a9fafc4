//! Mapping between source-image pixels and display-surface pixels.
//!
//! # Composition
//!
//! ```text
//! display = rotate_about_viewport_centre(source * scale + offset, rotation)
//! source  = (rotate_about_viewport_centre(display, -rotation) - offset) / scale
//! ```
//!
//! where `scale = contain_scale * zoom` and `offset` centres the drawn image
//! in the viewport, shifted by the pan.

use crate::geometry::{Point, Rect, Size};
use crate::view::ViewState;

/// Precomputed transform for one `(image size, view state)` pair.
///
/// A pure value: building it has no side effects and two transforms built
/// from the same inputs are identical.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTransform {
    source: Size,
    viewport: Size,
    contain_scale: f64,
    scale: f64,
    offset: Point,
    rotation_degrees: f64,
}

impl RenderTransform {
    /// Build the transform. Returns `None` if either size is degenerate.
    pub fn new(source_width: u32, source_height: u32, view: &ViewState) -> Option<Self> {
        let source = Size::new(source_width as f64, source_height as f64);
        let viewport = view.viewport();
        if !source.is_valid() || !viewport.is_valid() || view.zoom <= 0.0 {
            return None;
        }

        let contain_scale = contain_scale(source, viewport);
        let scale = contain_scale * view.zoom;
        let drawn_w = source.width * scale;
        let drawn_h = source.height * scale;
        let offset = Point::new(
            (viewport.width - drawn_w) / 2.0 + view.pan_x,
            (viewport.height - drawn_h) / 2.0 + view.pan_y,
        );

        Some(Self {
            source,
            viewport,
            contain_scale,
            scale,
            offset,
            rotation_degrees: view.rotation_degrees,
        })
    }

    /// Largest scale that fits the whole source inside the viewport.
    pub fn contain_scale(&self) -> f64 {
        self.contain_scale
    }

    /// Contain scale multiplied by zoom.
    pub fn effective_scale(&self) -> f64 {
        self.scale
    }

    /// Top-left of the drawn image before rotation.
    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn rotation_degrees(&self) -> f64 {
        self.rotation_degrees
    }

    pub fn source_size(&self) -> Size {
        self.source
    }

    pub fn viewport_size(&self) -> Size {
        self.viewport
    }

    /// Unrotated rectangle the image is drawn into.
    pub fn drawn_rect(&self) -> Rect {
        Rect::new(
            self.offset.x,
            self.offset.y,
            self.source.width * self.scale,
            self.source.height * self.scale,
        )
    }

    /// Map a source-space point into display space.
    pub fn to_display(&self, source: Point) -> Point {
        let scaled = Point::new(
            source.x * self.scale + self.offset.x,
            source.y * self.scale + self.offset.y,
        );
        scaled.rotated_about(self.viewport.center(), self.rotation_degrees)
    }

    /// Map a display-space point back into source space.
    pub fn to_source(&self, display: Point) -> Point {
        let unrotated = display.rotated_about(self.viewport.center(), -self.rotation_degrees);
        Point::new(
            (unrotated.x - self.offset.x) / self.scale,
            (unrotated.y - self.offset.y) / self.scale,
        )
    }

    /// Axis-aligned source rectangle covering all four corners of a display
    /// rectangle, clamped to the image bounds.
    pub fn display_rect_to_source(&self, display: &Rect) -> Rect {
        let corners = display.corners().map(|c| self.to_source(c));
        Rect::bounding(&corners).clamped_to(self.source)
    }

    /// The four image corners in display space (NW, NE, SW, SE of the source).
    pub fn image_corners(&self) -> [Point; 4] {
        Rect::new(0.0, 0.0, self.source.width, self.source.height)
            .corners()
            .map(|c| self.to_display(c))
    }

    /// Whether a display point lands on the drawn image.
    pub fn hits_image(&self, display: Point) -> bool {
        let p = self.to_source(display);
        p.x >= 0.0 && p.y >= 0.0 && p.x <= self.source.width && p.y <= self.source.height
    }
}

/// `min(viewport_w / source_w, viewport_h / source_h)`.
pub fn contain_scale(source: Size, viewport: Size) -> f64 {
    (viewport.width / source.width).min(viewport.height / source.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn view(width: f64, height: f64) -> ViewState {
        ViewState::new(width, height)
    }

    #[test]
    fn test_contain_scale_wide_image() {
        let t = RenderTransform::new(2000, 1000, &view(1000.0, 600.0)).unwrap();
        assert_abs_diff_eq!(t.contain_scale(), 0.5, epsilon = 1e-9);
        let drawn = t.drawn_rect();
        assert_abs_diff_eq!(drawn.width, 1000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(drawn.height, 500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(t.offset().x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(t.offset().y, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_contain_scale_tall_image() {
        let t = RenderTransform::new(500, 1000, &view(1000.0, 600.0)).unwrap();
        assert_abs_diff_eq!(t.contain_scale(), 0.6, epsilon = 1e-9);
        assert_abs_diff_eq!(t.offset().x, 350.0, epsilon = 1e-9);
        assert_abs_diff_eq!(t.offset().y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zoom_scales_about_centre() {
        let mut v = view(1000.0, 600.0);
        v.zoom = 2.0;
        let t = RenderTransform::new(2000, 1000, &v).unwrap();
        assert_abs_diff_eq!(t.effective_scale(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(t.offset().x, -500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(t.offset().y, -200.0, epsilon = 1e-9);

        // Image centre stays at the viewport centre
        let c = t.to_display(Point::new(1000.0, 500.0));
        assert_abs_diff_eq!(c.x, 500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.y, 300.0, epsilon = 1e-9);
    }

    #[test]
    fn test_pan_shifts_offset() {
        let v = view(1000.0, 600.0).pan_by(40.0, -10.0);
        let t = RenderTransform::new(2000, 1000, &v).unwrap();
        assert_abs_diff_eq!(t.offset().x, 40.0, epsilon = 1e-9);
        assert_abs_diff_eq!(t.offset().y, 40.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rotation_about_viewport_centre() {
        let v = view(1000.0, 600.0).rotate_by(90.0);
        let t = RenderTransform::new(2000, 1000, &v).unwrap();

        // Image centre is the rotation pivot
        let c = t.to_display(Point::new(1000.0, 500.0));
        assert_abs_diff_eq!(c.x, 500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.y, 300.0, epsilon = 1e-9);

        // Source top-left (unrotated display (0, 50)) swings clockwise
        let p = t.to_display(Point::new(0.0, 0.0));
        assert_abs_diff_eq!(p.x, 750.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, -200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_full_display_rect_maps_to_whole_image() {
        let t = RenderTransform::new(2000, 1000, &view(1000.0, 600.0)).unwrap();
        let src = t.display_rect_to_source(&Rect::new(0.0, 50.0, 1000.0, 500.0));
        assert_abs_diff_eq!(src.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(src.y, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(src.width, 2000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(src.height, 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_display_rect_clamped_to_source() {
        let t = RenderTransform::new(2000, 1000, &view(1000.0, 600.0)).unwrap();
        // Includes the letterbox bands above and below the image
        let src = t.display_rect_to_source(&Rect::new(0.0, 0.0, 1000.0, 600.0));
        assert_abs_diff_eq!(src.y, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(src.height, 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rotated_rect_bounding_box() {
        let v = view(1000.0, 600.0).rotate_by(45.0);
        let t = RenderTransform::new(2000, 1000, &v).unwrap();
        let src = t.display_rect_to_source(&Rect::new(450.0, 250.0, 100.0, 100.0));
        // A 100x100 display square at 45 degrees covers a ~141 wide diamond,
        // i.e. ~283 source pixels at scale 0.5
        assert_abs_diff_eq!(src.width, 200.0 * 2f64.sqrt(), epsilon = 1e-6);
        assert_abs_diff_eq!(src.height, 200.0 * 2f64.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn test_hits_image() {
        let t = RenderTransform::new(2000, 1000, &view(1000.0, 600.0)).unwrap();
        assert!(t.hits_image(Point::new(500.0, 300.0)));
        assert!(!t.hits_image(Point::new(500.0, 20.0)));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(RenderTransform::new(0, 100, &view(1000.0, 600.0)).is_none());
        assert!(RenderTransform::new(100, 100, &view(0.0, 600.0)).is_none());
    }

    #[test]
    fn test_transform_is_pure() {
        let v = view(1000.0, 600.0).rotate_by(17.0).pan_by(3.0, 4.0);
        let a = RenderTransform::new(640, 480, &v).unwrap();
        let b = RenderTransform::new(640, 480, &v).unwrap();
        assert_eq!(a, b);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
