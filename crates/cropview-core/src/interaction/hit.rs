//! Pointer hit-testing against the crop region.

use crate::geometry::Point;
use crate::region::{CropRegion, Handle};

/// What a pointer-down would grab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Handle(Handle),
    Interior,
    /// Outside the region, or no region at all.
    Canvas,
}

/// Handles first, then interior, then empty canvas.
///
/// A handle is hit when the pointer lies within `tolerance` of its corner on
/// both axes. If several qualify (a very small region) the closest wins.
pub fn hit_test(region: Option<&CropRegion>, p: Point, tolerance: f64) -> HitTarget {
    let Some(region) = region else {
        return HitTarget::Canvas;
    };
    let rect = region.rect();

    let closest = Handle::ALL
        .iter()
        .map(|&h| (h, h.corner_of(&rect)))
        .filter(|(_, c)| (p.x - c.x).abs() <= tolerance && (p.y - c.y).abs() <= tolerance)
        .min_by(|a, b| p.distance(a.1).total_cmp(&p.distance(b.1)));

    match closest {
        Some((handle, _)) => HitTarget::Handle(handle),
        None if region.contains(p) => HitTarget::Interior,
        None => HitTarget::Canvas,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(x: f64, y: f64, w: f64, h: f64) -> CropRegion {
        CropRegion {
            x,
            y,
            width: w,
            height: h,
            aspect_lock: None,
        }
    }

    #[test]
    fn test_handles_before_interior() {
        let r = region(100.0, 100.0, 200.0, 100.0);
        assert_eq!(hit_test(Some(&r), Point::new(105.0, 103.0), 12.0), HitTarget::Handle(Handle::Nw));
        assert_eq!(hit_test(Some(&r), Point::new(310.0, 190.0), 12.0), HitTarget::Handle(Handle::Se));
        assert_eq!(hit_test(Some(&r), Point::new(200.0, 150.0), 12.0), HitTarget::Interior);
        assert_eq!(hit_test(Some(&r), Point::new(50.0, 50.0), 12.0), HitTarget::Canvas);
    }

    #[test]
    fn test_tolerance_extends_outside_region() {
        let r = region(100.0, 100.0, 200.0, 100.0);
        assert_eq!(hit_test(Some(&r), Point::new(289.0, 89.0), 12.0), HitTarget::Handle(Handle::Ne));
        assert_eq!(hit_test(Some(&r), Point::new(287.0, 87.0), 12.0), HitTarget::Canvas);
    }

    #[test]
    fn test_closest_handle_wins_on_tiny_region() {
        let r = region(100.0, 100.0, 20.0, 20.0);
        // Both NW and NE are within tolerance; NW is nearer
        assert_eq!(hit_test(Some(&r), Point::new(108.0, 106.0), 12.0), HitTarget::Handle(Handle::Nw));
        assert_eq!(hit_test(Some(&r), Point::new(118.0, 103.0), 12.0), HitTarget::Handle(Handle::Ne));
        assert_eq!(hit_test(Some(&r), Point::new(102.0, 117.0), 12.0), HitTarget::Handle(Handle::Sw));
    }

    #[test]
    fn test_no_region_is_canvas() {
        assert_eq!(hit_test(None, Point::new(0.0, 0.0), 12.0), HitTarget::Canvas);
    }
}
