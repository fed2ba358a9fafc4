//! End-to-end sessions driven through the public controller API.

use std::sync::Arc;

use approx::assert_abs_diff_eq;
use cropview_core::{
    Command, CropError, CursorIcon, ExportQuality, InteractionController, InteractionMode,
    PixelRect, Point, RasterImage, Rect,
};

fn session(source_width: u32, source_height: u32) -> InteractionController {
    let mut pixels = Vec::with_capacity((source_width * source_height * 3) as usize);
    for y in 0..source_height {
        for x in 0..source_width {
            pixels.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, 128]);
        }
    }
    let mut c = InteractionController::default();
    c.resize_viewport(1000.0, 600.0);
    c.load_image(Arc::new(RasterImage::new(source_width, source_height, pixels)));
    c
}

#[test]
fn whole_drawn_image_maps_to_whole_source() {
    let mut c = session(2000, 1000);
    let t = c.render_transform().unwrap();
    assert_abs_diff_eq!(t.contain_scale(), 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(t.offset().x, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(t.offset().y, 50.0, epsilon = 1e-12);

    c.set_region(Rect::new(0.0, 50.0, 1000.0, 500.0));
    assert_eq!(c.source_rect(), Some(PixelRect::new(0, 0, 2000, 1000)));

    let plan = c.export_plan(ExportQuality::Preview).unwrap();
    assert_eq!((plan.output_width, plan.output_height), (300, 150));
}

#[test]
fn square_lock_derives_height_from_width() {
    let mut c = session(2000, 1000);
    c.set_region(Rect::new(100.0, 100.0, 200.0, 200.0));
    c.set_aspect_ratio("square").unwrap();

    // Grab the SE corner and drag right 100, up 100: free-form would be 300x100
    c.pointer_down(Point::new(300.0, 300.0));
    assert_eq!(c.mode(), InteractionMode::Resizing(cropview_core::Handle::Se));
    c.pointer_move(Point::new(400.0, 200.0));
    c.pointer_up();

    let r = c.region().unwrap();
    assert_eq!((r.width, r.height), (300.0, 300.0));
}

#[test]
fn click_on_empty_canvas_creates_centred_region() {
    let mut c = session(2000, 1000);
    c.apply(Command::Clear);
    assert!(c.region().is_none());

    c.pointer_down(Point::new(500.0, 300.0));
    let r = c.region().unwrap();
    assert_eq!((r.x, r.right()), (450.0, 550.0));
    assert_eq!((r.y, r.bottom()), (250.0, 350.0));
    assert_eq!(c.mode(), InteractionMode::Dragging);
}

#[test]
fn new_region_near_edge_is_clamped() {
    let mut c = session(2000, 1000);
    c.apply(Command::Clear);
    c.pointer_down(Point::new(990.0, 5.0));
    let r = c.region().unwrap();
    assert_eq!((r.x, r.y, r.width, r.height), (900.0, 0.0, 100.0, 100.0));
}

#[test]
fn zoom_reset_is_exact_after_zooming_in() {
    let mut c = session(200, 100);
    for _ in 0..5 {
        c.apply(Command::ZoomIn);
    }
    assert_ne!(c.zoom_percent(), 100);
    c.apply(Command::ZoomReset);
    c.apply(Command::ZoomReset);
    assert_eq!(c.view().zoom, 1.0);
    assert_eq!(c.zoom_percent(), 100);
}

#[test]
fn burst_of_moves_produces_one_frame() {
    let mut c = session(200, 100);
    let _ = c.recompute_display();

    c.pointer_down(Point::new(500.0, 300.0));
    for step in 0..50 {
        c.pointer_move(Point::new(500.0 + step as f64, 300.0 - step as f64 * 0.5));
    }
    c.apply(Command::RotateCw);

    let frame = c.recompute_display().unwrap();
    assert_eq!(frame.rotation_degrees, 90.0);
    assert!(c.recompute_display().is_none());
}

#[test]
fn leaving_canvas_mid_drag_is_clean() {
    let mut c = session(200, 100);
    c.pointer_down(Point::new(745.0, 445.0));
    c.pointer_move(Point::new(760.0, 470.0));
    c.pointer_leave();

    let state = c.interaction_state();
    assert_eq!(state.mode, InteractionMode::Idle);
    assert!(state.anchor.is_none() && state.active_handle.is_none());
    assert_eq!(c.cursor_at(Point::new(20.0, 20.0)), CursorIcon::Crosshair);
}

#[test]
fn export_fails_without_source_or_region() {
    let mut c = InteractionController::default();
    c.resize_viewport(1000.0, 600.0);
    assert!(matches!(c.render_preview(), Err(CropError::RenderUnavailable(_))));

    let mut c = session(200, 100);
    c.apply(Command::Clear);
    assert!(matches!(c.export_full(), Err(CropError::RenderUnavailable(_))));
}

#[test]
fn preview_of_whole_image_is_300_by_150() {
    let mut c = session(200, 100);
    c.set_region(Rect::new(0.0, 50.0, 1000.0, 500.0));
    let preview = c.render_preview().unwrap();
    assert_eq!((preview.width, preview.height), (300, 150));
    assert!(preview.is_consistent());
}

#[test]
fn full_export_reads_source_pixels() {
    let mut c = session(200, 100);
    // Source (40..60, 10..30) at a contain scale of 5
    c.set_region(Rect::new(200.0, 100.0, 100.0, 100.0));
    let out = c.export_full().unwrap();
    assert_eq!((out.width, out.height), (20, 20));
    assert_eq!(out.pixel(0, 0), Some([40, 10, 128]));
    assert_eq!(out.pixel(19, 19), Some([59, 29, 128]));
}

#[test]
fn rotated_export_covers_rotated_corners() {
    let mut c = session(200, 100);
    c.rotate_by(30.0);
    let unrotated = session(200, 100).source_rect().unwrap();
    let rotated = c.source_rect().unwrap();
    // The rotated region's corners spread over a wider source box
    assert!(rotated.width * rotated.height > unrotated.width * unrotated.height);

    let out = c.export_full().unwrap();
    assert!(out.is_consistent());
    assert!(out.width > rotated.width);
}

#[test]
fn pan_then_zoom_reset_recentres() {
    let mut c = session(200, 100);
    c.set_pan_modifier(true);
    c.pointer_down(Point::new(100.0, 100.0));
    c.pointer_move(Point::new(300.0, 200.0));
    c.pointer_up();
    c.set_pan_modifier(false);
    assert_eq!((c.view().pan_x, c.view().pan_y), (100.0, 50.0));

    c.apply(Command::ZoomReset);
    assert_eq!((c.view().pan_x, c.view().pan_y), (0.0, 0.0));
}
