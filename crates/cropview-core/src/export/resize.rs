//! Output sizing and scaling.

use crate::error::{CropError, Result};
use crate::raster::{FilterType, RasterImage};

/// Output size for a crop of `crop_width` x `crop_height`.
///
/// The longer side becomes `max_dimension`, the shorter side follows the
/// crop's aspect ratio but never drops below `min_dimension`. Returns `None`
/// for a degenerate crop.
pub fn preview_dimensions(
    crop_width: f64,
    crop_height: f64,
    max_dimension: u32,
    min_dimension: u32,
) -> Option<(u32, u32)> {
    let usable = crop_width.is_finite() && crop_height.is_finite();
    if !usable || crop_width <= 0.0 || crop_height <= 0.0 || max_dimension == 0 {
        return None;
    }

    let floor = min_dimension.min(max_dimension);
    let short_side = |long: f64, short: f64| {
        ((max_dimension as f64 * short / long).round() as u32).clamp(floor.max(1), max_dimension)
    };

    if crop_width >= crop_height {
        Some((max_dimension, short_side(crop_width, crop_height)))
    } else {
        Some((short_side(crop_height, crop_width), max_dimension))
    }
}

/// Scale `image` to exactly `width` x `height`.
pub fn resize_exact(
    image: &RasterImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<RasterImage> {
    if width == 0 || height == 0 {
        return Err(CropError::RenderUnavailable(format!(
            "cannot create a {width}x{height} output"
        )));
    }
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgb = image.to_rgb_image().ok_or_else(|| {
        CropError::RenderUnavailable(format!(
            "source buffer does not match {}x{}",
            image.width, image.height
        ))
    })?;
    let resized = image::imageops::resize(&rgb, width, height, filter.to_image_filter());
    Ok(RasterImage::from_rgb_image(resized))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landscape_fits_width() {
        assert_eq!(preview_dimensions(1000.0, 500.0, 300, 50), Some((300, 150)));
    }

    #[test]
    fn test_portrait_fits_height() {
        assert_eq!(preview_dimensions(300.0, 600.0, 300, 50), Some((150, 300)));
    }

    #[test]
    fn test_square() {
        assert_eq!(preview_dimensions(40.0, 40.0, 300, 50), Some((300, 300)));
    }

    #[test]
    fn test_short_side_floor() {
        // 300 * 20 / 1000 = 6, floored to 50
        assert_eq!(preview_dimensions(1000.0, 20.0, 300, 50), Some((300, 50)));
        assert_eq!(preview_dimensions(20.0, 1000.0, 300, 50), Some((50, 300)));
    }

    #[test]
    fn test_degenerate_crop() {
        assert_eq!(preview_dimensions(0.0, 10.0, 300, 50), None);
        assert_eq!(preview_dimensions(f64::NAN, 10.0, 300, 50), None);
    }

    #[test]
    fn test_resize_exact() {
        let img = RasterImage::new(20, 10, vec![120; 20 * 10 * 3]);
        let out = resize_exact(&img, 6, 3, FilterType::Bilinear).unwrap();
        assert_eq!((out.width, out.height), (6, 3));
        assert_eq!(out.pixel(2, 1), Some([120, 120, 120]));
    }

    #[test]
    fn test_resize_same_size_is_clone() {
        let img = RasterImage::new(4, 4, (0..48).collect());
        assert_eq!(resize_exact(&img, 4, 4, FilterType::Lanczos3).unwrap(), img);
    }

    #[test]
    fn test_resize_zero_fails() {
        let img = RasterImage::new(4, 4, vec![0; 48]);
        assert!(matches!(
            resize_exact(&img, 0, 4, FilterType::Bilinear),
            Err(CropError::RenderUnavailable(_))
        ));
    }
}
