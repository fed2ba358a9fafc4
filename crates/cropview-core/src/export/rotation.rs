//! Rotation of extracted crops onto an expanded canvas.
//!
//! Positive angles turn the content clockwise, matching the display
//! rotation. Quarter turns are exact pixel permutations; any other angle
//! is resampled by inverse mapping each output pixel back into the source:
//!
//! ```text
//! src = R(-θ) · (dst - dst_centre) + src_centre
//! ```
//!
//! Output pixels that map outside the source are black.

use crate::error::{CropError, Result};
use crate::raster::{FilterType, RasterImage};

/// Angles within this many degrees of a multiple of 90 are treated as exact.
const QUARTER_TURN_EPSILON: f64 = 1e-3;

/// Canvas size that holds `width` x `height` rotated by `degrees`.
pub fn rotated_bounds(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    match quarter_turns(degrees) {
        Some(0) | Some(2) => return (width, height),
        Some(_) => return (height, width),
        None => {}
    }

    let (sin, cos) = degrees.to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    let (w, h) = (width as f64, height as f64);
    let out_w = (w * cos + h * sin).round() as u32;
    let out_h = (w * sin + h * cos).round() as u32;
    (out_w.max(1), out_h.max(1))
}

/// Smaller size to scale an image to before an arbitrary-angle rotation
/// whose bounds only need to cover `target_width` x `target_height`.
///
/// `None` for quarter turns (a plain permutation) and when the rotated
/// bounds are already no larger than the target.
pub fn prerotation_size(
    width: u32,
    height: u32,
    degrees: f64,
    target_width: u32,
    target_height: u32,
) -> Option<(u32, u32)> {
    if quarter_turns(degrees).is_some() || width == 0 || height == 0 {
        return None;
    }
    let (rotated_w, rotated_h) = rotated_bounds(width, height, degrees);
    let scale = (target_width as f64 / rotated_w as f64)
        .max(target_height as f64 / rotated_h as f64);
    if !scale.is_finite() || scale >= 1.0 {
        return None;
    }
    let scaled = |side: u32| ((side as f64 * scale).ceil() as u32).clamp(1, side);
    Some((scaled(width), scaled(height)))
}

/// Rotate `image` by `degrees` about its centre.
///
/// `Nearest` and `Bilinear` both sample bilinearly for arbitrary angles;
/// `Lanczos3` uses a 6x6 windowed-sinc kernel away from the edges.
pub fn rotate(image: &RasterImage, degrees: f64, filter: FilterType) -> Result<RasterImage> {
    if let Some(turns) = quarter_turns(degrees) {
        return rotate_quarter_turns(image, turns);
    }
    if image.is_empty() {
        return Err(CropError::RenderUnavailable(
            "cannot rotate an empty image".to_string(),
        ));
    }

    let (out_w, out_h) = rotated_bounds(image.width, image.height, degrees);
    let (sin, cos) = (-degrees).to_radians().sin_cos();
    let src_cx = image.width as f64 / 2.0;
    let src_cy = image.height as f64 / 2.0;
    let dst_cx = out_w as f64 / 2.0;
    let dst_cy = out_h as f64 / 2.0;

    let mut pixels = Vec::with_capacity(out_w as usize * out_h as usize * 3);
    for dst_y in 0..out_h {
        for dst_x in 0..out_w {
            // Sample at pixel centres
            let dx = dst_x as f64 + 0.5 - dst_cx;
            let dy = dst_y as f64 + 0.5 - dst_cy;
            let sx = dx * cos - dy * sin + src_cx - 0.5;
            let sy = dx * sin + dy * cos + src_cy - 0.5;

            let pixel = match filter {
                FilterType::Lanczos3 => sample_lanczos3(image, sx, sy),
                FilterType::Nearest | FilterType::Bilinear => sample_bilinear(image, sx, sy),
            };
            pixels.extend_from_slice(&pixel);
        }
    }

    Ok(RasterImage::new(out_w, out_h, pixels))
}

/// Number of clockwise quarter turns if `degrees` is (nearly) a multiple of 90.
fn quarter_turns(degrees: f64) -> Option<u8> {
    let turns = degrees / 90.0;
    let rounded = turns.round();
    if (turns - rounded).abs() * 90.0 > QUARTER_TURN_EPSILON {
        return None;
    }
    Some(rounded.rem_euclid(4.0) as u8)
}

fn rotate_quarter_turns(image: &RasterImage, turns: u8) -> Result<RasterImage> {
    if turns == 0 {
        return Ok(image.clone());
    }
    let rgb = image.to_rgb_image().ok_or_else(|| {
        CropError::RenderUnavailable(format!(
            "source buffer does not match {}x{}",
            image.width, image.height
        ))
    })?;
    let rotated = match turns {
        1 => image::imageops::rotate90(&rgb),
        2 => image::imageops::rotate180(&rgb),
        _ => image::imageops::rotate270(&rgb),
    };
    Ok(RasterImage::from_rgb_image(rotated))
}

#[inline]
fn pixel_f64(image: &RasterImage, x: usize, y: usize) -> [f64; 3] {
    let idx = (y * image.width as usize + x) * 3;
    [
        image.pixels[idx] as f64,
        image.pixels[idx + 1] as f64,
        image.pixels[idx + 2] as f64,
    ]
}

fn sample_bilinear(image: &RasterImage, x: f64, y: f64) -> [u8; 3] {
    let max_x = image.width as f64 - 1.0;
    let max_y = image.height as f64 - 1.0;
    if x < -0.5 || y < -0.5 || x > max_x + 0.5 || y > max_y + 0.5 {
        return [0, 0, 0];
    }
    // Half a pixel of overhang at the border reads the edge pixel
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(image.width as usize - 1);
    let y1 = (y0 + 1).min(image.height as usize - 1);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = pixel_f64(image, x0, y0);
    let p10 = pixel_f64(image, x1, y0);
    let p01 = pixel_f64(image, x0, y1);
    let p11 = pixel_f64(image, x1, y1);

    std::array::from_fn(|i| {
        let top = p00[i] + (p10[i] - p00[i]) * fx;
        let bottom = p01[i] + (p11[i] - p01[i]) * fx;
        (top + (bottom - top) * fy).clamp(0.0, 255.0).round() as u8
    })
}

fn sample_lanczos3(image: &RasterImage, x: f64, y: f64) -> [u8; 3] {
    let (w, h) = (image.width as i64, image.height as i64);
    // The kernel needs two pixels left/up and three right/down
    if x < 2.0 || y < 2.0 || x >= (w - 3) as f64 || y >= (h - 3) as f64 {
        return sample_bilinear(image, x, y);
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let mut sum = [0.0f64; 3];
    let mut weight_sum = 0.0;

    for ky in -2..=3 {
        let py = y0 + ky;
        let wy = lanczos3(y - py as f64);
        for kx in -2..=3 {
            let px = x0 + kx;
            let weight = lanczos3(x - px as f64) * wy;
            let p = pixel_f64(image, px as usize, py as usize);
            for (acc, v) in sum.iter_mut().zip(p) {
                *acc += v * weight;
            }
            weight_sum += weight;
        }
    }

    if weight_sum <= 0.0 {
        return [0, 0, 0];
    }
    sum.map(|v| (v / weight_sum).clamp(0.0, 255.0).round() as u8)
}

/// `sinc(x) * sinc(x / 3)` on `|x| < 3`.
fn lanczos3(x: f64) -> f64 {
    const A: f64 = 3.0;
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= A {
        return 0.0;
    }
    let pi_x = std::f64::consts::PI * x;
    A * pi_x.sin() * (pi_x / A).sin() / (pi_x * pi_x)
}
