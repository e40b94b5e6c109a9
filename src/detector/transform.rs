/// Perspective rectification: warp the quadrilateral spanned by a corner
/// set onto an axis-aligned raster
use crate::error::{Result, ScanError};
use crate::models::{CornerSet, PixelFormat, Point, Raster};
use crate::utils::geometry::PerspectiveTransform;
use log::debug;
use rayon::prelude::*;

/// Minimum sine of the angle between two corner-to-corner vectors
const MIN_CORNER_SINE: f32 = 1e-3;

/// Output size for a corner set: the longer of each pair of opposite sides,
/// rounded to whole pixels
pub fn rectified_size(corners: &CornerSet) -> (usize, usize) {
    let width = corners
        .bottom_right
        .distance(&corners.bottom_left)
        .max(corners.top_right.distance(&corners.top_left));
    let height = corners
        .top_right
        .distance(&corners.bottom_right)
        .max(corners.top_left.distance(&corners.bottom_left));
    (width.round() as usize, height.round() as usize)
}

/// Corners that cannot span a plane: any two closer than a pixel, or any
/// three (nearly) on one line
pub fn is_degenerate(corners: &CornerSet) -> bool {
    let pts = corners.as_array();

    for i in 0..4 {
        for j in (i + 1)..4 {
            if pts[i].distance(&pts[j]) < 1.0 {
                return true;
            }
        }
    }

    for skip in 0..4 {
        let tri: Vec<Point> = (0..4).filter(|&i| i != skip).map(|i| pts[i]).collect();
        let u = tri[1] - tri[0];
        let v = tri[2] - tri[0];
        let sine = u.cross(&v).abs() / (u.norm() * v.norm());
        if !sine.is_finite() || sine < MIN_CORNER_SINE {
            return true;
        }
    }
    false
}

/// Warp the region inside `corners` onto a `W x H` raster
///
/// Corners map to `(0,0)`, `(W,0)`, `(W,H)` and `(0,H)`. Each output pixel
/// is pulled through the inverse homography and bilinearly interpolated;
/// samples outside the source are filled with `background` (alpha stays
/// opaque). The output keeps the source pixel format.
///
/// Degenerate corners give [`ScanError::DegenerateCorners`] before any
/// solve is attempted; a singular solve gives
/// [`ScanError::SingularTransform`].
pub fn rectify(raster: &Raster, corners: &CornerSet, background: u8) -> Result<Raster> {
    if is_degenerate(corners) {
        return Err(ScanError::DegenerateCorners);
    }
    let (out_w, out_h) = rectified_size(corners);
    if out_w == 0 || out_h == 0 {
        return Err(ScanError::DegenerateCorners);
    }

    let (w, h) = (out_w as f32, out_h as f32);
    let dst = [
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ];
    let forward = PerspectiveTransform::from_points(&corners.as_array(), &dst)
        .ok_or(ScanError::SingularTransform)?;
    let inverse = forward.inverse().ok_or(ScanError::SingularTransform)?;

    debug!(
        "rectifying {}x{} frame to {}x{}",
        raster.width(),
        raster.height(),
        out_w,
        out_h
    );

    let channels = raster.format().channels();
    let mut fill = vec![background; channels];
    if raster.format() == PixelFormat::Rgba {
        fill[3] = 255;
    }

    let mut out = vec![0u8; out_w * out_h * channels];
    out.par_chunks_mut(out_w * channels)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.chunks_exact_mut(channels).enumerate() {
                match inverse.map_xy(x as f64, y as f64) {
                    Some((sx, sy)) if inside(raster, sx, sy) => {
                        sample_bilinear(raster, sx, sy, px);
                    }
                    _ => px.copy_from_slice(&fill),
                }
            }
        });

    Raster::new(out_w, out_h, raster.format(), out)
}

#[inline]
fn inside(raster: &Raster, x: f64, y: f64) -> bool {
    x >= -0.5 && y >= -0.5 && x <= raster.width() as f64 - 0.5 && y <= raster.height() as f64 - 0.5
}

/// Bilinear sample at (x, y); neighbour indices are clamped to the raster
#[inline]
fn sample_bilinear(raster: &Raster, x: f64, y: f64, out: &mut [u8]) {
    let max_x = raster.width() as isize - 1;
    let max_y = raster.height() as isize - 1;

    let x0f = x.floor();
    let y0f = y.floor();
    let fx = x - x0f;
    let fy = y - y0f;

    let x0 = (x0f as isize).clamp(0, max_x) as usize;
    let y0 = (y0f as isize).clamp(0, max_y) as usize;
    let x1 = (x0f as isize + 1).clamp(0, max_x) as usize;
    let y1 = (y0f as isize + 1).clamp(0, max_y) as usize;

    let p00 = raster.pixel(x0, y0);
    let p10 = raster.pixel(x1, y0);
    let p01 = raster.pixel(x0, y1);
    let p11 = raster.pixel(x1, y1);

    for (c, dst) in out.iter_mut().enumerate() {
        let top = p00[c] as f64 * (1.0 - fx) + p10[c] as f64 * fx;
        let bottom = p01[c] as f64 * (1.0 - fx) + p11[c] as f64 * fx;
        let value = top * (1.0 - fy) + bottom * fy;
        *dst = value.round().clamp(0.0, 255.0) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f32, y0: f32, x1: f32, y1: f32) -> CornerSet {
        CornerSet::new(
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        )
    }

    /// Luma gradient so every pixel is distinguishable
    fn gradient(width: usize, height: usize) -> Raster {
        let data = (0..height)
            .flat_map(|y| (0..width).map(move |x| ((x * 3 + y * 7) % 256) as u8))
            .collect();
        Raster::new(width, height, PixelFormat::Luma, data).unwrap()
    }

    #[test]
    fn test_axis_aligned_square_size() {
        let raster = Raster::filled(400, 400, PixelFormat::Rgba, 200);
        let corners = square(100.0, 100.0, 300.0, 300.0);
        assert_eq!(rectified_size(&corners), (200, 200));

        let out = rectify(&raster, &corners, 0).unwrap();
        assert_eq!((out.width(), out.height()), (200, 200));
        assert_eq!(out.format(), PixelFormat::Rgba);
        assert_eq!(out.pixel(100, 100), &[200, 200, 200, 255]);
    }

    #[test]
    fn test_axis_aligned_crop_matches_source() {
        let raster = gradient(120, 90);
        let out = rectify(&raster, &square(20.0, 10.0, 80.0, 70.0), 0).unwrap();
        assert_eq!((out.width(), out.height()), (60, 60));
        for (x, y) in [(0, 0), (10, 25), (59, 59), (33, 4)] {
            assert_eq!(out.pixel(x, y), raster.pixel(x + 20, y + 10), "at ({x}, {y})");
        }
    }

    #[test]
    fn test_full_frame_is_identity() {
        let raster = gradient(64, 48);
        let corners = square(0.0, 0.0, 64.0, 48.0);
        let out = rectify(&raster, &corners, 0).unwrap();
        assert_eq!((out.width(), out.height()), (64, 48));
        assert_eq!(out.data(), raster.data());
    }

    #[test]
    fn test_outside_samples_use_background() {
        let raster = Raster::filled(50, 50, PixelFormat::Luma, 255);
        // Quad hanging off the left edge of the frame
        let corners = square(-40.0, 10.0, 20.0, 40.0);
        let out = rectify(&raster, &corners, 7).unwrap();
        assert_eq!(out.pixel(0, 0), &[7]);
        assert_eq!(out.pixel(out.width() - 1, 0), &[255]);
    }

    #[test]
    fn test_rotated_quad_keeps_size() {
        let raster = Raster::filled(300, 300, PixelFormat::Rgb, 90);
        let corners = CornerSet::new(
            Point::new(150.0, 50.0),
            Point::new(250.0, 150.0),
            Point::new(150.0, 250.0),
            Point::new(50.0, 150.0),
        );
        let out = rectify(&raster, &corners, 0).unwrap();
        assert_eq!((out.width(), out.height()), (141, 141));
        assert_eq!(out.pixel(70, 70), &[90, 90, 90]);
    }

    #[test]
    fn test_diamond_from_unordered_rectifies_square() {
        let raster = Raster::filled(200, 200, PixelFormat::Luma, 90);
        let corners = CornerSet::from_unordered([
            Point::new(87.5, 56.0),
            Point::new(57.5, 86.0),
            Point::new(117.5, 86.0),
            Point::new(87.5, 116.0),
        ]);
        assert_eq!(rectified_size(&corners), (42, 42));
        let out = rectify(&raster, &corners, 0).unwrap();
        assert_eq!((out.width(), out.height()), (42, 42));
        assert_eq!(out.pixel(21, 21), &[90]);
    }

    #[test]
    fn test_degenerate_corners() {
        let raster = Raster::filled(10, 10, PixelFormat::Luma, 0);
        let p = Point::new(5.0, 5.0);
        let collapsed = CornerSet::new(p, p, p, p);
        assert!(is_degenerate(&collapsed));
        assert_eq!(rectify(&raster, &collapsed, 0), Err(ScanError::DegenerateCorners));

        let colinear = CornerSet::new(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(30.0, 0.0),
        );
        assert!(is_degenerate(&colinear));

        assert!(!is_degenerate(&square(0.0, 0.0, 5.0, 5.0)));
    }
}
