//! Helpers shared by the CLI, benches and tests: image loading, an image
//! file frame source and synthetic frames.

use crate::error::{Result, ScanError};
use crate::interfaces::FrameSource;
use crate::models::{PixelFormat, Point, Raster};
use image::GenericImageView;
use log::debug;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn max_dim_from_env() -> Option<u32> {
    match env::var("QR_MAX_DIM") {
        Ok(value) => match value.trim().parse::<u32>() {
            Ok(0) => None,
            Ok(v) => Some(v),
            Err(_) => None,
        },
        Err(_) => None,
    }
}

/// Load an image file as an RGBA raster
///
/// Images larger than `QR_MAX_DIM` (if set) are downscaled first.
pub fn load_raster<P: AsRef<Path>>(path: P) -> std::result::Result<Raster, image::ImageError> {
    let img = image::open(path)?;
    let rgba = match max_dim_from_env() {
        Some(max_dim) if img.dimensions().0.max(img.dimensions().1) > max_dim => img
            .resize(max_dim, max_dim, image::imageops::FilterType::Triangle)
            .to_rgba8(),
        _ => img.to_rgba8(),
    };
    Ok(Raster::from_rgba_image(rgba))
}

/// Image paths under `root` (recursively), sorted, optionally truncated
pub fn collect_images<P: AsRef<Path>>(root: P, limit: Option<usize>) -> Vec<PathBuf> {
    let mut stack = vec![root.as_ref().to_path_buf()];
    let mut images = Vec::new();

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if let Some(ext) = path.extension() {
                let ext = ext.to_string_lossy().to_lowercase();
                if ext == "png" || ext == "jpg" || ext == "jpeg" || ext == "gif" || ext == "bmp" {
                    images.push(path);
                }
            }
        }
    }

    images.sort();
    if let Some(limit) = limit {
        images.truncate(limit);
    }
    images
}

/// Frame source that plays a list of image files in order
#[derive(Debug, Clone)]
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    cursor: usize,
    paused: bool,
}

impl ImageSequenceSource {
    /// Play `paths` once, in order
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            cursor: 0,
            paused: false,
        }
    }

    /// Every image under a directory, sorted
    pub fn from_dir<P: AsRef<Path>>(root: P) -> Self {
        Self::new(collect_images(root, None))
    }

    /// All frames have been handed out
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.paths.len()
    }

    /// Whether the source is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Result<Raster> {
        if self.paused {
            return Err(ScanError::Acquisition("source is paused".into()));
        }
        let path = self
            .paths
            .get(self.cursor)
            .ok_or_else(|| ScanError::Acquisition("no more frames".into()))?;
        self.cursor += 1;
        debug!("loading frame {}", path.display());
        load_raster(path).map_err(|e| ScanError::Acquisition(format!("{}: {e}", path.display())))
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }
}

/// Draws test frames: white canvas, dark finder patterns, optional rotation
#[derive(Debug, Clone)]
pub struct SyntheticFrame {
    width: usize,
    height: usize,
    gray: Vec<u8>,
}

impl SyntheticFrame {
    /// White canvas
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            gray: vec![255; width * height],
        }
    }

    /// Fill the half-open rectangle `[x0, x1) x [y0, y1)` with `value`
    pub fn fill_rect(mut self, x0: usize, y0: usize, x1: usize, y1: usize, value: u8) -> Self {
        for y in y0.min(self.height)..y1.min(self.height) {
            for x in x0.min(self.width)..x1.min(self.width) {
                self.gray[y * self.width + x] = value;
            }
        }
        self
    }

    /// Draw a 7x7-module finder pattern centred at `center`, rotated by
    /// `angle` radians
    pub fn finder(mut self, center: Point, module: f32, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        let reach = 3.5 * module * std::f32::consts::SQRT_2 + 1.0;
        let x0 = (center.x - reach).floor().max(0.0) as usize;
        let y0 = (center.y - reach).floor().max(0.0) as usize;
        let x1 = ((center.x + reach).ceil().max(0.0) as usize).min(self.width);
        let y1 = ((center.y + reach).ceil().max(0.0) as usize).min(self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - center.x;
                let dy = y as f32 + 0.5 - center.y;
                // Back into pattern coordinates
                let u = dx * cos + dy * sin;
                let v = -dx * sin + dy * cos;
                let d = u.abs().max(v.abs()) / module;
                if d < 1.5 || (2.5..3.5).contains(&d) {
                    self.gray[y * self.width + x] = 0;
                }
            }
        }
        self
    }

    /// Three finder patterns at the top-left, top-right and bottom-left of
    /// a square with side `spacing` centred at `center`, rotated by `angle`
    pub fn finder_triple(self, center: Point, spacing: f32, module: f32, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        let half = spacing / 2.0;
        let place = |u: f32, v: f32| Point::new(center.x + u * cos - v * sin, center.y + u * sin + v * cos);
        self.finder(place(-half, -half), module, angle)
            .finder(place(half, -half), module, angle)
            .finder(place(-half, half), module, angle)
    }

    /// Grayscale buffer
    pub fn luma(&self) -> &[u8] {
        &self.gray
    }

    /// Finish as an RGBA raster
    pub fn build(&self) -> Raster {
        let mut raster = Raster::filled(self.width, self.height, PixelFormat::Rgba, 255);
        for (px, &v) in raster.data_mut().chunks_exact_mut(4).zip(&self.gray) {
            px[..3].fill(v);
        }
        raster
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finder_geometry() {
        let frame = SyntheticFrame::new(40, 40).finder(Point::new(20.0, 20.0), 2.0, 0.0);
        let gray = frame.luma();
        let at = |x: usize, y: usize| gray[y * 40 + x];
        // Core, light ring, dark ring, outside
        assert_eq!(at(20, 20), 0);
        assert_eq!(at(24, 20), 255);
        assert_eq!(at(26, 20), 0);
        assert_eq!(at(28, 20), 255);
    }

    #[test]
    fn test_build_is_rgba() {
        let raster = SyntheticFrame::new(8, 6).fill_rect(0, 0, 2, 2, 10).build();
        assert_eq!(raster.format(), PixelFormat::Rgba);
        assert_eq!(raster.pixel(1, 1), &[10, 10, 10, 255]);
        assert_eq!(raster.pixel(5, 5), &[255, 255, 255, 255]);
    }

    #[test]
    fn test_sequence_source() {
        let mut source = ImageSequenceSource::new(Vec::new());
        assert!(source.is_exhausted());
        assert!(matches!(source.next_frame(), Err(ScanError::Acquisition(_))));

        let mut source = ImageSequenceSource::new(vec![PathBuf::from("/nonexistent/frame.png")]);
        source.pause();
        assert!(source.is_paused());
        assert!(source.next_frame().is_err());
        source.resume();
        assert!(matches!(source.next_frame(), Err(ScanError::Acquisition(_))));
        assert!(source.is_exhausted());
    }
}
