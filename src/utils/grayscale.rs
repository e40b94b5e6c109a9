/// Convert rasters to 8-bit luminance
/// Y = 0.299*R + 0.587*G + 0.114*B
/// Uses fast integer arithmetic: Y = (76*R + 150*G + 29*B) >> 8
///
/// Rows are converted in parallel with rayon.
use crate::models::{PixelFormat, Raster};
use rayon::prelude::*;

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8;
    lum.min(255) as u8
}

/// Convert any supported raster to a row-major luminance buffer
pub fn to_grayscale(raster: &Raster) -> Vec<u8> {
    let width = raster.width();
    let channels = raster.format().channels();
    let src = raster.data();
    let mut gray = vec![0u8; width * raster.height()];
    if gray.is_empty() {
        return gray;
    }

    gray.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let row_src = &src[y * width * channels..(y + 1) * width * channels];
        match raster.format() {
            PixelFormat::Luma => row.copy_from_slice(row_src),
            PixelFormat::Rgb | PixelFormat::Rgba => {
                for (dst, px) in row.iter_mut().zip(row_src.chunks_exact(channels)) {
                    *dst = luma(px[0], px[1], px[2]);
                }
            }
        }
    });

    gray
}

/// Convert packed RGBA bytes to grayscale (ignores alpha channel)
pub fn rgba_to_grayscale(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    if gray.is_empty() {
        return gray;
    }
    gray.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let row_start = y * width * 4;
        for (x, dst) in row.iter_mut().enumerate() {
            let idx = row_start + x * 4;
            *dst = luma(rgba[idx], rgba[idx + 1], rgba[idx + 2]);
        }
    });
    gray
}
