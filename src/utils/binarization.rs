//! Frame binarization: grayscale, 5x5 Gaussian smoothing and an inverted
//! adaptive mean threshold, so dark code modules become foreground.

use crate::config::ScannerConfig;
use crate::models::{BinaryMask, Raster};
use crate::utils::grayscale::to_grayscale;
use rayon::prelude::*;

/// Binomial approximation of a 5-tap Gaussian, sums to 16
const KERNEL: [u32; 5] = [1, 4, 6, 4, 1];

/// Binarize a frame using the scanner's threshold settings
///
/// Foreground (1) marks pixels darker than their neighbourhood mean by at
/// least `adaptive_offset`. Never fails: a flat frame yields an empty mask.
pub fn binarize(raster: &Raster, config: &ScannerConfig) -> BinaryMask {
    let gray = to_grayscale(raster);
    let blurred = gaussian_blur_5x5(&gray, raster.width(), raster.height());
    adaptive_threshold_inv(
        &blurred,
        raster.width(),
        raster.height(),
        config.adaptive_block_size,
        config.adaptive_offset,
    )
}

/// Reflect an index into `[0, n)` without repeating the edge sample (reflect-101)
#[inline]
fn reflect101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let last = n as isize - 1;
    let mut i = i;
    while i < 0 || i > last {
        if i < 0 {
            i = -i;
        }
        if i > last {
            i = 2 * last - i;
        }
    }
    i as usize
}

/// Separable 5x5 Gaussian blur of a grayscale buffer
pub fn gaussian_blur_5x5(gray: &[u8], width: usize, height: usize) -> Vec<u8> {
    if width == 0 || height == 0 {
        return Vec::new();
    }

    // Horizontal pass, values up to 255 * 16
    let mut horizontal = vec![0u32; width * height];
    horizontal
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let src = &gray[y * width..(y + 1) * width];
            for (x, dst) in row.iter_mut().enumerate() {
                let mut acc = 0u32;
                for (k, &w) in KERNEL.iter().enumerate() {
                    let sx = reflect101(x as isize + k as isize - 2, width);
                    acc += w * src[sx] as u32;
                }
                *dst = acc;
            }
        });

    // Vertical pass, normalise by 16 * 16 with rounding
    let mut out = vec![0u8; width * height];
    out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        for (x, dst) in row.iter_mut().enumerate() {
            let mut acc = 0u32;
            for (k, &w) in KERNEL.iter().enumerate() {
                let sy = reflect101(y as isize + k as isize - 2, height);
                acc += w * horizontal[sy * width + x];
            }
            *dst = ((acc + 128) >> 8).min(255) as u8;
        }
    });

    out
}

/// Summed-area table with a zero guard row and column: `(width + 1) x (height + 1)`
fn integral_image(gray: &[u8], width: usize, height: usize) -> Vec<u64> {
    let stride = width + 1;
    let mut integral = vec![0u64; stride * (height + 1)];
    for y in 0..height {
        let mut row_sum = 0u64;
        for x in 0..width {
            row_sum += gray[y * width + x] as u64;
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }
    integral
}

/// Inverted adaptive mean threshold
///
/// A pixel is foreground when `value <= mean(block x block window) - offset`.
/// The window is clipped at the image border. `block_size` is forced odd
/// and at least 3.
pub fn adaptive_threshold_inv(
    gray: &[u8],
    width: usize,
    height: usize,
    block_size: usize,
    offset: i32,
) -> BinaryMask {
    let mut mask = BinaryMask::new(width, height);
    if width == 0 || height == 0 {
        return mask;
    }

    let radius = (block_size.max(3) | 1) / 2;
    let integral = integral_image(gray, width, height);
    let stride = width + 1;

    mask.as_bytes_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let y0 = y.saturating_sub(radius);
            let y1 = (y + radius + 1).min(height);
            for (x, dst) in row.iter_mut().enumerate() {
                let x0 = x.saturating_sub(radius);
                let x1 = (x + radius + 1).min(width);
                let sum = integral[y1 * stride + x1] + integral[y0 * stride + x0]
                    - integral[y0 * stride + x1]
                    - integral[y1 * stride + x0];
                let count = ((x1 - x0) * (y1 - y0)) as i64;
                let value = gray[y * width + x] as i64;
                // value <= sum / count - offset, kept in integers
                *dst = u8::from((value + offset as i64) * count <= sum as i64);
            }
        });

    mask
}
