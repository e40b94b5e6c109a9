use crate::error::{Result, ScanError};
use image::RgbaImage;

/// Pixel layout of a [`Raster`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// One luminance byte per pixel
    Luma,
    /// Three bytes per pixel, R G B
    Rgb,
    /// Four bytes per pixel, R G B A
    Rgba,
}

impl PixelFormat {
    /// Bytes per pixel
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Luma => 1,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

/// Tightly packed, row-major pixel buffer
///
/// Frames coming from a [`crate::FrameSource`] and rectified crops handed to a
/// [`crate::FastDecoder`] both use this type. The length of the buffer is
/// checked against the dimensions on construction, so every accessor can
/// index without bounds surprises.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Raster {
    /// Wrap a pixel buffer, validating its length against the dimensions
    pub fn new(width: usize, height: usize, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        let channels = format.channels();
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(channels))
            .unwrap_or(usize::MAX);
        if width == 0 || height == 0 || data.len() != expected {
            return Err(ScanError::InvalidFrame {
                width,
                height,
                channels,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// Create a raster with every pixel set to `value` in all channels
    ///
    /// Alpha is forced to opaque for RGBA rasters. Zero dimensions are
    /// accepted; see [`Raster::check_dimensions`].
    pub fn filled(width: usize, height: usize, format: PixelFormat, value: u8) -> Self {
        let mut data = vec![value; width * height * format.channels()];
        if format == PixelFormat::Rgba {
            data.chunks_exact_mut(4).for_each(|px| px[3] = 255);
        }
        Self {
            width,
            height,
            format,
            data,
        }
    }

    /// Take ownership of an `image` RGBA buffer
    ///
    /// An empty image gives an empty raster; see [`Raster::check_dimensions`].
    pub fn from_rgba_image(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width: width as usize,
            height: height as usize,
            format: PixelFormat::Rgba,
            data: img.into_raw(),
        }
    }

    /// Copy into an `image` RGBA buffer, expanding Luma and Rgb pixels
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.width as u32, self.height as u32);
        for (dst, src) in out
            .as_mut()
            .chunks_exact_mut(4)
            .zip(self.data.chunks_exact(self.format.channels()))
        {
            match self.format {
                PixelFormat::Luma => dst.copy_from_slice(&[src[0], src[0], src[0], 255]),
                PixelFormat::Rgb => dst.copy_from_slice(&[src[0], src[1], src[2], 255]),
                PixelFormat::Rgba => dst.copy_from_slice(src),
            }
        }
        out
    }

    /// Reject rasters with no pixels
    ///
    /// [`Raster::new`] never builds one, but [`Raster::filled`] and
    /// [`Raster::from_rgba_image`] do, and the pipeline turns them into
    /// [`ScanError::InvalidFrame`] before any stage runs.
    pub fn check_dimensions(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ScanError::InvalidFrame {
                width: self.width,
                height: self.height,
                channels: self.format.channels(),
                expected: 0,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel layout
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw pixel bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw pixel bytes
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Channel bytes of the pixel at (x, y)
    ///
    /// Panics if (x, y) lies outside the raster.
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let c = self.format.channels();
        let idx = (y * self.width + x) * c;
        &self.data[idx..idx + c]
    }

    /// Overwrite the pixel at (x, y); out-of-range writes are ignored
    pub fn put_pixel(&mut self, x: usize, y: usize, value: &[u8]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let c = self.format.channels();
        let idx = (y * self.width + x) * c;
        self.data[idx..idx + c].copy_from_slice(&value[..c]);
    }
}
