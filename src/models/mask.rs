use image::GrayImage;

/// Binary mask produced by the binarizer
///
/// One byte per pixel: 1 = foreground (locally dark), 0 = background.
#[derive(Debug, Clone)]
pub struct BinaryMask {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BinaryMask {
    /// Create an all-background mask with given dimensions
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    /// Wrap row-major 0/1 bytes; any non-zero byte counts as foreground
    pub fn from_raw(width: usize, height: usize, mut data: Vec<u8>) -> Option<Self> {
        if data.len() != width * height {
            return None;
        }
        data.iter_mut().for_each(|v| *v = u8::from(*v != 0));
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// Get mask width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get mask height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Is (x, y) foreground; out-of-range coordinates are background
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.data[y * self.width + x] != 0
    }

    /// Set (x, y); out-of-range writes are ignored
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.data[y * self.width + x] = u8::from(value);
    }

    /// Fill the inclusive-exclusive rectangle `[x0, x1) x [y0, y1)`
    pub fn fill_rect(&mut self, x0: usize, y0: usize, x1: usize, y1: usize, value: bool) {
        for y in y0..y1.min(self.height) {
            for x in x0..x1.min(self.width) {
                self.data[y * self.width + x] = u8::from(value);
            }
        }
    }

    /// Number of foreground pixels
    pub fn count_foreground(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Raw 0/1 bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// 0/255 grayscale copy, the representation `imageproc` traces contours on
    pub fn to_luma_image(&self) -> GrayImage {
        let raw = self.data.iter().map(|&v| if v != 0 { 255 } else { 0 }).collect();
        GrayImage::from_raw(self.width as u32, self.height as u32, raw)
            .unwrap_or_else(|| GrayImage::new(self.width as u32, self.height as u32))
    }
}

impl Default for BinaryMask {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_mask() {
        let mut mask = BinaryMask::new(8, 8);
        assert_eq!(mask.width(), 8);
        assert_eq!(mask.height(), 8);

        mask.set(3, 4, true);
        assert!(mask.get(3, 4));
        assert!(!mask.get(3, 3));

        mask.fill_rect(0, 0, 2, 2, true);
        assert_eq!(mask.count_foreground(), 5);

        let luma = mask.to_luma_image();
        assert_eq!(luma.get_pixel(3, 4).0[0], 255);
        assert_eq!(luma.get_pixel(3, 3).0[0], 0);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut mask = BinaryMask::new(8, 8);
        mask.set(10, 10, true); // Should not panic
        assert!(!mask.get(10, 10));
    }

    #[test]
    fn test_from_raw_normalizes() {
        let mask = BinaryMask::from_raw(2, 1, vec![0, 255]).unwrap();
        assert_eq!(mask.as_bytes(), &[0, 1]);
        assert!(BinaryMask::from_raw(2, 2, vec![0; 3]).is_none());
    }
}
