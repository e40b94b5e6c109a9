use crate::interfaces::{DecodeMode, DecodeResult, FastDecoder};
use crate::models::{CornerSet, Point, Raster};
use crate::utils::grayscale::to_grayscale;
use log::trace;
use rqrr::PreparedImage;

/// [`FastDecoder`] over `rqrr`'s grid detection and decoding
///
/// `AttemptBoth` retries on the inverted luminance when the normal pass
/// reads nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RqrrDecoder;

impl RqrrDecoder {
    /// Create a decoder
    pub fn new() -> Self {
        Self
    }
}

impl FastDecoder for RqrrDecoder {
    fn decode(&mut self, raster: &Raster, mode: DecodeMode) -> Option<DecodeResult> {
        let mut gray = to_grayscale(raster);
        let (width, height) = (raster.width(), raster.height());

        if let Some(result) = decode_gray(&gray, width, height) {
            return Some(result);
        }
        if mode == DecodeMode::DontInvert {
            return None;
        }

        gray.iter_mut().for_each(|v| *v = 255 - *v);
        decode_gray(&gray, width, height)
    }
}

fn decode_gray(gray: &[u8], width: usize, height: usize) -> Option<DecodeResult> {
    let mut prepared = PreparedImage::prepare_from_greyscale(width, height, |x, y| gray[y * width + x]);
    let grids = prepared.detect_grids();
    trace!("rqrr: {} grid(s) detected", grids.len());

    grids.into_iter().find_map(|grid| {
        let (_, payload) = grid.decode().ok()?;
        let bounds = grid.bounds.map(|p| Point::new(p.x as f32, p.y as f32));
        Some(DecodeResult::new(payload).with_corners(CornerSet::from_unordered(bounds)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PixelFormat;

    #[test]
    fn test_blank_frame_decodes_nothing() {
        let raster = Raster::filled(64, 64, PixelFormat::Rgba, 255);
        let mut decoder = RqrrDecoder::new();
        assert!(decoder.decode(&raster, DecodeMode::AttemptBoth).is_none());
        assert!(decoder.decode(&raster, DecodeMode::DontInvert).is_none());
    }
}
