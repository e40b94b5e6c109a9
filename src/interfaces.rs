//! Collaborator seams: where frames come from, who decodes them and who
//! shows the outcome

use crate::error::{Result, ScanError};
use crate::models::{CornerSet, Raster};
use image::Rgba;

/// Outline colour for a decoded code
pub const FOUND_OUTLINE: Rgba<u8> = Rgba([0, 255, 0, 255]);

/// Outline colour for a code that was located but not decoded
pub const LOCATED_OUTLINE: Rgba<u8> = Rgba([255, 176, 0, 255]);

/// Produces one frame per tick
pub trait FrameSource {
    /// Grab the next frame
    fn next_frame(&mut self) -> Result<Raster>;

    /// Stop delivering frames (e.g. release the camera stream)
    fn pause(&mut self);

    /// Resume after [`FrameSource::pause`]
    fn resume(&mut self);
}

/// How hard a decoder should try with respect to polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    /// Dark modules on a light background only
    DontInvert,
    /// Also try the inverted image
    AttemptBoth,
}

/// A decoded payload, optionally with where the decoder found it
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeResult {
    /// Decoded text
    pub payload: String,
    /// Corners in the coordinates of the decoded raster, if known
    pub corners: Option<CornerSet>,
}

impl DecodeResult {
    /// A payload without location
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            corners: None,
        }
    }

    /// Attach decoder-reported corners
    pub fn with_corners(mut self, corners: CornerSet) -> Self {
        self.corners = Some(corners);
        self
    }
}

/// Direct decoder for raw rasters
pub trait FastDecoder {
    /// Try to decode a code in `raster`; `None` if nothing was read
    fn decode(&mut self, raster: &Raster, mode: DecodeMode) -> Option<DecodeResult>;
}

/// Renders scan outcomes
pub trait Presenter {
    /// Draw the outline of a located code
    fn show_detection_outline(&mut self, corners: &CornerSet, color: Rgba<u8>);

    /// Show a decoded payload
    fn show_result(&mut self, payload: &str);

    /// Nothing to show this tick
    fn show_idle_state(&mut self);

    /// A frame failed to process or could not be acquired
    fn show_error_state(&mut self, error: &ScanError);
}

impl<T: FastDecoder + ?Sized> FastDecoder for &mut T {
    fn decode(&mut self, raster: &Raster, mode: DecodeMode) -> Option<DecodeResult> {
        (**self).decode(raster, mode)
    }
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn next_frame(&mut self) -> Result<Raster> {
        (**self).next_frame()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn resume(&mut self) {
        (**self).resume()
    }
}
