/// Errors produced while scanning a frame.
///
/// "No code in frame" is not an error; see [`crate::FrameOutcome::NotFound`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    /// Raster dimensions and buffer length disagree
    #[error("invalid frame: {width}x{height} with {channels} channel(s) needs {expected} bytes, got {actual}")]
    #[allow(missing_docs)]
    InvalidFrame {
        width: usize,
        height: usize,
        channels: usize,
        expected: usize,
        actual: usize,
    },
    /// Corners too close together or colinear to span a plane
    #[error("corner geometry is degenerate")]
    DegenerateCorners,
    /// Homography solve or inversion failed
    #[error("perspective transform is singular")]
    SingularTransform,
    /// A [`crate::ScannerConfig`] field is out of range
    #[error("invalid scanner config: {0}")]
    InvalidConfig(String),
    /// The frame source could not deliver a frame
    #[error("frame acquisition failed: {0}")]
    Acquisition(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ScanError>;
