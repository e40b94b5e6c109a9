//! qr_rectify - locate rotated or skewed QR codes in video frames
//!
//! When a direct decode of the raw frame fails, the frame is binarized,
//! its contour forest is searched for the three nested finder squares, the
//! fourth corner is completed and the code is warped onto an axis-aligned
//! raster for a second decode attempt.
//!
//! ```no_run
//! use qr_rectify::{ScannerConfig, locate, tools::SyntheticFrame, Point};
//!
//! let frame = SyntheticFrame::new(400, 400)
//!     .finder_triple(Point::new(200.0, 200.0), 200.0, 3.0, 0.3)
//!     .build();
//! let found = locate(&frame, &ScannerConfig::default());
//! println!("{:?}", found.corners);
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Scanner tunables
pub mod config;
/// Fast decoder adapters
pub mod decoder;
/// Localisation stages (contours, finder patterns, triples, rectification)
pub mod detector;
/// Error type
pub mod error;
/// Frame source, decoder and presenter traits
pub mod interfaces;
/// Core data structures (Raster, BinaryMask, Point, CornerSet)
pub mod models;
/// Per-tick scan pipeline
pub mod pipeline;
/// Image loading, frame sources and synthetic frames
pub mod tools;
/// Utility functions (grayscale, binarization, geometry)
pub mod utils;

pub use config::ScannerConfig;
pub use detector::contour::{BorderKind, ContourNode, extract_contours};
pub use detector::finder::{FinderPatternCandidate, classify_finder_patterns};
pub use detector::transform::rectify;
pub use detector::triple::match_triple;
pub use detector::{Localization, locate};
pub use error::{Result, ScanError};
pub use interfaces::{
    DecodeMode, DecodeResult, FOUND_OUTLINE, FastDecoder, FrameSource, LOCATED_OUTLINE, Presenter,
};
pub use models::{BinaryMask, CornerSet, PixelFormat, Point, Raster};
pub use pipeline::{FrameOutcome, FrameReport, PauseState, ScanTelemetry, Scanner, TickStatus};
pub use utils::binarization::binarize;

#[cfg(feature = "rqrr")]
pub use decoder::RqrrDecoder;
