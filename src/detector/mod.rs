//! QR code localisation
//!
//! - Contour forest extraction from the binary mask
//! - Finder pattern classification (square, nested twice)
//! - Right isosceles triple matching and fourth-corner completion
//! - Perspective rectification of the located quadrilateral

/// Border tracing and nesting links
pub mod contour;
/// Finder pattern candidates from contour shape and nesting
pub mod finder;
/// Perspective rectification of a located code
pub mod transform;
/// Finder triple selection and corner ordering
pub mod triple;

use crate::config::ScannerConfig;
use crate::models::{CornerSet, Raster};
use crate::utils::binarization::binarize;
use contour::extract_contours;
use finder::classify_finder_patterns;
use log::debug;
use triple::match_triple;

/// Result of running binarization through triple matching on one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Localization {
    /// Canonically ordered corners, if a triple was accepted
    pub corners: Option<CornerSet>,
    /// Number of traced borders
    pub contours: usize,
    /// Number of finder pattern candidates
    pub candidates: usize,
}

/// Find the four corners of a code in a frame
///
/// A frame without pixels locates nothing.
pub fn locate(raster: &Raster, config: &ScannerConfig) -> Localization {
    if raster.check_dimensions().is_err() {
        debug!("locate: empty {}x{} frame", raster.width(), raster.height());
        return Localization::default();
    }
    let mask = binarize(raster, config);
    let forest = extract_contours(&mask);
    let candidates = classify_finder_patterns(&forest, config);
    Localization {
        corners: match_triple(&candidates, config),
        contours: forest.len(),
        candidates: candidates.len(),
    }
}
