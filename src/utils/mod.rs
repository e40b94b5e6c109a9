//! Utility functions for image processing
//!
//! - Grayscale conversion (RGB/RGBA to luminance)
//! - Binarization (Gaussian smoothing and adaptive thresholding)
//! - Geometry (perspective transforms, polygon simplification)

pub mod binarization;
pub mod geometry;
pub mod grayscale;
