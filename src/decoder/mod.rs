//! Fast decoder adapters
//!
//! The pipeline only needs the [`crate::FastDecoder`] trait; this module
//! ships the adapter backed by the `rqrr` crate.

/// `rqrr`-backed decoder
#[cfg(feature = "rqrr")]
pub mod rqrr_decoder;

#[cfg(feature = "rqrr")]
pub use rqrr_decoder::RqrrDecoder;
