//! Scanner tunables
//!
//! Every field has a fixed default; `from_env` lets a host override them
//! through `QR_*` variables without recompiling.

use crate::error::{Result, ScanError};
use std::time::Duration;

fn parse_env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn parse_env_i32(name: &str, default: i32) -> i32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<i32>().ok())
        .unwrap_or(default)
}

fn parse_env_u8(name: &str, default: u8) -> u8 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u8>().ok())
        .unwrap_or(default)
}

fn parse_env_f32(name: &str, default: f32) -> f32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

/// Fixed per-scanner settings for binarization, classification and pacing
#[derive(Debug, Clone, PartialEq)]
pub struct ScannerConfig {
    /// Adaptive threshold window (pixels, odd)
    pub adaptive_block_size: usize,
    /// Subtracted from the window mean before comparing
    pub adaptive_offset: i32,
    /// Polygon tolerance as a fraction of the contour's arc length
    pub polygon_epsilon_ratio: f32,
    /// Lowest accepted bounding-box width / height
    pub min_aspect: f32,
    /// Highest accepted bounding-box width / height
    pub max_aspect: f32,
    /// Pythagorean residual allowed, relative to the longest side squared
    pub right_angle_tolerance: f32,
    /// Leg length difference allowed, relative to the shorter leg
    pub isosceles_tolerance: f32,
    /// Fill value for rectified pixels that fall outside the source frame
    pub background: u8,
    /// How long the source stays paused after a successful decode
    pub cooldown: Duration,
    /// Suggested delay between ticks while running
    pub frame_interval: Duration,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            adaptive_block_size: 11,
            adaptive_offset: 2,
            polygon_epsilon_ratio: 0.04,
            min_aspect: 0.5,
            max_aspect: 1.5,
            right_angle_tolerance: 0.1,
            isosceles_tolerance: 0.2,
            background: 0,
            cooldown: Duration::from_millis(1000),
            frame_interval: Duration::from_millis(33),
        }
    }
}

impl ScannerConfig {
    /// Defaults overridden by `QR_*` environment variables
    ///
    /// Unparseable values fall back to the default silently; call
    /// [`ScannerConfig::validate`] on the result.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            adaptive_block_size: parse_env_usize("QR_ADAPTIVE_BLOCK_SIZE", d.adaptive_block_size),
            adaptive_offset: parse_env_i32("QR_ADAPTIVE_OFFSET", d.adaptive_offset),
            polygon_epsilon_ratio: parse_env_f32("QR_POLYGON_EPSILON", d.polygon_epsilon_ratio),
            min_aspect: parse_env_f32("QR_MIN_ASPECT", d.min_aspect),
            max_aspect: parse_env_f32("QR_MAX_ASPECT", d.max_aspect),
            right_angle_tolerance: parse_env_f32(
                "QR_RIGHT_ANGLE_TOLERANCE",
                d.right_angle_tolerance,
            ),
            isosceles_tolerance: parse_env_f32("QR_ISOSCELES_TOLERANCE", d.isosceles_tolerance),
            background: parse_env_u8("QR_BACKGROUND", d.background),
            cooldown: Duration::from_millis(parse_env_u64(
                "QR_COOLDOWN_MS",
                d.cooldown.as_millis() as u64,
            )),
            frame_interval: Duration::from_millis(parse_env_u64(
                "QR_FRAME_INTERVAL_MS",
                d.frame_interval.as_millis() as u64,
            )),
        }
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.adaptive_block_size < 3 || self.adaptive_block_size % 2 == 0 {
            return Err(ScanError::InvalidConfig(format!(
                "adaptive_block_size must be odd and >= 3, got {}",
                self.adaptive_block_size
            )));
        }
        if !(self.polygon_epsilon_ratio > 0.0 && self.polygon_epsilon_ratio < 1.0) {
            return Err(ScanError::InvalidConfig(format!(
                "polygon_epsilon_ratio must be in (0, 1), got {}",
                self.polygon_epsilon_ratio
            )));
        }
        if !(self.min_aspect > 0.0 && self.min_aspect <= self.max_aspect) {
            return Err(ScanError::InvalidConfig(format!(
                "aspect range [{}, {}] is empty",
                self.min_aspect, self.max_aspect
            )));
        }
        for (name, value) in [
            ("right_angle_tolerance", self.right_angle_tolerance),
            ("isosceles_tolerance", self.isosceles_tolerance),
        ] {
            if !(value > 0.0) {
                return Err(ScanError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ScannerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.adaptive_block_size, 11);
        assert_eq!(config.cooldown, Duration::from_secs(1));
    }

    #[test]
    fn test_rejects_even_block() {
        let config = ScannerConfig {
            adaptive_block_size: 10,
            ..ScannerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ScanError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_inverted_aspect_range() {
        let config = ScannerConfig {
            min_aspect: 2.0,
            max_aspect: 1.0,
            ..ScannerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_tolerance() {
        let config = ScannerConfig {
            isosceles_tolerance: 0.0,
            ..ScannerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_parse_falls_back() {
        assert_eq!(parse_env_usize("QR_TEST_UNSET_VARIABLE", 7), 7);
        assert_eq!(parse_env_f32("QR_TEST_UNSET_VARIABLE", 0.5), 0.5);
    }
}
