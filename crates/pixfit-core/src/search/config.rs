//! Tuning knobs for the size-targeted search.

use serde::{Deserialize, Serialize};

use crate::decode::FilterType;

/// Lowest quality fraction accepted by the explicit quality mode.
pub const MIN_QUALITY_FRACTION: f64 = 0.10;
/// Highest quality fraction accepted by the explicit quality mode.
pub const MAX_QUALITY_FRACTION: f64 = 1.00;
/// Default pixel ceiling for a rendered raster: a 16384 x 16384 canvas.
pub const DEFAULT_MAX_PIXELS: u64 = 16_384 * 16_384;

/// Parameters of the quality bisection and the downscale fallback.
///
/// Deserializes from a partial object; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Initial lower bound of the quality search.
    pub min_quality: f64,
    /// Initial upper bound of the quality search.
    pub max_quality: f64,
    /// Amount a bound moves past the midpoint after each miss.
    pub quality_step: f64,
    /// Half-width of the acceptance band around the target, in KB.
    pub tolerance_kb: f64,
    /// Encoder attempts per quality search that may miss the band.
    pub max_attempts: u32,
    /// Scale applied to both dimensions per downscale step.
    pub downscale_factor: f64,
    /// Downscaling stops before either dimension would reach this value.
    pub min_dimension: u32,
    /// Resampling filter used to render the raster at each size.
    pub filter: FilterType,
    /// Largest `width * height` that may be rendered.
    pub max_pixels: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_quality: 0.05,
            max_quality: 1.0,
            quality_step: 0.01,
            tolerance_kb: 5.0,
            max_attempts: 20,
            downscale_factor: 0.9,
            min_dimension: 100,
            filter: FilterType::Bilinear,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}

impl SearchConfig {
    /// True if `size_kb` lies strictly inside the tolerance band around `target_kb`.
    pub fn within_tolerance(&self, size_kb: f64, target_kb: f64) -> bool {
        (size_kb - target_kb).abs() < self.tolerance_kb
    }

    /// True if a `width` x `height` raster stays within `max_pixels`.
    pub fn fits_pixel_limit(&self, width: u32, height: u32) -> bool {
        (width as u64)
            .checked_mul(height as u64)
            .is_some_and(|pixels| pixels <= self.max_pixels)
    }

    /// The dimensions of the next downscale step, or `None` once either
    /// dimension would drop to `min_dimension` or below.
    pub fn next_downscale(&self, width: u32, height: u32) -> Option<(u32, u32)> {
        let scale = |d: u32| (d as f64 * self.downscale_factor).floor() as u32;
        let (w, h) = (scale(width), scale(height));
        if w <= self.min_dimension || h <= self.min_dimension {
            return None;
        }
        Some((w, h))
    }
}
