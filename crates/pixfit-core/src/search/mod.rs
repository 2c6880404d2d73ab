//! Size-targeted encoding.
//!
//! Lossy encoders map quality to output size monotonically but not
//! linearly, and differently per codec, so the target is found by bisecting
//! quality against the encoder itself. When even the lowest quality is too
//! large at the requested dimensions, both dimensions shrink by
//! [`SearchConfig::downscale_factor`] and the full search runs again.
//!
//! # Termination
//!
//! - Each quality search stops on a tolerance hit, crossed bounds, or
//!   [`SearchConfig::max_attempts`] misses.
//! - Downscaling stops at the first step where either dimension would drop
//!   to [`SearchConfig::min_dimension`] or below.
//! - An encoder failure ends refinement for the image; the last candidate
//!   seen is still judged against the target.
//!
//! The returned result is the *last* candidate produced, not the closest
//! one seen.

mod bisect;
mod config;

use thiserror::Error;

use crate::decode::{resize, DecodeError, DecodedImage};
use crate::encode::{EncodeError, OutputFormat, RasterEncoder};

pub use config::{SearchConfig, DEFAULT_MAX_PIXELS, MAX_QUALITY_FRACTION, MIN_QUALITY_FRACTION};

/// An encoded image ready to hand to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeResult {
    pub bytes: Vec<u8>,
    pub size_kb: f64,
    pub quality: f64,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    /// Total encoder calls spent producing this result.
    pub encoder_calls: u32,
}

/// Errors from the size-targeted and fixed-quality encoders.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Target size must be a positive number of kilobytes, got {0}")]
    InvalidTarget(f64),

    #[error("Quality must be between {min} and {max}, got {0}", min = MIN_QUALITY_FRACTION, max = MAX_QUALITY_FRACTION)]
    InvalidQuality(f64),

    #[error("{width}x{height} exceeds the {max_pixels} pixel limit")]
    TooManyPixels {
        width: u32,
        height: u32,
        max_pixels: u64,
    },

    #[error("Could not render the image at the requested size: {0}")]
    Render(#[from] DecodeError),

    #[error("Encoder produced no output at {width}x{height}: {source}")]
    EncodeUnavailable {
        width: u32,
        height: u32,
        #[source]
        source: EncodeError,
    },

    #[error("Could not compress to {target_kb} KB; last result was {:.2} KB at {}x{}", .best.size_kb, .best.width, .best.height)]
    ToleranceUnmet {
        target_kb: f64,
        best: Box<EncodeResult>,
    },
}

pub(crate) fn size_kb(bytes: &[u8]) -> f64 {
    bytes.len() as f64 / 1024.0
}

fn check_pixel_limit(width: u32, height: u32, config: &SearchConfig) -> Result<(), SearchError> {
    if config.fits_pixel_limit(width, height) {
        Ok(())
    } else {
        Err(SearchError::TooManyPixels {
            width,
            height,
            max_pixels: config.max_pixels,
        })
    }
}

/// Encode `source` at `width` x `height`, searching quality (and shrinking
/// the dimensions if needed) until the output is close to `target_kb`.
///
/// A result is accepted when it lies inside the tolerance band or at or
/// below the target.
///
/// # Errors
///
/// - `InvalidTarget` if `target_kb` is not a positive finite number
/// - `TooManyPixels` if the dimensions exceed [`SearchConfig::max_pixels`]
/// - `Render` if the dimensions are zero
/// - `EncodeUnavailable` if the encoder never produced a candidate
/// - `ToleranceUnmet` carrying the last candidate when every attempt and
///   downscale step is exhausted
pub fn encode_to_target<E: RasterEncoder + ?Sized>(
    encoder: &E,
    source: &DecodedImage,
    width: u32,
    height: u32,
    format: OutputFormat,
    target_kb: f64,
    config: &SearchConfig,
) -> Result<EncodeResult, SearchError> {
    if !target_kb.is_finite() || target_kb <= 0.0 {
        return Err(SearchError::InvalidTarget(target_kb));
    }
    check_pixel_limit(width, height, config)?;

    let (mut width, mut height) = (width, height);
    let mut encoder_calls = 0u32;

    let best = loop {
        let raster = resize(source, width, height, config.filter)?;
        let pass = bisect::quality_search(encoder, &raster, format, target_kb, config);
        encoder_calls += pass.encoder_calls;
        log::debug!(
            "pass at {}x{}: {} calls, in tolerance: {}",
            width,
            height,
            pass.encoder_calls,
            pass.hit_tolerance
        );

        let Some(last) = pass.last else {
            let cause = pass.aborted.unwrap_or(EncodeError::EmptyOutput(format));
            return Err(SearchError::EncodeUnavailable {
                width,
                height,
                source: cause,
            });
        };

        let result = EncodeResult {
            bytes: last.bytes,
            size_kb: last.size_kb,
            quality: last.quality,
            width,
            height,
            format,
            encoder_calls,
        };

        if pass.aborted.is_some() || result.size_kb <= target_kb {
            break result;
        }

        match config.next_downscale(width, height) {
            Some((w, h)) => {
                log::debug!(
                    "{:.2} KB at {}x{} still above {:.2} KB target; downscaling to {}x{}",
                    result.size_kb,
                    width,
                    height,
                    target_kb,
                    w,
                    h
                );
                width = w;
                height = h;
            }
            None => break result,
        }
    };

    if best.size_kb <= target_kb || config.within_tolerance(best.size_kb, target_kb) {
        log::info!(
            "encoded {}x{} at q={:.3}: {:.2} KB (target {:.2} KB, {} encoder calls)",
            best.width,
            best.height,
            best.quality,
            best.size_kb,
            target_kb,
            best.encoder_calls
        );
        Ok(best)
    } else {
        log::warn!(
            "could not reach {:.2} KB; last result {:.2} KB at {}x{}",
            target_kb,
            best.size_kb,
            best.width,
            best.height
        );
        Err(SearchError::ToleranceUnmet {
            target_kb,
            best: Box::new(best),
        })
    }
}

/// Encode `source` once at `width` x `height` and the given quality fraction.
///
/// No search and no downscaling.
///
/// # Errors
///
/// Returns `InvalidQuality` before any work if `quality` is outside
/// `[MIN_QUALITY_FRACTION, MAX_QUALITY_FRACTION]`, and `TooManyPixels` if
/// the dimensions exceed [`SearchConfig::max_pixels`].
pub fn encode_at_quality<E: RasterEncoder + ?Sized>(
    encoder: &E,
    source: &DecodedImage,
    width: u32,
    height: u32,
    format: OutputFormat,
    quality: f64,
    config: &SearchConfig,
) -> Result<EncodeResult, SearchError> {
    if !(MIN_QUALITY_FRACTION..=MAX_QUALITY_FRACTION).contains(&quality) {
        return Err(SearchError::InvalidQuality(quality));
    }
    check_pixel_limit(width, height, config)?;

    let raster = resize(source, width, height, config.filter)?;
    let bytes = encoder
        .encode(&raster, format, quality)
        .map_err(|source| SearchError::EncodeUnavailable {
            width,
            height,
            source,
        })?;

    let result = EncodeResult {
        size_kb: size_kb(&bytes),
        bytes,
        quality,
        width,
        height,
        format,
        encoder_calls: 1,
    };
    log::info!(
        "encoded {}x{} at q={:.2}: {:.2} KB",
        width,
        height,
        quality,
        result.size_kb
    );
    Ok(result)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::decode::FilterType;
    use crate::test_helpers::{gray_image, FakeEncoder};
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Either the result satisfies the target, or the search ran out
        /// of room at the dimension floor or attempt ceiling.
        #[test]
        fn prop_success_or_exhaustion(
            (width, height) in (101u32..=600, 101u32..=600),
            bytes_per_pixel in 0.05f64..4.0,
            overhead_kb in 0usize..64,
            target_kb in 1.0f64..200.0,
        ) {
            let config = SearchConfig { filter: FilterType::Nearest, ..SearchConfig::default() };
            let encoder = FakeEncoder::new(bytes_per_pixel, overhead_kb * 1024);
            let source = gray_image(width, height);

            match encode_to_target(&encoder, &source, width, height, OutputFormat::Jpeg, target_kb, &config) {
                Ok(result) => {
                    prop_assert!(result.size_kb <= target_kb || config.within_tolerance(result.size_kb, target_kb));
                }
                Err(SearchError::ToleranceUnmet { best, .. }) => {
                    prop_assert!(config.next_downscale(best.width, best.height).is_none());
                }
                Err(e) => prop_assert!(false, "unexpected error: {}", e),
            }

            for call in encoder.calls() {
                prop_assert!(call.width >= width.min(101) && call.height >= height.min(101));
                prop_assert!(call.quality >= config.min_quality && call.quality <= config.max_quality);
            }
        }
    }
}
