//! Binary search over encoder quality at fixed dimensions.

use crate::decode::DecodedImage;
use crate::encode::{EncodeError, OutputFormat, RasterEncoder};

use super::{size_kb, SearchConfig};

/// A single encoded candidate.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub bytes: Vec<u8>,
    pub size_kb: f64,
    pub quality: f64,
}

/// What one quality search produced.
#[derive(Debug)]
pub(crate) struct Pass {
    /// The last candidate the search saw, not necessarily the closest.
    pub last: Option<Candidate>,
    pub encoder_calls: u32,
    pub hit_tolerance: bool,
    /// Set when the encoder failed and the search stopped early.
    pub aborted: Option<EncodeError>,
}

/// Bisect the quality range until a candidate lands inside the tolerance
/// band, the bounds cross, or `max_attempts` misses have been spent.
pub(crate) fn quality_search<E: RasterEncoder + ?Sized>(
    encoder: &E,
    raster: &DecodedImage,
    format: OutputFormat,
    target_kb: f64,
    config: &SearchConfig,
) -> Pass {
    let mut low = config.min_quality;
    let mut high = config.max_quality;
    let mut attempts = 0u32;
    let mut pass = Pass {
        last: None,
        encoder_calls: 0,
        hit_tolerance: false,
        aborted: None,
    };

    while low <= high && attempts < config.max_attempts {
        let mid = (low + high) / 2.0;
        pass.encoder_calls += 1;

        let bytes = match encoder.encode(raster, format, mid) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::debug!(
                    "encoder gave no output at {}x{} q={:.4}: {}",
                    raster.width,
                    raster.height,
                    mid,
                    e
                );
                pass.aborted = Some(e);
                break;
            }
        };

        let current_kb = size_kb(&bytes);
        log::debug!(
            "attempt {} at {}x{} q={:.4}: {:.2} KB (target {:.2} KB)",
            attempts + 1,
            raster.width,
            raster.height,
            mid,
            current_kb,
            target_kb
        );

        let candidate = Candidate {
            bytes,
            size_kb: current_kb,
            quality: mid,
        };

        if config.within_tolerance(current_kb, target_kb) {
            pass.last = Some(candidate);
            pass.hit_tolerance = true;
            break;
        } else if current_kb < target_kb {
            low = mid + config.quality_step;
        } else {
            high = mid - config.quality_step;
        }

        pass.last = Some(candidate);
        attempts += 1;
    }

    pass
}
