//! Errors surfaced to the user by the session and batch layer.

use thiserror::Error;

use crate::decode::DecodeError;
use crate::search::SearchError;

/// Batch-level and per-image failures.
///
/// `InvalidTarget`, `InvalidQuality`, `InvalidDimensions` and
/// `TooManyPixels` are raised before any image is touched and abort the
/// whole batch; every other variant concerns a single file.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Enter the target file size in KB (got {0:?})")]
    InvalidTarget(String),

    #[error("Quality must be between 10 and 100 (got {0:?})")]
    InvalidQuality(String),

    #[error("Width and height must both be positive (got {width:?} x {height:?})")]
    InvalidDimensions {
        width: Option<u32>,
        height: Option<u32>,
    },

    #[error("{width} x {height} is too large; width times height must not exceed {max_pixels} pixels")]
    TooManyPixels {
        width: u32,
        height: u32,
        max_pixels: u64,
    },

    #[error("{name} is not an image ({mime_type})")]
    UnsupportedFile { name: String, mime_type: String },

    #[error("{name} is too large ({size_bytes} bytes, limit {limit_bytes}); the browser may fail to process it")]
    OversizedFile {
        name: String,
        size_bytes: u64,
        limit_bytes: u64,
    },

    #[error("Could not decode {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: DecodeError,
    },

    #[error("Could not encode {name}: {source}")]
    EncodeUnavailable {
        name: String,
        #[source]
        source: SearchError,
    },

    #[error("Could not compress {name} to the requested size; try smaller dimensions instead ({source})")]
    ToleranceUnmet {
        name: String,
        #[source]
        source: SearchError,
    },

    #[error("No image at index {0}")]
    NoSuchImage(usize),
}

impl ProcessError {
    /// Wrap a search failure for the named file.
    pub(crate) fn from_search(name: &str, source: SearchError) -> Self {
        let name = name.to_string();
        match source {
            SearchError::ToleranceUnmet { .. } => ProcessError::ToleranceUnmet { name, source },
            SearchError::InvalidTarget(kb) => ProcessError::InvalidTarget(kb.to_string()),
            SearchError::InvalidQuality(q) => ProcessError::InvalidQuality(format!("{}", q * 100.0)),
            SearchError::TooManyPixels {
                width,
                height,
                max_pixels,
            } => ProcessError::TooManyPixels {
                width,
                height,
                max_pixels,
            },
            other => ProcessError::EncodeUnavailable {
                name,
                source: other,
            },
        }
    }

    /// True for skips the user should not be told about.
    pub fn is_silent(&self) -> bool {
        matches!(self, ProcessError::UnsupportedFile { .. })
    }

    /// True for errors that stop a batch before it starts.
    pub fn aborts_batch(&self) -> bool {
        matches!(
            self,
            ProcessError::InvalidTarget(_)
                | ProcessError::InvalidQuality(_)
                | ProcessError::InvalidDimensions { .. }
                | ProcessError::TooManyPixels { .. }
        )
    }
}
