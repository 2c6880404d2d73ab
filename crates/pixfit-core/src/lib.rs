//! Pixfit Core - image resizing and size-targeted compression
//!
//! This crate holds everything the Pixfit page does to an image besides
//! showing it: decoding uploads, tracking the width/height form, resizing,
//! and encoding either at a fixed quality or as close as possible to a
//! target file size.
//!
//! All work is synchronous and single-threaded. The WASM bindings decide
//! when to yield between images.

pub mod decode;
pub mod dimensions;
pub mod encode;
pub mod error;
pub mod naming;
pub mod search;
pub mod session;
pub mod target;

#[cfg(test)]
mod test_helpers;

pub use decode::{DecodeError, DecodedImage, FilterType};
pub use dimensions::DimensionForm;
pub use encode::{CodecEncoder, EncodeError, OutputFormat, RasterEncoder};
pub use error::ProcessError;
pub use search::{encode_at_quality, encode_to_target, EncodeResult, SearchConfig, SearchError};
pub use session::{
    BatchItem, BatchPlan, FileInput, LoadReport, LoadedImage, OutputFile, Session, SessionConfig,
};
pub use target::TargetMode;
