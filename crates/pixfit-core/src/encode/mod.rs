//! Image encoding for pixfit.
//!
//! This module provides functionality for:
//! - Mapping a file's MIME type to an output format
//! - Encoding RGBA rasters to JPEG (quality-controlled), PNG or lossless WebP
//! - The [`RasterEncoder`] seam the size search is written against
//!
//! # Examples
//!
//! ```ignore
//! use pixfit_core::encode::{encode_raster, OutputFormat};
//!
//! let bytes = encode_raster(&image, OutputFormat::Jpeg, 0.8).unwrap();
//! println!("Encoded {} bytes", bytes.len());
//! ```

mod codec;
mod format;

pub use codec::{encode_raster, jpeg_quality, CodecEncoder, EncodeError, RasterEncoder};
pub use format::{is_image_mime, OutputFormat};
