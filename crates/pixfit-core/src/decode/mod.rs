//! Image decoding for pixfit.
//!
//! This module provides functionality for:
//! - Decoding user files (JPEG, PNG, WebP, GIF, BMP) into RGBA rasters
//! - EXIF orientation correction so natural dimensions match what the user sees
//! - Exact-dimension resampling for the resize and downscale steps
//!
//! # Architecture
//!
//! Decoding is designed to be driven from the WASM bindings in a browser tab.
//! All operations are synchronous and single-threaded within WASM.
//!
//! # Examples
//!
//! ```ignore
//! use pixfit_core::decode::{decode_image, resize, FilterType};
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! let half = resize(&image, image.width / 2, image.height / 2, FilterType::Bilinear).unwrap();
//! ```

mod load;
mod resize;
mod types;

pub use load::{decode_image, get_orientation};
pub use resize::resize;
pub use types::{DecodeError, DecodedImage, FilterType, Orientation};
