//! Raster encoding using the `image` crate's codecs.
//!
//! JPEG is written with `JpegEncoder::new_with_quality`; PNG and WebP are
//! written losslessly and ignore the quality argument.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder};
use std::io::Cursor;
use thiserror::Error;

use super::OutputFormat;
use crate::decode::DecodedImage;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The codec failed internally
    #[error("{format:?} encoding failed: {message}")]
    EncodingFailed {
        format: OutputFormat,
        message: String,
    },

    /// The codec finished but produced no bytes
    #[error("{0:?} encoder produced no output")]
    EmptyOutput(OutputFormat),
}

/// Something that turns a raster into encoded bytes at a given quality.
///
/// The size search only talks to this trait, so tests can drive it with a
/// deterministic fake and count calls.
pub trait RasterEncoder {
    /// Encode `image` as `format` at `quality` (a fraction in `0.0..=1.0`).
    fn encode(
        &self,
        image: &DecodedImage,
        format: OutputFormat,
        quality: f64,
    ) -> Result<Vec<u8>, EncodeError>;
}

/// The production encoder backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodecEncoder;

impl RasterEncoder for CodecEncoder {
    fn encode(
        &self,
        image: &DecodedImage,
        format: OutputFormat,
        quality: f64,
    ) -> Result<Vec<u8>, EncodeError> {
        encode_raster(image, format, quality)
    }
}

/// Map a quality fraction to the JPEG encoder's 1-100 scale.
///
/// Non-finite input is treated as the highest quality.
pub fn jpeg_quality(quality: f64) -> u8 {
    if !quality.is_finite() {
        return 100;
    }
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encode an RGBA raster to the requested format.
///
/// # Errors
///
/// Returns an error if the raster is empty, its buffer does not match its
/// dimensions, or the codec fails or produces no bytes.
pub fn encode_raster(
    image: &DecodedImage,
    format: OutputFormat,
    quality: f64,
) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = (image.width, image.height);
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = width as usize * height as usize * DecodedImage::CHANNELS;
    if image.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: image.pixels.len(),
        });
    }

    let mut buffer = Cursor::new(Vec::new());
    let failed = |e: image::ImageError| EncodeError::EncodingFailed {
        format,
        message: e.to_string(),
    };

    match format {
        OutputFormat::Jpeg => {
            let rgb = strip_alpha(&image.pixels);
            JpegEncoder::new_with_quality(&mut buffer, jpeg_quality(quality))
                .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
                .map_err(failed)?;
        }
        OutputFormat::Png => {
            PngEncoder::new(&mut buffer)
                .write_image(&image.pixels, width, height, ExtendedColorType::Rgba8)
                .map_err(failed)?;
        }
        OutputFormat::WebP => {
            WebPEncoder::new_lossless(&mut buffer)
                .write_image(&image.pixels, width, height, ExtendedColorType::Rgba8)
                .map_err(failed)?;
        }
    }

    let bytes = buffer.into_inner();
    if bytes.is_empty() {
        return Err(EncodeError::EmptyOutput(format));
    }
    Ok(bytes)
}

fn strip_alpha(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
    }
    rgb
}
