//! Shared fixtures for unit tests across modules.

use std::cell::{Cell, RefCell};

use crate::decode::DecodedImage;
use crate::encode::{EncodeError, OutputFormat, RasterEncoder};

/// One recorded call to [`FakeEncoder::encode`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeCall {
    pub width: u32,
    pub height: u32,
    pub quality: f64,
}

/// Encoder with a linear size model: `overhead + pixels * bytes_per_pixel * quality`.
///
/// Records every call so tests can assert on the bisection path.
pub struct FakeEncoder {
    pub bytes_per_pixel: f64,
    pub overhead: usize,
    /// Fail every call once this many calls have succeeded.
    pub fail_after: Option<usize>,
    calls: RefCell<Vec<EncodeCall>>,
    failures: Cell<usize>,
}

impl FakeEncoder {
    pub fn new(bytes_per_pixel: f64, overhead: usize) -> Self {
        Self {
            bytes_per_pixel,
            overhead,
            fail_after: None,
            calls: RefCell::new(Vec::new()),
            failures: Cell::new(0),
        }
    }

    pub fn failing_after(mut self, successes: usize) -> Self {
        self.fail_after = Some(successes);
        self
    }

    pub fn calls(&self) -> Vec<EncodeCall> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.get()
    }
}

impl RasterEncoder for FakeEncoder {
    fn encode(
        &self,
        image: &DecodedImage,
        format: OutputFormat,
        quality: f64,
    ) -> Result<Vec<u8>, EncodeError> {
        if let Some(limit) = self.fail_after {
            if self.calls.borrow().len() >= limit {
                self.failures.set(self.failures.get() + 1);
                return Err(EncodeError::EmptyOutput(format));
            }
        }

        self.calls.borrow_mut().push(EncodeCall {
            width: image.width,
            height: image.height,
            quality,
        });

        let pixels = image.width as f64 * image.height as f64;
        let size = (self.overhead as f64 + pixels * self.bytes_per_pixel * quality) as usize;
        Ok(vec![0u8; size])
    }
}

/// A flat gray RGBA raster.
pub fn gray_image(width: u32, height: u32) -> DecodedImage {
    DecodedImage::new(
        width,
        height,
        vec![128u8; width as usize * height as usize * DecodedImage::CHANNELS],
    )
}

/// GIF file bytes for a flat opaque image of the given size.
pub fn gif_file(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba([90, 160, 30, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut out, image::ImageFormat::Gif)
        .expect("encode test GIF");
    out.into_inner()
}

/// PNG file bytes for a flat raster of the given size.
pub fn png_file(width: u32, height: u32) -> Vec<u8> {
    crate::encode::encode_raster(&gray_image(width, height), OutputFormat::Png, 1.0)
        .expect("encode test PNG")
}
