//! The working set of loaded images and the resize form.
//!
//! A [`Session`] is created when the page starts, filled as the user picks
//! or drops files, and emptied by [`Session::reset`]. Processing goes
//! through [`Session::plan_batch`], which validates the form once and hands
//! back a [`BatchPlan`] that owns shared handles to the images; the plan
//! keeps working even if the session is reset while it runs.

mod batch;

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::decode::{decode_image, DecodeError, DecodedImage};
use crate::dimensions::DimensionForm;
use crate::encode::{is_image_mime, OutputFormat, RasterEncoder};
use crate::error::ProcessError;
use crate::search::SearchConfig;
use crate::target::TargetMode;

pub use batch::{BatchItem, BatchJob, BatchPlan, OutputFile};

/// Default upload guard: 1000 MiB, roughly where browsers start failing.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 1024 * 1024 * 1000;

/// Session-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Files larger than this are skipped with a warning; `None` disables the guard.
    pub max_file_bytes: Option<u64>,
    /// Initial state of the aspect-ratio lock.
    pub lock_aspect: bool,
    pub search: SearchConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: Some(DEFAULT_MAX_FILE_BYTES),
            lock_aspect: true,
            search: SearchConfig::default(),
        }
    }
}

/// A user file that decoded successfully.
#[derive(Debug)]
pub struct LoadedImage {
    name: String,
    mime_type: String,
    source_size: u64,
    format: OutputFormat,
    raster: DecodedImage,
    original_ratio: f64,
}

impl LoadedImage {
    /// Decode `bytes` into a loaded image. The caller keeps the bytes.
    pub fn decode(name: &str, mime_type: &str, bytes: &[u8]) -> Result<Self, ProcessError> {
        let decode_err = |source| ProcessError::Decode {
            name: name.to_string(),
            source,
        };

        let format = OutputFormat::from_mime(mime_type).ok_or_else(|| {
            ProcessError::UnsupportedFile {
                name: name.to_string(),
                mime_type: mime_type.to_string(),
            }
        })?;
        let raster = decode_image(bytes).map_err(decode_err)?;
        let original_ratio = raster
            .aspect_ratio()
            .ok_or_else(|| decode_err(DecodeError::InvalidFormat))?;

        Ok(Self {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            source_size: bytes.len() as u64,
            format,
            raster,
            original_ratio,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Size of the original file in bytes.
    pub fn source_size(&self) -> u64 {
        self.source_size
    }

    pub fn source_size_kb(&self) -> f64 {
        self.source_size as f64 / 1024.0
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn raster(&self) -> &DecodedImage {
        &self.raster
    }

    pub fn natural_width(&self) -> u32 {
        self.raster.width
    }

    pub fn natural_height(&self) -> u32 {
        self.raster.height
    }

    /// `natural_width / natural_height`, fixed at decode time.
    pub fn original_ratio(&self) -> f64 {
        self.original_ratio
    }
}

/// A file offered to [`Session::load_files`].
#[derive(Debug, Clone, Copy)]
pub struct FileInput<'a> {
    pub name: &'a str,
    pub mime_type: &'a str,
    pub bytes: &'a [u8],
}

/// Outcome of loading several files at once.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Indices of newly loaded images, in input order.
    pub loaded: Vec<usize>,
    /// Files that were not loaded, in input order.
    pub skipped: Vec<ProcessError>,
}

impl LoadReport {
    /// Skips the user should be warned about.
    pub fn warnings(&self) -> impl Iterator<Item = &ProcessError> {
        self.skipped.iter().filter(|e| !e.is_silent())
    }
}

/// The in-memory working set.
#[derive(Debug, Default)]
pub struct Session {
    config: SessionConfig,
    images: Vec<Rc<LoadedImage>>,
    form: DimensionForm,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let form = DimensionForm::new(config.lock_aspect);
        Self {
            config,
            images: Vec::new(),
            form,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Add one file to the working set and return its index.
    ///
    /// The first image loaded seeds the width and height fields.
    ///
    /// # Errors
    ///
    /// - `UnsupportedFile` if the content type is not `image/*`
    /// - `OversizedFile` if the file exceeds the configured guard
    /// - `Decode` if the bytes cannot be decoded
    pub fn add_file(
        &mut self,
        name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<usize, ProcessError> {
        if !is_image_mime(mime_type) {
            log::debug!("skipping {} ({}): not an image", name, mime_type);
            return Err(ProcessError::UnsupportedFile {
                name: name.to_string(),
                mime_type: mime_type.to_string(),
            });
        }

        let size_bytes = bytes.len() as u64;
        if let Some(limit_bytes) = self.config.max_file_bytes {
            if size_bytes > limit_bytes {
                log::warn!("skipping {}: {} bytes exceeds {}", name, size_bytes, limit_bytes);
                return Err(ProcessError::OversizedFile {
                    name: name.to_string(),
                    size_bytes,
                    limit_bytes,
                });
            }
        }

        let image = LoadedImage::decode(name, mime_type, bytes)?;
        log::info!(
            "loaded {} ({}x{}, {:.2} KB)",
            image.name,
            image.natural_width(),
            image.natural_height(),
            image.source_size_kb()
        );

        self.images.push(Rc::new(image));
        let index = self.images.len() - 1;
        if index == 0 {
            self.seed_form(0);
        }
        Ok(index)
    }

    /// Add several files; failures are collected and never stop the rest.
    pub fn load_files<'a, I>(&mut self, files: I) -> LoadReport
    where
        I: IntoIterator<Item = FileInput<'a>>,
    {
        let mut report = LoadReport::default();
        for file in files {
            match self.add_file(file.name, file.mime_type, file.bytes) {
                Ok(index) => report.loaded.push(index),
                Err(e) => report.skipped.push(e),
            }
        }
        report
    }

    pub fn images(&self) -> &[Rc<LoadedImage>] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Make the image at `index` the reference for the width/height fields.
    pub fn select(&mut self, index: usize) -> Result<(), ProcessError> {
        if index >= self.images.len() {
            return Err(ProcessError::NoSuchImage(index));
        }
        self.seed_form(index);
        Ok(())
    }

    fn seed_form(&mut self, index: usize) {
        let image = &self.images[index];
        self.form.seed(
            image.natural_width(),
            image.natural_height(),
            image.original_ratio(),
        );
    }

    pub fn form(&self) -> &DimensionForm {
        &self.form
    }

    pub fn set_width(&mut self, width: Option<u32>) {
        self.form.set_width(width);
    }

    pub fn set_height(&mut self, height: Option<u32>) {
        self.form.set_height(height);
    }

    pub fn set_lock_aspect(&mut self, locked: bool) {
        self.form.set_lock_aspect(locked);
    }

    /// Drop every image and clear the form fields and ratio.
    pub fn reset(&mut self) {
        log::debug!("reset: releasing {} images", self.images.len());
        self.images.clear();
        self.form.clear();
    }

    /// Validate the request and snapshot the working set into a plan.
    ///
    /// # Errors
    ///
    /// `InvalidTarget`/`InvalidQuality` for a bad mode, `InvalidDimensions`
    /// when either field is empty or zero and `TooManyPixels` when the
    /// requested raster exceeds the pixel limit. No image is touched in any
    /// of these cases.
    pub fn plan_batch(&self, mode: TargetMode) -> Result<BatchPlan, ProcessError> {
        let mode = mode.validate()?;
        let (width, height) =
            self.form
                .dimensions()
                .ok_or(ProcessError::InvalidDimensions {
                    width: self.form.width(),
                    height: self.form.height(),
                })?;

        let search = &self.config.search;
        if !search.fits_pixel_limit(width, height) {
            log::warn!("rejecting {}x{}: over {} pixels", width, height, search.max_pixels);
            return Err(ProcessError::TooManyPixels {
                width,
                height,
                max_pixels: search.max_pixels,
            });
        }

        Ok(BatchPlan::new(
            self.images.iter().cloned(),
            width,
            height,
            mode,
            self.config.search.clone(),
        ))
    }

    /// Plan and run a batch, one image at a time, in load order.
    pub fn process_all<E: RasterEncoder + ?Sized>(
        &self,
        mode: TargetMode,
        encoder: &E,
        timestamp_ms: u64,
    ) -> Result<Vec<BatchItem>, ProcessError> {
        let plan = self.plan_batch(mode)?;
        Ok(plan.run_all(encoder, timestamp_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::parse_dimension;
    use crate::test_helpers::{png_file, FakeEncoder};

    fn session() -> Session {
        Session::new(SessionConfig::default())
    }

    #[test]
    fn test_non_images_are_skipped_silently() {
        let png = png_file(40, 20);
        let mut session = session();
        let report = session.load_files([
            FileInput {
                name: "a.png",
                mime_type: "image/png",
                bytes: &png,
            },
            FileInput {
                name: "notes.txt",
                mime_type: "text/plain",
                bytes: b"hello",
            },
            FileInput {
                name: "b.png",
                mime_type: "image/png",
                bytes: &png,
            },
        ]);

        assert_eq!(session.len(), 2);
        assert_eq!(report.loaded, vec![0, 1]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.warnings().count(), 0);
    }

    #[test]
    fn test_oversized_files_are_skipped_with_warning() {
        let png = png_file(10, 10);
        let mut session = Session::new(SessionConfig {
            max_file_bytes: Some(png.len() as u64 - 1),
            ..SessionConfig::default()
        });

        let err = session.add_file("big.png", "image/png", &png).unwrap_err();
        assert!(matches!(err, ProcessError::OversizedFile { .. }));
        assert!(!err.is_silent());
        assert!(session.is_empty());
    }

    #[test]
    fn test_size_guard_can_be_disabled() {
        let png = png_file(10, 10);
        let mut session = Session::new(SessionConfig {
            max_file_bytes: None,
            ..SessionConfig::default()
        });
        assert!(session.add_file("x.png", "image/png", &png).is_ok());
    }

    #[test]
    fn test_undecodable_image_is_reported() {
        let mut session = session();
        let err = session
            .add_file("broken.jpg", "image/jpeg", &[0xFF, 0xD8, 0x00])
            .unwrap_err();
        assert!(matches!(err, ProcessError::Decode { .. }));
        assert!(session.is_empty());
    }

    #[test]
    fn test_first_image_seeds_form() {
        let mut session = session();
        session.add_file("wide.png", "image/png", &png_file(200, 100)).unwrap();
        session.add_file("tall.png", "image/png", &png_file(50, 100)).unwrap();

        assert_eq!(session.form().dimensions(), Some((200, 100)));
        assert_eq!(session.form().ratio(), Some(2.0));

        session.select(1).unwrap();
        assert_eq!(session.form().dimensions(), Some((50, 100)));
        assert_eq!(session.form().ratio(), Some(0.5));

        assert!(matches!(session.select(5), Err(ProcessError::NoSuchImage(5))));
    }

    #[test]
    fn test_loaded_image_metadata() {
        let png = png_file(40, 20);
        let mut session = session();
        session.add_file("shot.png", "image/png", &png).unwrap();

        let image = &session.images()[0];
        assert_eq!(image.name(), "shot.png");
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!(image.source_size(), png.len() as u64);
        assert_eq!(image.format(), OutputFormat::Png);
        assert_eq!((image.natural_width(), image.natural_height()), (40, 20));
        assert_eq!(image.original_ratio(), 2.0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = session();
        session.add_file("a.png", "image/png", &png_file(20, 20)).unwrap();
        session.reset();

        assert!(session.is_empty());
        assert_eq!(session.form().width(), None);
        assert_eq!(session.form().ratio(), None);
        assert!(session.form().lock_aspect());
    }

    #[test]
    fn test_plan_rejects_bad_input_before_work() {
        let encoder = FakeEncoder::new(1.0, 0);
        let mut session = session();
        session.add_file("a.png", "image/png", &png_file(20, 20)).unwrap();

        let err = session
            .process_all(TargetMode::Size { kilobytes: 0.0 }, &encoder, 0)
            .unwrap_err();
        assert!(err.aborts_batch());

        session.set_width(None);
        let err = session
            .process_all(TargetMode::Size { kilobytes: 5.0 }, &encoder, 0)
            .unwrap_err();
        assert!(matches!(err, ProcessError::InvalidDimensions { .. }));

        assert_eq!(encoder.call_count(), 0);
    }

    #[test]
    fn test_huge_dimensions_abort_batch_without_allocating() {
        let encoder = FakeEncoder::new(1.0, 0);
        let mut session = session();
        session.add_file("a.png", "image/png", &png_file(20, 20)).unwrap();
        session.set_lock_aspect(false);
        session.set_width(parse_dimension("4294967295"));
        session.set_height(parse_dimension("4294967295"));

        let err = session
            .process_all(TargetMode::Quality { fraction: 0.5 }, &encoder, 0)
            .unwrap_err();
        assert!(matches!(
            err,
            ProcessError::TooManyPixels {
                width: u32::MAX,
                height: u32::MAX,
                ..
            }
        ));
        assert!(err.aborts_batch());

        // Just over the default ceiling
        session.set_width(Some(16_384));
        session.set_height(Some(16_385));
        let err = session
            .process_all(TargetMode::Size { kilobytes: 50.0 }, &encoder, 0)
            .unwrap_err();
        assert!(matches!(err, ProcessError::TooManyPixels { .. }));
        assert_eq!(encoder.call_count(), 0);
    }

    #[test]
    fn test_pixel_limit_is_configurable() {
        let mut config = SessionConfig::default();
        config.search.max_pixels = 100;
        let mut session = Session::new(config);
        session.add_file("a.png", "image/png", &png_file(20, 20)).unwrap();

        let err = session
            .plan_batch(TargetMode::Quality { fraction: 0.5 })
            .unwrap_err();
        assert!(matches!(err, ProcessError::TooManyPixels { max_pixels: 100, .. }));

        session.set_width(Some(10));
        assert!(session.plan_batch(TargetMode::Quality { fraction: 0.5 }).is_ok());
    }

    #[test]
    fn test_plan_survives_reset() {
        let mut session = session();
        session.add_file("a.png", "image/png", &png_file(20, 20)).unwrap();
        let plan = session.plan_batch(TargetMode::Quality { fraction: 0.5 }).unwrap();
        session.reset();

        let encoder = FakeEncoder::new(1.0, 0);
        let items = plan.run_all(&encoder, 7);
        assert_eq!(items.len(), 1);
        assert!(items[0].result.is_ok());
    }

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.max_file_bytes, Some(1_048_576_000));
        assert!(config.lock_aspect);
        assert!(Session::default().form().lock_aspect());
    }
}
