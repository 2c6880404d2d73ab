use std::rc::Rc;

use super::LoadedImage;
use crate::encode::RasterEncoder;
use crate::error::ProcessError;
use crate::naming::{resized_file_name, timestamped_file_name};
use crate::search::{encode_at_quality, encode_to_target, EncodeResult, SearchConfig};
use crate::target::TargetMode;

/// A file ready for download.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFile {
    pub file_name: String,
    pub mime_type: String,
    pub encoded: EncodeResult,
}

impl OutputFile {
    pub fn bytes(&self) -> &[u8] {
        &self.encoded.bytes
    }
}

/// The outcome for one image of a batch.
#[derive(Debug)]
pub struct BatchItem {
    pub source_name: String,
    pub result: Result<OutputFile, ProcessError>,
}

/// One image of a validated batch.
#[derive(Debug, Clone)]
pub struct BatchJob {
    image: Rc<LoadedImage>,
    width: u32,
    height: u32,
    mode: TargetMode,
}

impl BatchJob {
    pub fn image(&self) -> &LoadedImage {
        &self.image
    }

    pub fn run<E: RasterEncoder + ?Sized>(
        &self,
        encoder: &E,
        config: &SearchConfig,
        timestamp_ms: u64,
    ) -> BatchItem {
        let image = &*self.image;
        let result = match self.mode {
            TargetMode::Size { kilobytes } => encode_to_target(
                encoder,
                image.raster(),
                self.width,
                self.height,
                image.format(),
                kilobytes,
                config,
            )
            .map(|encoded| OutputFile {
                file_name: resized_file_name(image.name(), image.mime_type()),
                mime_type: image.mime_type().to_string(),
                encoded,
            }),
            TargetMode::Quality { fraction } => encode_at_quality(
                encoder,
                image.raster(),
                self.width,
                self.height,
                image.format(),
                fraction,
                config,
            )
            .map(|encoded| OutputFile {
                file_name: timestamped_file_name(image.name(), image.mime_type(), timestamp_ms),
                mime_type: image.mime_type().to_string(),
                encoded,
            }),
        };

        let result = result.map_err(|e| ProcessError::from_search(image.name(), e));
        if let Err(e) = &result {
            log::warn!("{}", e);
        }

        BatchItem {
            source_name: image.name().to_string(),
            result,
        }
    }
}

/// A validated batch: every image at the same dimensions and mode.
///
/// Jobs hold shared handles, so the plan outlives a reset of the session
/// that produced it.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    jobs: Vec<BatchJob>,
    config: SearchConfig,
}

impl BatchPlan {
    pub(super) fn new(
        images: impl IntoIterator<Item = Rc<LoadedImage>>,
        width: u32,
        height: u32,
        mode: TargetMode,
        config: SearchConfig,
    ) -> Self {
        let jobs = images
            .into_iter()
            .map(|image| BatchJob {
                image,
                width,
                height,
                mode,
            })
            .collect();
        Self { jobs, config }
    }

    pub fn jobs(&self) -> &[BatchJob] {
        &self.jobs
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Run every job in order. A failed image never stops the rest.
    pub fn run_all<E: RasterEncoder + ?Sized>(
        &self,
        encoder: &E,
        timestamp_ms: u64,
    ) -> Vec<BatchItem> {
        self.jobs
            .iter()
            .map(|job| job.run(encoder, &self.config, timestamp_ms))
            .collect()
    }
}
