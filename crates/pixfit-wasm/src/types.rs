//! WASM-compatible result types.
//!
//! Batch results cross into JavaScript as [`JsBatchItem`] objects; preview
//! metadata crosses as plain objects through `serde-wasm-bindgen`.

use pixfit_core::session::{BatchItem, LoadedImage, OutputFile};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// The outcome for one image of a batch.
///
/// Either a finished file (`ok` is true and `bytes` holds the encoded
/// image) or an error message for the user.
///
/// # Memory Management
///
/// The encoded bytes live in WASM memory. `bytes()` copies them into a
/// `Uint8Array`, so call it once and build the download `Blob` from that.
#[wasm_bindgen]
pub struct JsBatchItem {
    source_name: String,
    output: Option<OutputFile>,
    error: Option<String>,
}

#[wasm_bindgen]
impl JsBatchItem {
    /// Name of the file the user loaded
    #[wasm_bindgen(getter)]
    pub fn source_name(&self) -> String {
        self.source_name.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn ok(&self) -> bool {
        self.output.is_some()
    }

    /// Download name, e.g. `photo_resized.jpeg`
    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> Option<String> {
        self.output.as_ref().map(|o| o.file_name.clone())
    }

    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> Option<String> {
        self.output.as_ref().map(|o| o.mime_type.clone())
    }

    #[wasm_bindgen(getter)]
    pub fn size_kb(&self) -> Option<f64> {
        self.output.as_ref().map(|o| o.encoded.size_kb)
    }

    #[wasm_bindgen(getter)]
    pub fn quality(&self) -> Option<f64> {
        self.output.as_ref().map(|o| o.encoded.quality)
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> Option<u32> {
        self.output.as_ref().map(|o| o.encoded.width)
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> Option<u32> {
        self.output.as_ref().map(|o| o.encoded.height)
    }

    /// Total encoder calls spent on this image
    #[wasm_bindgen(getter)]
    pub fn encoder_calls(&self) -> Option<u32> {
        self.output.as_ref().map(|o| o.encoded.encoder_calls)
    }

    /// Message to show when the image could not be produced
    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.error.clone()
    }

    /// Encoded file bytes as a `Uint8Array` (empty on failure).
    pub fn bytes(&self) -> Vec<u8> {
        self.output
            .as_ref()
            .map(|o| o.bytes().to_vec())
            .unwrap_or_default()
    }
}

impl From<BatchItem> for JsBatchItem {
    fn from(item: BatchItem) -> Self {
        let (output, error) = match item.result {
            Ok(output) => (Some(output), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            source_name: item.source_name,
            output,
            error,
        }
    }
}

/// Metadata the page needs to render one preview tile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImagePreview {
    pub index: usize,
    pub name: String,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
    pub size_kb: f64,
}

impl ImagePreview {
    pub(crate) fn new(index: usize, image: &LoadedImage) -> Self {
        Self {
            index,
            name: image.name().to_string(),
            mime_type: image.mime_type().to_string(),
            width: image.natural_width(),
            height: image.natural_height(),
            size_kb: image.source_size_kb(),
        }
    }
}
