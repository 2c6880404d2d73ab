//! Session bindings.
//!
//! [`JsSession`] is the page's only handle on the working set. Loading and
//! form edits are synchronous; the two resize entry points return a
//! `Promise` and process images one at a time, yielding to the event loop
//! between images so the page can repaint.
//!
//! # Example
//!
//! ```typescript
//! import init, { JsSession } from '@pixfit/wasm';
//!
//! await init();
//! const session = new JsSession();
//!
//! for (const file of input.files) {
//!   const bytes = new Uint8Array(await file.arrayBuffer());
//!   try {
//!     session.add_file(file.name, file.type, bytes);
//!   } catch (message) {
//!     alert(message);
//!   }
//! }
//!
//! session.set_width("1000");
//! const items = await session.resize_to_size("50");
//! for (const item of items) {
//!   if (item.ok) download(item.file_name, item.mime_type, item.bytes());
//!   else alert(item.error);
//! }
//! ```

use std::cell::RefCell;

use js_sys::{Array, Function, Promise};
use pixfit_core::encode::CodecEncoder;
use pixfit_core::session::{BatchPlan, Session, SessionConfig};
use pixfit_core::target::{parse_dimension, TargetMode};
use pixfit_core::ProcessError;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

use crate::types::{ImagePreview, JsBatchItem};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = setTimeout)]
    fn set_timeout(handler: &Function, timeout: i32) -> JsValue;
}

fn to_js_error(e: ProcessError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Resolve on the next macrotask.
async fn yield_to_event_loop() -> Result<(), JsValue> {
    let tick = Promise::new(&mut |resolve, _reject| {
        set_timeout(&resolve, 0);
    });
    JsFuture::from(tick).await.map(|_| ())
}

/// The loaded images and resize form for one page.
#[wasm_bindgen]
pub struct JsSession {
    inner: RefCell<Session>,
}

#[wasm_bindgen]
impl JsSession {
    /// Create a session. `config` is an optional object with any of
    /// `max_file_bytes`, `lock_aspect` and `search` (including
    /// `search.max_pixels`); missing fields use defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsSession, JsValue> {
        let config: SessionConfig = if config.is_undefined() || config.is_null() {
            SessionConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(JsValue::from)?
        };
        Ok(Self {
            inner: RefCell::new(Session::new(config)),
        })
    }

    /// Add a file to the working set.
    ///
    /// Returns the new image's index, or `undefined` for a non-image file
    /// (skipped without a message). Throws a message for an oversized or
    /// undecodable image.
    pub fn add_file(
        &self,
        name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<Option<u32>, JsValue> {
        match self.inner.borrow_mut().add_file(name, mime_type, bytes) {
            Ok(index) => Ok(Some(index as u32)),
            Err(e) if e.is_silent() => Ok(None),
            Err(e) => Err(to_js_error(e)),
        }
    }

    /// Use the image at `index` as the reference for width, height and ratio.
    pub fn select(&self, index: u32) -> Result<(), JsValue> {
        self.inner
            .borrow_mut()
            .select(index as usize)
            .map_err(to_js_error)
    }

    /// Set the width field from its text; the height follows when locked.
    pub fn set_width(&self, input: &str) {
        self.inner.borrow_mut().set_width(parse_dimension(input));
    }

    /// Set the height field from its text; the width follows when locked.
    pub fn set_height(&self, input: &str) {
        self.inner.borrow_mut().set_height(parse_dimension(input));
    }

    pub fn set_lock_aspect(&self, locked: bool) {
        self.inner.borrow_mut().set_lock_aspect(locked);
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> Option<u32> {
        self.inner.borrow().form().width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> Option<u32> {
        self.inner.borrow().form().height()
    }

    #[wasm_bindgen(getter)]
    pub fn lock_aspect(&self) -> bool {
        self.inner.borrow().form().lock_aspect()
    }

    #[wasm_bindgen(getter)]
    pub fn len(&self) -> u32 {
        self.inner.borrow().len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// Preview metadata for every loaded image, in load order.
    pub fn previews(&self) -> Result<JsValue, JsValue> {
        let previews: Vec<ImagePreview> = self
            .inner
            .borrow()
            .images()
            .iter()
            .enumerate()
            .map(|(index, image)| ImagePreview::new(index, image))
            .collect();
        serde_wasm_bindgen::to_value(&previews).map_err(JsValue::from)
    }

    /// Release every image and clear the form.
    pub fn reset(&self) {
        self.inner.borrow_mut().reset();
    }

    /// Resize every image to the form dimensions, compressing each toward
    /// `target_input` kilobytes.
    ///
    /// Rejects with a message, before touching any image, if the target or
    /// the dimensions are invalid. Otherwise resolves to an array of
    /// `JsBatchItem`.
    pub fn resize_to_size(&self, target_input: &str) -> Promise {
        let plan = TargetMode::size_from_input(target_input)
            .and_then(|mode| self.inner.borrow().plan_batch(mode));
        run_batch(plan)
    }

    /// Resize every image to the form dimensions at a fixed quality
    /// percentage (10 to 100).
    pub fn resize_to_quality(&self, quality_input: &str) -> Promise {
        let plan = TargetMode::quality_from_input(quality_input)
            .and_then(|mode| self.inner.borrow().plan_batch(mode));
        run_batch(plan)
    }
}

fn run_batch(plan: Result<BatchPlan, ProcessError>) -> Promise {
    future_to_promise(async move {
        let plan = plan.map_err(to_js_error)?;
        log::info!("processing {} images", plan.len());

        let items = Array::new();
        for (i, job) in plan.jobs().iter().enumerate() {
            if i > 0 {
                yield_to_event_loop().await?;
            }
            let timestamp_ms = js_sys::Date::now() as u64;
            let item = job.run(&CodecEncoder, plan.config(), timestamp_ms);
            items.push(&JsValue::from(JsBatchItem::from(item)));
        }
        Ok(items.into())
    })
}
