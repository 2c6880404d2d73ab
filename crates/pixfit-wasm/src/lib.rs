//! Pixfit WASM - WebAssembly bindings for Pixfit
//!
//! This crate exposes the pixfit-core session to the page script.
//!
//! # Module Structure
//!
//! - `session` - The working set, form edits and the async resize batches
//! - `types` - JS-facing batch results and preview metadata
//! - `logger` - `log` backend writing to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsSession, set_log_level } from '@pixfit/wasm';
//!
//! await init();
//! set_log_level("debug"); // show every search attempt in the console
//!
//! const session = new JsSession();
//! ```

use wasm_bindgen::prelude::*;

mod logger;
mod session;
mod types;

pub use session::JsSession;
pub use types::JsBatchItem;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logger::install(log::LevelFilter::Info);
}

/// Change the console log level (`error`, `warn`, `info`, `debug`, `trace`
/// or `off`). Unknown names select `info`.
#[wasm_bindgen]
pub fn set_log_level(level: &str) {
    logger::install(logger::level_from_str(level));
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
