//! WASM bindings for the post analysis sync layer
//!
//! All session state lives in Rust. JavaScript forwards page events to the
//! session and hosts the scoring engine.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { PostAnalysisSession } from './pkg/post_analysis_wasm.js';
//!
//! await init();
//!
//! const session = new PostAnalysisSession(window.analysisConfig, ScoringEngine);
//! session.trackedFields().forEach(id =>
//!     document.getElementById(id)?.addEventListener('input', () => session.fieldChanged(id)));
//!
//! // Inside the engine, once a score is ready
//! session.postScore(requestId, 'keyword', 73, marksJson);
//!
//! // Observe permalink generation
//! jQuery(document).on('ajaxComplete', (ev, xhr, opts) =>
//!     session.requestCompleted(opts.url, opts.data, xhr.responseText));
//! ```

pub mod dom;
pub mod editor;
pub mod engine;
pub mod logging;
pub mod session;

use wasm_bindgen::prelude::*;

// Re-export main types for JavaScript
pub use editor::TinyMceEditor;
pub use engine::JsEngineFactory;
pub use session::PostAnalysisSession;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init();
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Display class for a raw score, without creating a session
#[wasm_bindgen(js_name = indicatorClass)]
pub fn indicator_class(raw: &str) -> String {
    analysis_sync::indicator::map_field_value(raw)
        .display_class
        .to_string()
}
