//! Folio Search WASM Runtime
//!
//! Browser-side search over the index written by `folio build`.
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import { SearchEngine } from 'folio-search-wasm';
//!
//! const engine = await SearchEngine.load('/search_index.json');
//!
//! // The index is parsed on the first query
//! const { results } = engine.search('install', 10);
//! for (const result of results) {
//!   console.log(result.title, result.href);
//! }
//! ```

pub mod engine;
pub mod results;

pub use engine::SearchEngine;
pub use results::{ResultRecord, SearchResults};
use wasm_bindgen::prelude::*;

/// Initialize the WASM module.
///
/// Sets up panic hook for better error messages in the console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the version of the search library.
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Index format version this runtime reads.
#[wasm_bindgen(js_name = indexFormatVersion)]
pub fn index_format_version() -> u32 {
    folio_search::INDEX_FORMAT_VERSION
}
