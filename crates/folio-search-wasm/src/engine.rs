//! JavaScript bindings for the query engine.

use folio_search::QueryEngine;
use gloo_net::http::Request;
use wasm_bindgen::prelude::*;

use crate::results::SearchResults;

/// Default number of results returned by `search`.
pub const DEFAULT_LIMIT: usize = 10;

/// Search engine over a serialized site index.
///
/// The index is parsed on the first query, not when the engine is created.
#[wasm_bindgen]
pub struct SearchEngine {
    engine: QueryEngine,
}

impl SearchEngine {
    /// Wrap a query engine.
    pub fn new(engine: QueryEngine) -> Self {
        Self { engine }
    }

    /// Run a query without crossing into JavaScript.
    pub fn run(&mut self, query: &str, limit: usize) -> folio_search::Result<SearchResults> {
        let results = self.engine.search(query)?;
        Ok(SearchResults::from_results(query, results, limit))
    }
}

#[wasm_bindgen]
impl SearchEngine {
    /// Fetch the serialized index from a URL.
    #[wasm_bindgen(js_name = load)]
    pub async fn load(index_url: &str) -> Result<SearchEngine, JsValue> {
        let response = Request::get(index_url)
            .send()
            .await
            .map_err(|e| JsValue::from_str(&format!("Network error: {e}")))?;

        if !response.ok() {
            return Err(JsValue::from_str(&format!(
                "Failed to load index: HTTP {}",
                response.status()
            )));
        }

        let json = response
            .text()
            .await
            .map_err(|e| JsValue::from_str(&format!("Failed to read response: {e}")))?;

        Ok(Self::new(QueryEngine::from_json(json)))
    }

    /// Create from a JSON string.
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: String) -> SearchEngine {
        Self::new(QueryEngine::from_json(json))
    }

    /// Create from an already parsed JavaScript object.
    #[wasm_bindgen(js_name = fromValue)]
    pub fn from_value(value: JsValue) -> Result<SearchEngine, JsValue> {
        let value: serde_json::Value = serde_wasm_bindgen::from_value(value)
            .map_err(|e| JsValue::from_str(&format!("Failed to read index: {e}")))?;
        Ok(Self::new(QueryEngine::load(value)))
    }

    /// Search the index. Results are full stored documents, best first.
    pub fn search(&mut self, query: &str, limit: Option<usize>) -> Result<JsValue, JsValue> {
        let started = js_sys::Date::now();
        let mut results = self
            .run(query, limit.unwrap_or(DEFAULT_LIMIT))
            .map_err(|e| JsValue::from_str(&format!("Search failed: {e}")))?;
        results.duration_ms = (js_sys::Date::now() - started).max(0.0) as u32;
        results.to_js()
    }

    /// Whether the index has been parsed yet.
    #[wasm_bindgen(js_name = isLoaded)]
    pub fn is_loaded(&self) -> bool {
        self.engine.is_loaded()
    }

    /// Number of stored documents. Parses the index if needed.
    #[wasm_bindgen(js_name = documentCount)]
    pub fn document_count(&mut self) -> Result<usize, JsValue> {
        self.engine
            .document_count()
            .map_err(|e| JsValue::from_str(&format!("Failed to parse index: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use folio_search::{Document, IndexSettings};

    use super::*;

    fn index_json() -> String {
        let mut builder = IndexSettings::default().builder().unwrap();
        for (id, offset, text) in [
            ("guide--0", Some(0), "Install the toolchain"),
            ("guide--1", Some(1), "Configure the site"),
            ("guide", None, "Install the toolchain. Configure the site."),
        ] {
            builder
                .add_document(Document {
                    id: id.to_string(),
                    title: "Guide".to_string(),
                    markup: format!("<p>{text}</p>"),
                    text: text.to_string(),
                    slug: "/guide".to_string(),
                    date: None,
                    offset,
                })
                .unwrap();
        }
        builder.finish().to_json().unwrap()
    }

    #[test]
    fn test_run_loads_lazily() {
        let mut engine = SearchEngine::from_json(index_json());
        assert!(!engine.is_loaded());

        let results = engine.run("configure", DEFAULT_LIMIT).unwrap();
        assert!(engine.is_loaded());
        assert_eq!(results.total, 2);
        assert_eq!(results.results[0].href, "/guide?elementIndex=1");
        assert_eq!(results.results[1].href, "/guide");
    }

    #[test]
    fn test_run_empty_query() {
        let mut engine = SearchEngine::from_json(index_json());
        let results = engine.run("", DEFAULT_LIMIT).unwrap();
        assert_eq!(results.total, 0);
    }

    #[test]
    fn test_run_invalid_index() {
        let mut engine = SearchEngine::from_json("{}".to_string());
        assert!(engine.run("install", DEFAULT_LIMIT).is_err());
    }
}
