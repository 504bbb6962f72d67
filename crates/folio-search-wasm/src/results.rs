//! Result records handed to JavaScript.

use folio_search::{Document, SearchResult};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// A stored document plus ranking and navigation data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    /// Every stored field of the matching document.
    #[serde(flatten)]
    pub document: Document,

    /// Relevance score (higher is better).
    pub score: f64,

    /// Link to the page, with `?elementIndex=N` for sections.
    pub href: String,

    /// Element offset for section results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_index: Option<usize>,
}

impl From<SearchResult> for ResultRecord {
    fn from(result: SearchResult) -> Self {
        let location = result.location();
        Self {
            href: location.href(),
            element_index: location.offset,
            score: result.score,
            document: result.document,
        }
    }
}

/// Search results container.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    /// Query that was executed.
    pub query: String,

    /// Total number of matches before the limit.
    pub total: usize,

    /// Result items, best first.
    pub results: Vec<ResultRecord>,

    /// Search duration in milliseconds.
    pub duration_ms: u32,
}

impl SearchResults {
    /// Keep the first `limit` of `results`.
    pub fn from_results(query: &str, results: Vec<SearchResult>, limit: usize) -> Self {
        let total = results.len();
        Self {
            query: query.to_string(),
            total,
            results: results.into_iter().take(limit).map(Into::into).collect(),
            duration_ms: 0,
        }
    }

    /// Convert to a plain JavaScript object.
    pub fn to_js(&self) -> Result<JsValue, JsValue> {
        self.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, offset: Option<usize>, score: f64) -> SearchResult {
        SearchResult {
            score,
            document: Document {
                id: id.to_string(),
                title: "Guide".to_string(),
                markup: "<p>x</p>".to_string(),
                text: "x".to_string(),
                slug: "/guide".to_string(),
                date: None,
                offset,
            },
        }
    }

    #[test]
    fn test_section_record_links_to_element() {
        let record = ResultRecord::from(result("guide--3", Some(3), 1.5));
        assert_eq!(record.href, "/guide?elementIndex=3");
        assert_eq!(record.element_index, Some(3));
    }

    #[test]
    fn test_page_record_links_to_page() {
        let record = ResultRecord::from(result("guide", None, 1.0));
        assert_eq!(record.href, "/guide");
        assert_eq!(record.element_index, None);
    }

    #[test]
    fn test_limit_keeps_total() {
        let results = vec![result("a", None, 3.0), result("b", None, 2.0), result("c", None, 1.0)];
        let results = SearchResults::from_results("q", results, 2);

        assert_eq!(results.total, 3);
        assert_eq!(results.results.len(), 2);
        assert_eq!(results.results[1].document.id, "b");
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = ResultRecord::from(result("guide--0", Some(0), 2.5));
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["id"], "guide--0");
        assert_eq!(json["title"], "Guide");
        assert_eq!(json["elementIndex"], 0);
        assert_eq!(json["score"], 2.5);
    }
}
