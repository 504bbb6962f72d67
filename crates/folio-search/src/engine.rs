//! Runtime query engine.
//!
//! The engine starts unloaded, holding the raw index value. The first query
//! deserializes it once; every later query reuses the loaded index.

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    Result, SearchError,
    analyzer::Analyzer,
    document::{Document, Location},
    index::SearchIndex,
};

/// A ranked match: the full stored document and its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Relevance score, higher is better.
    pub score: f64,
    /// Stored document.
    #[serde(flatten)]
    pub document: Document,
}

impl SearchResult {
    /// Where the result should navigate to.
    pub fn location(&self) -> Location {
        self.document.location()
    }
}

#[derive(Debug)]
enum Source {
    Value(serde_json::Value),
    Json(String),
}

impl Source {
    fn deserialize(&self) -> Result<SearchIndex> {
        match self {
            Self::Value(value) => SearchIndex::from_structured_value(value),
            Self::Json(json) => SearchIndex::from_json(json),
        }
    }
}

#[derive(Debug)]
enum State {
    Unloaded(Source),
    Loaded {
        index: SearchIndex,
        analyzer: Analyzer,
    },
}

/// Query engine over a serialized search index.
#[derive(Debug)]
pub struct QueryEngine {
    state: State,
}

impl QueryEngine {
    /// Engine over a structured index value. Nothing is parsed yet.
    pub fn load(value: serde_json::Value) -> Self {
        Self {
            state: State::Unloaded(Source::Value(value)),
        }
    }

    /// Engine over serialized JSON. Nothing is parsed yet.
    pub fn from_json(json: impl Into<String>) -> Self {
        Self {
            state: State::Unloaded(Source::Json(json.into())),
        }
    }

    /// Engine over an index already in memory.
    pub fn from_index(index: SearchIndex) -> Result<Self> {
        let analyzer = index.analyzer()?;
        Ok(Self {
            state: State::Loaded { index, analyzer },
        })
    }

    /// Whether the index has been deserialized.
    pub fn is_loaded(&self) -> bool {
        matches!(self.state, State::Loaded { .. })
    }

    /// Deserialize the index if that has not happened yet.
    ///
    /// A failed load leaves the engine unloaded so a later call can report
    /// the same error.
    pub fn ensure_loaded(&mut self) -> Result<&SearchIndex> {
        Ok(self.loaded()?.0)
    }

    fn loaded(&mut self) -> Result<(&SearchIndex, &Analyzer)> {
        if let State::Unloaded(source) = &self.state {
            let index = source.deserialize()?;
            let analyzer = index.analyzer()?;
            info!(
                documents = index.document_count(),
                terms = index.term_count(),
                "Loaded search index"
            );
            self.state = State::Loaded { index, analyzer };
        }

        match &self.state {
            State::Loaded { index, analyzer } => Ok((index, analyzer)),
            State::Unloaded(_) => Err(SearchError::InvalidIndex(
                "search index is not loaded".to_string(),
            )),
        }
    }

    /// Number of stored documents, loading the index if needed.
    pub fn document_count(&mut self) -> Result<usize> {
        Ok(self.ensure_loaded()?.document_count())
    }

    /// Full stored documents matching `query`, best first.
    ///
    /// Empty and stopword-only queries match nothing.
    pub fn search(&mut self, query: &str) -> Result<Vec<SearchResult>> {
        let (index, analyzer) = self.loaded()?;

        let results: Vec<SearchResult> = index
            .search(analyzer, query)
            .into_iter()
            .filter_map(|hit| {
                index.document(&hit.reference).map(|doc| SearchResult {
                    score: hit.score,
                    document: doc.clone(),
                })
            })
            .collect();

        debug!(query, results = results.len(), "query finished");
        Ok(results)
    }

    /// Like [`QueryEngine::search`], keeping at most `limit` results.
    pub fn search_with_limit(&mut self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let mut results = self.search(query)?;
        results.truncate(limit);
        Ok(results)
    }
}
