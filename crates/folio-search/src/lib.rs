//! Folio Search Library
//!
//! Section-level full-text search for generated sites. Every page is indexed
//! as one page document plus one document per top-level element of its body,
//! so results can point at the exact section that matched.
//!
//! # Features
//!
//! - **Shared analyzer**: tokenization, stopwords and stemming are recorded in
//!   the serialized index so the runtime analyzes queries the same way
//! - **Structured index value**: the index round-trips through
//!   [`serde_json::Value`] without changing its rankings
//! - **Build pipeline** (`build` feature): HTML fragmentation, page documents,
//!   the page aggregate and a look-aside index cache
//!
//! # Example
//!
//! ```no_run
//! use folio_search::{QueryEngine, SearchIndex};
//!
//! # fn run(index: &SearchIndex) -> folio_search::Result<()> {
//! let mut engine = QueryEngine::load(index.to_structured_value()?);
//! for result in engine.search("intro")? {
//!     println!("{} -> {}", result.document.id, result.location().href());
//! }
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod document;
pub mod engine;
pub mod index;

#[cfg(feature = "build")]
pub mod aggregate;
#[cfg(feature = "build")]
pub mod cache;
#[cfg(feature = "build")]
pub mod fragment;
#[cfg(feature = "build")]
pub mod resolver;

#[cfg(feature = "build")]
pub use aggregate::{SearchIndexAccumulator, SearchIndexNode};
pub use analyzer::{Analyzer, AnalyzerConfig, parse_language};
#[cfg(feature = "build")]
pub use cache::{CacheError, IndexCache, MemoryCache, NoCache};
#[cfg(feature = "build")]
pub use document::{FieldResolver, MarkdownFields, page_documents, resolver_for};
pub use document::{DocRef, Document, Location, PageIds};
pub use engine::{QueryEngine, SearchResult};
#[cfg(feature = "build")]
pub use fragment::{Fragment, fragment_html};
pub use index::{
    INDEX_FORMAT_VERSION, IndexBuilder, IndexSettings, MARKUP_FIELD, REF_FIELD, SearchHit,
    SearchIndex, TEXT_FIELD,
};
#[cfg(feature = "build")]
pub use resolver::{IndexResolver, PageSource, build_index};
use thiserror::Error;

/// Search-related errors.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The analyzer could not be constructed.
    #[error("Analyzer error: {0}")]
    Analyzer(String),

    /// A document has no value for the index's ref field.
    #[error("Document has no value for ref field `{0}`")]
    MissingRef(String),

    /// A page id cannot be used as an index reference.
    #[error("Invalid page id `{0}`")]
    InvalidPageId(String),

    /// The same page was appended to the aggregate twice.
    #[error("Page `{0}` is already part of the search index")]
    DuplicatePage(String),

    /// The index value is structurally inconsistent.
    #[error("Invalid index: {0}")]
    InvalidIndex(String),

    /// The index value was written by an incompatible format version.
    #[error("Unsupported index format version {found}, expected {expected}")]
    UnsupportedVersion {
        /// Version found in the value.
        found: u32,
        /// Version this build reads.
        expected: u32,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;
