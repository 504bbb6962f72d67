//! Inverted index over page and section documents.
//!
//! [`IndexBuilder`] accumulates postings at build time. The finished
//! [`SearchIndex`] is plain data: it converts to and from a structured
//! [`serde_json::Value`] and answers ranked queries without re-analyzing
//! any stored document.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, info};

use crate::{
    Result, SearchError,
    analyzer::{Analyzer, AnalyzerConfig},
    document::Document,
};

/// Index format version.
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// Field holding each document's reference.
pub const REF_FIELD: &str = "id";

/// Field with element (or body) HTML.
pub const MARKUP_FIELD: &str = "markup";

/// Field with element (or body) text.
pub const TEXT_FIELD: &str = "text";

/// Analyzer and field weights used to build a site index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSettings {
    /// Analysis pipeline shared with the query side.
    pub analyzer: AnalyzerConfig,
    /// Boost of the `markup` field.
    pub markup_boost: f64,
    /// Boost of the `text` field.
    pub text_boost: f64,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            analyzer: AnalyzerConfig::default(),
            markup_boost: 1.0,
            text_boost: 1.0,
        }
    }
}

impl IndexSettings {
    /// Empty builder with the `markup` and `text` fields declared.
    pub fn builder(&self) -> Result<IndexBuilder> {
        let analyzer = Analyzer::new(self.analyzer.clone())?;
        let mut builder = IndexBuilder::new(analyzer);
        builder
            .add_field(MARKUP_FIELD, self.markup_boost)
            .add_field(TEXT_FIELD, self.text_boost);
        Ok(builder)
    }
}

#[cfg(feature = "build")]
impl From<&folio_core::config::SearchConfig> for IndexSettings {
    fn from(config: &folio_core::config::SearchConfig) -> Self {
        Self {
            analyzer: AnalyzerConfig::new(config.language.clone()),
            markup_boost: config.markup_boost,
            text_boost: config.text_boost,
        }
    }
}

/// A declared field and its weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Document field name.
    pub name: String,
    /// Score multiplier for matches in this field.
    pub boost: f64,
}

/// Postings and lengths of one field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldIndex {
    /// term -> (ref -> term frequency)
    postings: BTreeMap<String, BTreeMap<String, u32>>,
    /// ref -> number of terms in the field
    lengths: BTreeMap<String, u32>,
}

impl FieldIndex {
    /// Number of distinct terms.
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    /// Term frequencies of `term`, keyed by ref.
    pub fn postings(&self, term: &str) -> Option<&BTreeMap<String, u32>> {
        self.postings.get(term)
    }
}

/// Stored documents in insertion order.
///
/// Serialized as a sequence so the order survives any map representation.
#[derive(Debug, Clone, Default, PartialEq)]
struct DocumentStore(IndexMap<String, Document>);

impl Serialize for DocumentStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.values())
    }
}

impl<'de> Deserialize<'de> for DocumentStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let documents = Vec::<Document>::deserialize(deserializer)?;
        Ok(Self(
            documents.into_iter().map(|d| (d.id.clone(), d)).collect(),
        ))
    }
}

/// One ranked match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// Matching document ref.
    pub reference: String,
    /// Relevance score, higher is better.
    pub score: f64,
}

/// Queryable index data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIndex {
    version: u32,
    #[serde(rename = "ref")]
    ref_field: String,
    analyzer: AnalyzerConfig,
    fields: Vec<FieldSpec>,
    index: BTreeMap<String, FieldIndex>,
    document_store: DocumentStore,
}

impl SearchIndex {
    fn empty(analyzer: AnalyzerConfig) -> Self {
        Self {
            version: INDEX_FORMAT_VERSION,
            ref_field: REF_FIELD.to_string(),
            analyzer,
            fields: Vec::new(),
            index: BTreeMap::new(),
            document_store: DocumentStore::default(),
        }
    }

    /// Format version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Analyzer config recorded at build time.
    pub fn analyzer_config(&self) -> &AnalyzerConfig {
        &self.analyzer
    }

    /// Rebuild the analyzer recorded at build time.
    pub fn analyzer(&self) -> Result<Analyzer> {
        Analyzer::new(self.analyzer.clone())
    }

    /// Declared fields.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Postings of a declared field.
    pub fn field_index(&self, name: &str) -> Option<&FieldIndex> {
        self.index.get(name)
    }

    /// Number of stored documents.
    pub fn document_count(&self) -> usize {
        self.document_store.0.len()
    }

    /// Number of distinct terms across all fields.
    pub fn term_count(&self) -> usize {
        let mut terms: Vec<&str> = self
            .index
            .values()
            .flat_map(|f| f.postings.keys().map(String::as_str))
            .collect();
        terms.sort_unstable();
        terms.dedup();
        terms.len()
    }

    /// Stored document for a ref.
    pub fn document(&self, reference: &str) -> Option<&Document> {
        self.document_store.0.get(reference)
    }

    /// Stored documents in insertion order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.document_store.0.values()
    }

    /// Rank documents containing at least one analyzed query term.
    ///
    /// A document scores, per field and term,
    /// `boost * sqrt(tf) * idf^2 / sqrt(field length)` with
    /// `idf = 1 + ln(N / (df + 1))`. Equal scores keep insertion order.
    pub fn search(&self, analyzer: &Analyzer, query: &str) -> Vec<SearchHit> {
        let terms = analyzer.unique_terms(query);
        if terms.is_empty() || self.document_store.0.is_empty() {
            return Vec::new();
        }

        let total = self.document_store.0.len() as f64;
        let mut scores: HashMap<&str, f64> = HashMap::new();

        for spec in &self.fields {
            let Some(field) = self.index.get(&spec.name) else {
                continue;
            };

            for term in &terms {
                let Some(postings) = field.postings.get(term) else {
                    continue;
                };

                let idf = 1.0 + (total / (postings.len() as f64 + 1.0)).ln();
                for (reference, &tf) in postings {
                    let length = field.lengths.get(reference).copied().unwrap_or(0).max(1);
                    let score =
                        spec.boost * f64::from(tf).sqrt() * idf * idf / f64::from(length).sqrt();
                    *scores.entry(reference.as_str()).or_insert(0.0) += score;
                }
            }
        }

        let mut hits: Vec<(usize, SearchHit)> = scores
            .into_iter()
            .filter_map(|(reference, score)| {
                let position = self.document_store.0.get_index_of(reference)?;
                Some((
                    position,
                    SearchHit {
                        reference: reference.to_string(),
                        score,
                    },
                ))
            })
            .collect();

        hits.sort_by(|(pa, a), (pb, b)| b.score.total_cmp(&a.score).then(pa.cmp(pb)));

        debug!(query, terms = terms.len(), hits = hits.len(), "searched index");
        hits.into_iter().map(|(_, hit)| hit).collect()
    }

    /// Convert to a structured value of maps, sequences and primitives.
    pub fn to_structured_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Rebuild an index from [`SearchIndex::to_structured_value`] output.
    pub fn from_structured_value(value: &serde_json::Value) -> Result<Self> {
        let found = value
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| SearchError::InvalidIndex("missing format version".to_string()))?;
        if found != u64::from(INDEX_FORMAT_VERSION) {
            return Err(SearchError::UnsupportedVersion {
                found: u32::try_from(found).unwrap_or(u32::MAX),
                expected: INDEX_FORMAT_VERSION,
            });
        }

        let index = Self::deserialize(value)?;
        index.validate()?;
        Ok(index)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_structured_value(&value)
    }

    /// Check that the recorded analyzer can be rebuilt, every posting and
    /// length refers to a stored document, and every declared field has
    /// postings.
    pub fn validate(&self) -> Result<()> {
        Analyzer::new(self.analyzer.clone())?;

        if self.ref_field != REF_FIELD {
            return Err(SearchError::InvalidIndex(format!(
                "unsupported ref field `{}`",
                self.ref_field
            )));
        }

        for spec in &self.fields {
            if !spec.boost.is_finite() {
                return Err(SearchError::InvalidIndex(format!(
                    "field `{}` has a non-finite boost",
                    spec.name
                )));
            }
            if !self.index.contains_key(&spec.name) {
                return Err(SearchError::InvalidIndex(format!(
                    "field `{}` has no postings",
                    spec.name
                )));
            }
        }

        for (name, field) in &self.index {
            let refs = field
                .postings
                .values()
                .flat_map(|p| p.keys())
                .chain(field.lengths.keys());
            for reference in refs {
                if !self.document_store.0.contains_key(reference) {
                    return Err(SearchError::InvalidIndex(format!(
                        "field `{name}` refers to unknown document `{reference}`"
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Accumulates documents into a [`SearchIndex`].
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    analyzer: Analyzer,
    index: SearchIndex,
}

impl IndexBuilder {
    /// Builder with no declared fields.
    pub fn new(analyzer: Analyzer) -> Self {
        let index = SearchIndex::empty(analyzer.config().clone());
        Self { analyzer, index }
    }

    /// Declare a field, or update its boost if already declared.
    ///
    /// Only documents added afterwards are indexed under a new field.
    pub fn add_field(&mut self, name: &str, boost: f64) -> &mut Self {
        match self.index.fields.iter_mut().find(|f| f.name == name) {
            Some(spec) => spec.boost = boost,
            None => {
                self.index.fields.push(FieldSpec {
                    name: name.to_string(),
                    boost,
                });
                self.index.index.entry(name.to_string()).or_default();
            }
        }
        self
    }

    /// Index `doc` under its `id`. Re-adding an id replaces its postings and
    /// stored document but keeps its original position.
    pub fn add_document(&mut self, doc: Document) -> Result<()> {
        let reference = doc
            .field(REF_FIELD)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| SearchError::MissingRef(REF_FIELD.to_string()))?
            .to_string();

        if let Some(previous) = self.index.document_store.0.get(&reference).cloned() {
            self.unindex(&reference, &previous);
        }

        for spec in &self.index.fields {
            let terms = self.analyzer.terms(doc.field(&spec.name).unwrap_or_default());
            let field = self.index.index.entry(spec.name.clone()).or_default();
            field
                .lengths
                .insert(reference.clone(), u32::try_from(terms.len()).unwrap_or(u32::MAX));

            let mut counts: BTreeMap<String, u32> = BTreeMap::new();
            for term in terms {
                *counts.entry(term).or_default() += 1;
            }
            for (term, tf) in counts {
                field
                    .postings
                    .entry(term)
                    .or_default()
                    .insert(reference.clone(), tf);
            }
        }

        self.index.document_store.0.insert(reference, doc);
        Ok(())
    }

    /// Remove a document and its postings.
    pub fn remove_document(&mut self, reference: &str) -> Option<Document> {
        let doc = self.index.document_store.0.shift_remove(reference)?;
        self.unindex(reference, &doc);
        Some(doc)
    }

    fn unindex(&mut self, reference: &str, doc: &Document) {
        for spec in &self.index.fields {
            let Some(field) = self.index.index.get_mut(&spec.name) else {
                continue;
            };
            field.lengths.remove(reference);

            let value = doc.field(&spec.name).unwrap_or_default();
            for term in self.analyzer.unique_terms(value) {
                if let Some(postings) = field.postings.get_mut(&term) {
                    postings.remove(reference);
                    if postings.is_empty() {
                        field.postings.remove(&term);
                    }
                }
            }
        }
    }

    /// Number of stored documents.
    pub fn document_count(&self) -> usize {
        self.index.document_count()
    }

    /// Index built so far.
    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    /// Rank the documents added so far.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        self.index.search(&self.analyzer, query)
    }

    /// Structured value of the index built so far.
    pub fn to_structured_value(&self) -> Result<serde_json::Value> {
        self.index.to_structured_value()
    }

    /// Finish building.
    pub fn finish(self) -> SearchIndex {
        info!(
            documents = self.index.document_count(),
            terms = self.index.term_count(),
            "Built search index"
        );
        self.index
    }
}
