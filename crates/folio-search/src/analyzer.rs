//! Text analysis shared by index construction and querying.
//!
//! Both sides must produce identical terms for identical input, so the
//! analyzer is described by a serializable [`AnalyzerConfig`] that travels
//! inside the index value.

use std::fmt;

use serde::{Deserialize, Serialize};
use tantivy::tokenizer::{
    Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, StopWordFilter,
    TextAnalyzer, TokenStream,
};

use crate::{Result, SearchError};

/// Tokens longer than this are dropped before stemming.
pub const DEFAULT_MAX_TOKEN_LENGTH: usize = 40;

/// Serializable description of the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Stemmer and stopword language, e.g. `"english"`.
    pub language: String,

    /// Maximum token length in bytes.
    #[serde(default = "default_max_token_length")]
    pub max_token_length: usize,
}

fn default_max_token_length() -> usize {
    DEFAULT_MAX_TOKEN_LENGTH
}

impl AnalyzerConfig {
    /// Config for the given language with default limits.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            max_token_length: DEFAULT_MAX_TOKEN_LENGTH,
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::new("english")
    }
}

/// Parses a language name into a tantivy language.
///
/// Only languages with both a stemmer and a stopword list are accepted.
pub fn parse_language(name: &str) -> Result<Language> {
    match name.to_lowercase().as_str() {
        "danish" => Ok(Language::Danish),
        "dutch" => Ok(Language::Dutch),
        "english" => Ok(Language::English),
        "finnish" => Ok(Language::Finnish),
        "french" => Ok(Language::French),
        "german" => Ok(Language::German),
        "hungarian" => Ok(Language::Hungarian),
        "italian" => Ok(Language::Italian),
        "norwegian" => Ok(Language::Norwegian),
        "portuguese" => Ok(Language::Portuguese),
        "russian" => Ok(Language::Russian),
        "spanish" => Ok(Language::Spanish),
        "swedish" => Ok(Language::Swedish),
        _ => Err(SearchError::Analyzer(format!(
            "unsupported language `{name}`"
        ))),
    }
}

/// Tokenizer pipeline: split on non-alphanumerics, lowercase, drop long
/// tokens, drop stopwords, stem.
#[derive(Clone)]
pub struct Analyzer {
    config: AnalyzerConfig,
    inner: TextAnalyzer,
}

impl Analyzer {
    /// Build the pipeline described by `config`.
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        let language = parse_language(&config.language)?;
        let stopwords = StopWordFilter::new(language).ok_or_else(|| {
            SearchError::Analyzer(format!("no stopword list for `{}`", config.language))
        })?;

        let inner = TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(LowerCaser)
            .filter(RemoveLongFilter::limit(config.max_token_length))
            .filter(stopwords)
            .filter(Stemmer::new(language))
            .build();

        Ok(Self { config, inner })
    }

    /// The English pipeline.
    pub fn english() -> Result<Self> {
        Self::new(AnalyzerConfig::default())
    }

    /// Config this analyzer was built from.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze `text` into terms, in order, duplicates kept.
    pub fn terms(&self, text: &str) -> Vec<String> {
        let mut analyzer = self.inner.clone();
        let mut stream = analyzer.token_stream(text);
        let mut terms = Vec::new();
        while let Some(token) = stream.next() {
            terms.push(token.text.clone());
        }
        terms
    }

    /// Analyze `text` into distinct terms, keeping first occurrence order.
    pub fn unique_terms(&self, text: &str) -> Vec<String> {
        let mut terms = self.terms(text);
        let mut seen = std::collections::HashSet::new();
        terms.retain(|t| seen.insert(t.clone()));
        terms
    }
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_stems() {
        let analyzer = Analyzer::english().unwrap();
        let terms = analyzer.terms("Running Parsers");
        assert_eq!(terms, vec!["run", "parser"]);
    }

    #[test]
    fn test_removes_stopwords() {
        let analyzer = Analyzer::english().unwrap();
        let terms = analyzer.terms("the history of a city");
        assert!(!terms.contains(&"the".to_string()));
        assert!(!terms.contains(&"of".to_string()));
        assert!(terms.contains(&"histori".to_string()));
    }

    #[test]
    fn test_splits_markup_on_punctuation() {
        let analyzer = Analyzer::english().unwrap();
        let terms = analyzer.terms("<p>Intro text</p>");
        assert_eq!(terms, vec!["p", "intro", "text", "p"]);
    }

    #[test]
    fn test_drops_long_tokens() {
        let analyzer = Analyzer::new(AnalyzerConfig {
            language: "english".to_string(),
            max_token_length: 5,
        })
        .unwrap();
        assert_eq!(analyzer.terms("cat encyclopedia"), vec!["cat"]);
    }

    #[test]
    fn test_unique_terms_keep_first_occurrence() {
        let analyzer = Analyzer::english().unwrap();
        assert_eq!(
            analyzer.unique_terms("rust crab rust"),
            vec!["rust", "crab"]
        );
    }

    #[test]
    fn test_parse_language() {
        assert!(matches!(parse_language("English"), Ok(Language::English)));
        assert!(matches!(parse_language("german"), Ok(Language::German)));
        assert!(parse_language("klingon").is_err());
    }

    #[test]
    fn test_unsupported_language_is_an_error() {
        let err = Analyzer::new(AnalyzerConfig::new("klingon")).unwrap_err();
        assert!(err.to_string().contains("klingon"));
    }

    #[test]
    fn test_empty_input_has_no_terms() {
        let analyzer = Analyzer::english().unwrap();
        assert!(analyzer.terms("").is_empty());
        assert!(analyzer.terms("  the  and ").is_empty());
    }
}
