//! Folio Parser Library
//!
//! Content parsers for Markdown and HTML pages. Each parser turns a source
//! file into frontmatter plus sanitized HTML.

pub mod html;
pub mod markdown;

use std::path::Path;

use folio_core::content::{ContentType, ParsedContent};
pub use html::HtmlParser;
pub use markdown::MarkdownParser;
use thiserror::Error;

/// Parser errors.
#[derive(Debug, Error)]
pub enum ParserError {
    /// Markdown parsing error.
    #[error("markdown error: {0}")]
    Markdown(#[from] markdown::MarkdownError),

    /// HTML page parsing error.
    #[error("html error: {0}")]
    Html(#[from] folio_core::CoreError),

    /// Unknown file extension.
    #[error("unknown file extension: {0}")]
    UnknownExtension(String),
}

/// Result type for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Trait for content parsers.
pub trait ContentParser {
    /// Parse content from a string and file path.
    fn parse(&self, content: &str, path: &Path) -> Result<ParsedContent>;
}

impl ContentParser for MarkdownParser {
    fn parse(&self, content: &str, path: &Path) -> Result<ParsedContent> {
        Ok(self.parse(content, path)?)
    }
}

impl ContentParser for HtmlParser {
    fn parse(&self, content: &str, path: &Path) -> Result<ParsedContent> {
        Ok(self.parse(content, path)?)
    }
}

/// Registry for content parsers with auto-detection.
#[derive(Debug, Default)]
pub struct ParserRegistry {
    markdown: MarkdownParser,
    html: HtmlParser,
}

impl ParserRegistry {
    /// Create a new parser registry with default parsers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry whose Markdown parser passes raw HTML through.
    pub fn with_raw_html() -> Self {
        Self {
            markdown: MarkdownParser::with_raw_html(),
            html: HtmlParser::new(),
        }
    }

    /// Parse content, auto-detecting the parser from file extension.
    pub fn parse(&self, content: &str, path: &Path) -> Result<ParsedContent> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ParserError::UnknownExtension("(none)".to_string()))?;

        match ContentType::from_extension(ext) {
            Some(content_type) => self.parse_as(content_type, content, path),
            None => Err(ParserError::UnknownExtension(ext.to_string())),
        }
    }

    /// Parse content with the parser for a known content type.
    pub fn parse_as(
        &self,
        content_type: ContentType,
        content: &str,
        path: &Path,
    ) -> Result<ParsedContent> {
        match content_type {
            ContentType::Markdown => Ok(self.markdown.parse(content, path)?),
            ContentType::Html => Ok(self.html.parse(content, path)?),
        }
    }

    /// Get the markdown parser.
    pub fn markdown(&self) -> &MarkdownParser {
        &self.markdown
    }
}
