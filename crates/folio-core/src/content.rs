//! Content types and structures.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::frontmatter::Frontmatter;

/// Type of content source.
///
/// The set is closed: every page belongs to exactly one variant, and
/// downstream stages dispatch on it with an exhaustive `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Markdown content (.md files), rendered to HTML at build time.
    Markdown,
    /// Hand-written HTML content (.html files), used verbatim.
    Html,
}

impl ContentType {
    /// Determine content type from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "md" | "markdown" => Some(Self::Markdown),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }

    /// Get the file extension for this content type.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Html => "html",
        }
    }
}

/// Parsed content path with page id and slug extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPath {
    /// Path relative to the content directory.
    pub path: PathBuf,

    /// Stable page identifier, e.g. `posts/hello`. The site root is `index`.
    pub id: String,

    /// URL path for the page, always starting with `/`.
    pub slug: String,

    /// Content type based on extension.
    pub content_type: ContentType,
}

impl ContentPath {
    /// Parse a content path (relative to the content directory).
    ///
    /// - `posts/hello.md` → id: "posts/hello", slug: "/posts/hello"
    /// - `posts/hello/index.md` → id: "posts/hello", slug: "/posts/hello"
    /// - `index.md` → id: "index", slug: "/"
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        let content_type = ContentType::from_extension(extension)?;
        let stem = path.file_stem()?.to_str()?;

        let parent = path.parent().unwrap_or(Path::new(""));
        let raw_id = if stem == "index" {
            parent.to_string_lossy().to_string()
        } else if parent.as_os_str().is_empty() {
            stem.to_string()
        } else {
            format!("{}/{}", parent.display(), stem)
        };

        let canonical = raw_id.replace('\\', "/").trim_matches('/').to_string();
        let (id, slug) = if canonical.is_empty() {
            ("index".to_string(), "/".to_string())
        } else {
            (canonical.clone(), format!("/{canonical}"))
        };

        Some(Self {
            path: path.to_path_buf(),
            id,
            slug,
            content_type,
        })
    }
}

/// Parsed content with metadata and rendered HTML.
#[derive(Debug, Clone)]
pub struct ParsedContent {
    /// Parsed frontmatter metadata.
    pub frontmatter: Frontmatter,

    /// Rendered, sanitized HTML content.
    pub html: String,

    /// Source body without frontmatter.
    pub raw: String,
}

/// A fully processed page.
///
/// Created once per content file; `slug` and `markup` are the derived
/// fields downstream templates and the search index read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Unique page identifier.
    pub id: String,

    /// URL path for this page.
    pub slug: String,

    /// Page title.
    pub title: String,

    /// Page description/summary.
    #[serde(default)]
    pub description: Option<String>,

    /// Publication date.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,

    /// Whether this is a draft.
    #[serde(default)]
    pub draft: bool,

    /// Source format of this page.
    pub content_type: ContentType,

    /// Source body without frontmatter.
    #[serde(default)]
    pub raw: String,

    /// Rendered HTML body.
    pub markup: String,

    /// Source file path.
    #[serde(default)]
    pub source_path: Option<PathBuf>,
}

impl Page {
    /// Create a new page from parsed content and content path.
    ///
    /// Pages without a frontmatter title fall back to their slug.
    pub fn from_parsed(content: ParsedContent, content_path: &ContentPath) -> Self {
        let fm = content.frontmatter;
        let title = if fm.title.trim().is_empty() {
            content_path.slug.clone()
        } else {
            fm.title
        };

        Self {
            id: content_path.id.clone(),
            slug: content_path.slug.clone(),
            title,
            description: fm.description,
            date: fm.date,
            draft: fm.draft,
            content_type: content_path.content_type,
            raw: content.raw,
            markup: content.html,
            source_path: Some(content_path.path.clone()),
        }
    }
}
