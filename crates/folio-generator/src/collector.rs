//! Content collection.
//!
//! Walks the content directory and renders every content file into a page.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use folio_core::{Config, ContentPath, ContentType, Page};
use folio_parser::ParserRegistry;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// Content collection errors.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// IO error.
    #[error("IO error reading {path}: {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Directory traversal error.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Parser error.
    #[error("parse error in {path}: {message}")]
    Parse {
        /// File that failed to render.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// Invalid content path.
    #[error("invalid content path: {0}")]
    InvalidPath(PathBuf),

    /// Two files map to the same page id.
    #[error("page id `{id}` is produced by both {first} and {second}")]
    DuplicateId {
        /// Conflicting id.
        id: String,
        /// File collected first.
        first: PathBuf,
        /// File collected second.
        second: PathBuf,
    },
}

/// Result type for collector operations.
pub type Result<T> = std::result::Result<T, CollectorError>;

/// Collected site content.
#[derive(Debug, Default)]
pub struct SiteContent {
    /// All pages indexed by id.
    pub pages: BTreeMap<String, Page>,

    /// Number of drafts left out.
    pub skipped_drafts: usize,
}

impl SiteContent {
    /// Pages in id order.
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.values()
    }

    /// Number of pages of a content type.
    pub fn count_of(&self, content_type: ContentType) -> usize {
        self.pages
            .values()
            .filter(|p| p.content_type == content_type)
            .count()
    }
}

/// Content collector that walks directories and parses files.
#[derive(Debug)]
pub struct ContentCollector {
    config: Config,
    parser: ParserRegistry,
    content_dir: PathBuf,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

impl ContentCollector {
    /// Create a new content collector.
    #[must_use]
    pub fn new(config: Config, content_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            parser: ParserRegistry::new(),
            content_dir: content_dir.into(),
        }
    }

    /// Collect all content from the content directory.
    ///
    /// Any file that fails to render aborts collection.
    pub fn collect(&self) -> Result<SiteContent> {
        info!(dir = %self.content_dir.display(), "collecting content");

        let files = self.find_content_files()?;
        info!(count = files.len(), "found content files");

        let pages = files
            .par_iter()
            .map(|path| self.parse_file(path))
            .collect::<Result<Vec<_>>>()?;

        let mut content = SiteContent::default();
        for page in pages {
            if page.draft && !self.config.build.drafts {
                debug!(page = %page.id, "skipping draft");
                content.skipped_drafts += 1;
                continue;
            }

            if let Some(existing) = content.pages.get(&page.id) {
                return Err(CollectorError::DuplicateId {
                    id: page.id.clone(),
                    first: existing.source_path.clone().unwrap_or_default(),
                    second: page.source_path.clone().unwrap_or_default(),
                });
            }
            content.pages.insert(page.id.clone(), page);
        }

        info!(
            pages = content.pages.len(),
            drafts = content.skipped_drafts,
            "content collection complete"
        );

        Ok(content)
    }

    /// Find all content files, sorted by path.
    fn find_content_files(&self) -> Result<Vec<PathBuf>> {
        if !self.content_dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.content_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e))
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let is_content = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .and_then(ContentType::from_extension)
                .is_some();
            if is_content {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Parse a single content file into a Page.
    fn parse_file(&self, path: &Path) -> Result<Page> {
        debug!(path = %path.display(), "parsing file");

        let content = fs::read_to_string(path).map_err(|source| CollectorError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let relative_path = path.strip_prefix(&self.content_dir).unwrap_or(path);
        let content_path = ContentPath::from_path(relative_path)
            .ok_or_else(|| CollectorError::InvalidPath(path.to_path_buf()))?;

        let parsed = self
            .parser
            .parse_as(content_path.content_type, &content, path)
            .map_err(|e| CollectorError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let mut page = Page::from_parsed(parsed, &content_path);
        page.source_path = Some(path.to_path_buf());
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn test_config(drafts: bool) -> Config {
        Config {
            site: folio_core::config::SiteConfig {
                title: "Test Site".to_string(),
                base_url: "https://example.com".to_string(),
                description: None,
            },
            build: folio_core::config::BuildConfig {
                drafts,
                ..Default::default()
            },
            search: folio_core::config::SearchConfig::default(),
        }
    }

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_collects_markdown_and_html() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "index.md", "---\ntitle: Home\n---\n\nWelcome");
        write(dir.path(), "posts/hello.md", "# Hello\n\nIntro text");
        write(dir.path(), "legal/imprint.html", "<p>Imprint</p>");
        write(dir.path(), "notes.txt", "ignored");

        let content = ContentCollector::new(test_config(false), dir.path())
            .collect()
            .unwrap();

        let ids: Vec<_> = content.pages.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["index", "legal/imprint", "posts/hello"]);
        assert_eq!(content.pages["index"].slug, "/");
        assert_eq!(content.pages["index"].title, "Home");
        assert!(content.pages["posts/hello"].markup.contains("<p>Intro text</p>"));
        assert_eq!(content.count_of(ContentType::Html), 1);
    }

    #[test]
    fn test_drafts_are_skipped_unless_enabled() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "wip.md", "---\ntitle: WIP\ndraft: true\n---\n\nSoon");

        let skipped = ContentCollector::new(test_config(false), dir.path())
            .collect()
            .unwrap();
        assert!(skipped.pages.is_empty());
        assert_eq!(skipped.skipped_drafts, 1);

        let kept = ContentCollector::new(test_config(true), dir.path())
            .collect()
            .unwrap();
        assert_eq!(kept.pages.len(), 1);
    }

    #[test]
    fn test_render_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "ok.md", "Fine");
        write(dir.path(), "broken.md", "---\ntitle: [unclosed\n---\n\nBody");

        let err = ContentCollector::new(test_config(false), dir.path())
            .collect()
            .unwrap_err();
        assert!(matches!(err, CollectorError::Parse { .. }));
        assert!(err.to_string().contains("broken.md"));
    }

    #[test]
    fn test_conflicting_ids() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "guide.md", "One");
        write(dir.path(), "guide/index.md", "Two");

        let err = ContentCollector::new(test_config(false), dir.path())
            .collect()
            .unwrap_err();
        assert!(matches!(err, CollectorError::DuplicateId { ref id, .. } if id == "guide"));
    }

    #[test]
    fn test_hidden_directories_are_ignored() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".drafts/secret.md", "Hidden");
        write(dir.path(), "visible.md", "Shown");

        let content = ContentCollector::new(test_config(false), dir.path())
            .collect()
            .unwrap();
        assert_eq!(content.pages.len(), 1);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let content = ContentCollector::new(test_config(false), "/nonexistent/content")
            .collect()
            .unwrap();
        assert!(content.pages.is_empty());
    }
}
