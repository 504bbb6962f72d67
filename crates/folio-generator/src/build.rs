//! Build orchestration.
//!
//! Collects content, writes one HTML file per page and, when search is
//! enabled, builds the site search index through the cache-aware resolver.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use folio_core::Config;
use folio_search::{
    IndexCache, IndexResolver, IndexSettings, NoCache, SearchError, SearchIndexAccumulator,
    parse_language,
};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    collector::{CollectorError, ContentCollector, SiteContent},
    html::HtmlGenerator,
};

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Collector error.
    #[error("collector error: {0}")]
    Collector(#[from] CollectorError),

    /// Search index error.
    #[error("search index error: {0}")]
    Search(#[from] SearchError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build statistics.
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Number of pages generated.
    pub pages: usize,

    /// Number of drafts left out.
    pub skipped_drafts: usize,

    /// Number of documents in the search index.
    pub search_documents: usize,

    /// Cache key of the search index, if one was produced.
    pub search_index_key: Option<String>,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

/// Site builder that orchestrates the build process.
pub struct Builder {
    config: Config,
    content_dir: PathBuf,
    output_dir: PathBuf,
    resolver: IndexResolver<Arc<dyn IndexCache>>,
}

impl std::fmt::Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("content_dir", &self.content_dir)
            .field("output_dir", &self.output_dir)
            .field("index_builds", &self.resolver.build_count())
            .finish_non_exhaustive()
    }
}

impl Builder {
    /// Create a new builder. The search index is rebuilt on every build.
    #[must_use]
    pub fn new(
        config: Config,
        content_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        let cache: Arc<dyn IndexCache> = Arc::new(NoCache);
        Self {
            config,
            content_dir: content_dir.into(),
            output_dir: output_dir.into(),
            resolver: IndexResolver::new(cache),
        }
    }

    /// Use `cache` for built search indexes, shared across builds.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn IndexCache>) -> Self {
        self.resolver = IndexResolver::new(cache);
        self
    }

    /// Number of search indexes built so far, excluding cache hits.
    pub fn index_builds(&self) -> usize {
        self.resolver.build_count()
    }

    /// Path the serialized search index is written to.
    pub fn search_index_path(&self) -> PathBuf {
        self.output_dir.join(&self.config.search.output_file)
    }

    /// Execute the full build process.
    pub fn build(&self) -> Result<BuildStats> {
        let start = Instant::now();
        let mut stats = BuildStats::default();

        info!(
            content = %self.content_dir.display(),
            output = %self.output_dir.display(),
            "starting build"
        );

        // 1. Reject unusable settings before touching the output
        self.config
            .validate()
            .map_err(|e| BuildError::Config(e.to_string()))?;
        if self.config.search.enabled {
            parse_language(&self.config.search.language)?;
        }

        // 2. Clean output directory
        self.clean_output()?;

        // 3. Collect content
        let collector = ContentCollector::new(self.config.clone(), &self.content_dir);
        let content = collector.collect()?;
        stats.skipped_drafts = content.skipped_drafts;

        // 4. Generate HTML pages
        stats.pages = self.generate_pages(&content)?;

        // 5. Generate the search index
        if self.config.search.enabled {
            let (key, documents) = self.generate_search_index(&content)?;
            stats.search_documents = documents;
            stats.search_index_key = Some(key);
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            pages = stats.pages,
            drafts = stats.skipped_drafts,
            search_documents = stats.search_documents,
            duration_ms = stats.duration_ms,
            "build complete"
        );

        Ok(stats)
    }

    /// Clean the output directory.
    fn clean_output(&self) -> Result<()> {
        if self.output_dir.exists() {
            debug!(dir = %self.output_dir.display(), "cleaning output directory");
            fs::remove_dir_all(&self.output_dir)?;
        }
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// Generate HTML pages for all content.
    fn generate_pages(&self, content: &SiteContent) -> Result<usize> {
        let generator = HtmlGenerator::new(self.config.clone());
        let pages: Vec<_> = content.pages().collect();

        info!(count = pages.len(), "generating HTML pages");

        pages.par_iter().try_for_each(|page| {
            let html = generator.generate_page(page);
            let output_path = generator.output_path(page, &self.output_dir);
            write_file(&output_path, &html)?;
            debug!(path = %output_path.display(), "wrote page");
            Ok::<_, BuildError>(())
        })?;

        Ok(pages.len())
    }

    /// Build the search index and write it next to the pages.
    fn generate_search_index(&self, content: &SiteContent) -> Result<(String, usize)> {
        let accumulator = SearchIndexAccumulator::new(IndexSettings::from(&self.config.search));
        content
            .pages()
            .collect::<Vec<_>>()
            .par_iter()
            .try_for_each(|page| accumulator.append(page))?;

        let node = accumulator.finalize();
        let value = self.resolver.resolve(&node, &content.pages)?;
        let documents = value
            .get("documentStore")
            .and_then(|store| store.as_array())
            .map_or(0, Vec::len);

        let json = serde_json::to_string(&value)
            .map_err(|e| BuildError::Search(SearchError::from(e)))?;
        let path = self.search_index_path();
        write_file(&path, &json)?;

        info!(
            path = %path.display(),
            key = %node.cache_key(),
            documents,
            bytes = json.len(),
            "wrote search index"
        );

        Ok((node.cache_key(), documents))
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}
