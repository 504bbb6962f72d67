//! Site configuration management.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Main configuration structure for Folio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,

    /// Build settings.
    #[serde(default)]
    pub build: BuildConfig,

    /// Search settings.
    #[serde(default)]
    pub search: SearchConfig,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,

    /// Base URL for the site (e.g., "https://example.com").
    pub base_url: String,

    /// Site description for meta tags.
    #[serde(default)]
    pub description: Option<String>,
}

/// Build configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Output directory for generated site.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Whether to include drafts.
    #[serde(default)]
    pub drafts: bool,
}

/// Search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Whether the search index is generated.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// File name of the serialized index inside the output directory.
    #[serde(default = "default_output_file")]
    pub output_file: String,

    /// Stemmer and stopword language of the analyzer.
    #[serde(default = "default_language")]
    pub language: String,

    /// Weight applied to matches in the `markup` field.
    #[serde(default = "default_boost")]
    pub markup_boost: f64,

    /// Weight applied to matches in the `text` field.
    #[serde(default = "default_boost")]
    pub text_boost: f64,
}

fn default_output_dir() -> String {
    "public".to_string()
}

fn default_true() -> bool {
    true
}

fn default_output_file() -> String {
    "search_index.json".to_string()
}

fn default_language() -> String {
    "english".to_string()
}

fn default_boost() -> f64 {
    1.0
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            drafts: false,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_file: default_output_file(),
            language: default_language(),
            markup_boost: default_boost(),
            text_boost: default_boost(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `FOLIO__`-prefixed environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("FOLIO").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.site.title.is_empty() {
            return Err(CoreError::config("site.title cannot be empty"));
        }

        if self.site.base_url.is_empty() {
            return Err(CoreError::config("site.base_url cannot be empty"));
        }

        if self.site.base_url.ends_with('/') {
            tracing::warn!("site.base_url should not have a trailing slash");
        }

        if self.search.output_file.trim().is_empty() {
            return Err(CoreError::config("search.output_file cannot be empty"));
        }

        for (name, boost) in [
            ("search.markup_boost", self.search.markup_boost),
            ("search.text_boost", self.search.text_boost),
        ] {
            if !(boost.is_finite() && boost > 0.0) {
                return Err(CoreError::config(format!(
                    "{name} must be a positive number, got {boost}"
                )));
            }
        }

        Ok(())
    }

    /// Get the full URL for a path.
    pub fn url_for(&self, path: &str) -> String {
        let base = self.site.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}
