//! Errors raised while loading a site: its `config.toml` and the frontmatter
//! of each content file. Search index failures live in `folio-search`.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Site loading errors.
#[derive(Error, Debug)]
pub enum CoreError {
    /// `config.toml` is missing, unparsable, or holds a rejected value such
    /// as an empty `site.title` or a zero search boost.
    #[error("invalid site configuration: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A content file whose frontmatter block cannot be read, so its title,
    /// date and draft flag are unknown.
    #[error("invalid frontmatter in {path}: {message}")]
    Frontmatter { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Layering the config file with `FOLIO__` environment overrides failed.
    #[error("configuration layering failed: {0}")]
    Layered(#[from] config::ConfigError),
}

impl CoreError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Frontmatter error attributed to the content file at `path`.
    pub fn frontmatter(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Frontmatter {
            path: path.into(),
            message: message.into(),
        }
    }
}
