//! Look-aside storage for built index values.

use thiserror::Error;

/// Cache backend failures. Callers treat these as misses, never as fatal.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend could not be reached.
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be encoded or decoded.
    #[error("cache serialization error: {0}")]
    Serialization(String),
}

/// Key/value store for structured index values.
pub trait IndexCache: Send + Sync {
    /// Stored value for `key`, if any.
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: serde_json::Value) -> Result<(), CacheError>;
}

impl<C: IndexCache + ?Sized> IndexCache for std::sync::Arc<C> {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: serde_json::Value) -> Result<(), CacheError> {
        (**self).set(key, value)
    }
}

/// In-process cache shared across threads.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: scc::HashMap<String, serde_json::Value>,
}

impl MemoryCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains(key)
    }
}

impl IndexCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError> {
        Ok(self.entries.read(key, |_, value| value.clone()))
    }

    fn set(&self, key: &str, value: serde_json::Value) -> Result<(), CacheError> {
        self.entries.upsert(key.to_string(), value);
        Ok(())
    }
}

/// Cache that never stores anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl IndexCache for NoCache {
    fn get(&self, _key: &str) -> Result<Option<serde_json::Value>, CacheError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: serde_json::Value) -> Result<(), CacheError> {
        Ok(())
    }
}
