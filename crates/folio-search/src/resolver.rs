//! Builds the index for a [`SearchIndexNode`], consulting a cache first.

use std::{
    collections::{BTreeMap, HashMap},
    sync::atomic::{AtomicUsize, Ordering},
};

use folio_core::Page;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{
    Result,
    aggregate::SearchIndexNode,
    cache::IndexCache,
    document::{PageIds, page_documents},
    index::{IndexSettings, SearchIndex},
};

/// Page lookup by id.
pub trait PageSource {
    /// The page with id `id`, if known.
    fn page(&self, id: &str) -> Option<&Page>;
}

impl PageSource for [Page] {
    fn page(&self, id: &str) -> Option<&Page> {
        self.iter().find(|p| p.id == id)
    }
}

impl PageSource for Vec<Page> {
    fn page(&self, id: &str) -> Option<&Page> {
        self.as_slice().page(id)
    }
}

impl PageSource for HashMap<String, Page> {
    fn page(&self, id: &str) -> Option<&Page> {
        self.get(id)
    }
}

impl PageSource for BTreeMap<String, Page> {
    fn page(&self, id: &str) -> Option<&Page> {
        self.get(id)
    }
}

/// Build an index from `pages`, in the order given.
///
/// Pure: the same pages and settings always produce the same index. Page ids
/// that are empty, repeated or shaped like section refs are rejected, so
/// every ref in the index stays unique.
pub fn build_index<'a, I>(pages: I, settings: &IndexSettings) -> Result<SearchIndex>
where
    I: IntoIterator<Item = &'a Page>,
{
    let mut builder = settings.builder()?;
    let mut ids = PageIds::new();
    for page in pages {
        ids.insert(&page.id)?;
        for document in page_documents(page) {
            builder.add_document(document)?;
        }
    }
    Ok(builder.finish())
}

/// Resolves a node to its structured index value, building at most once per
/// cache key.
#[derive(Debug)]
pub struct IndexResolver<C> {
    cache: C,
    builds: AtomicUsize,
    build_lock: Mutex<()>,
}

impl<C: IndexCache> IndexResolver<C> {
    /// Resolver over `cache`.
    pub fn new(cache: C) -> Self {
        Self {
            cache,
            builds: AtomicUsize::new(0),
            build_lock: Mutex::new(()),
        }
    }

    /// Backing cache.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Number of indexes actually built (cache misses).
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    fn lookup(&self, key: &str) -> Option<serde_json::Value> {
        match self.cache.get(key) {
            Ok(hit) => hit,
            Err(e) => {
                warn!(key, error = %e, "search index cache lookup failed");
                None
            }
        }
    }

    /// Structured index value for `node`.
    ///
    /// A cached value under the node's key is returned as is. Otherwise the
    /// index is built from the node's pages in id order and stored. Cache
    /// failures are logged and never fail resolution.
    pub fn resolve<P>(&self, node: &SearchIndexNode, pages: &P) -> Result<serde_json::Value>
    where
        P: PageSource + ?Sized,
    {
        let key = node.cache_key();

        if let Some(value) = self.lookup(&key) {
            debug!(key = %key, "search index cache hit");
            return Ok(value);
        }

        let _guard = self.build_lock.lock();
        if let Some(value) = self.lookup(&key) {
            debug!(key = %key, "search index built by a concurrent caller");
            return Ok(value);
        }

        let members = node.pages().iter().filter_map(|id| {
            let page = pages.page(id);
            if page.is_none() {
                warn!(page = %id, "search index member page not found");
            }
            page
        });
        let index = build_index(members, node.settings())?;
        let value = index.to_structured_value()?;
        self.builds.fetch_add(1, Ordering::Relaxed);

        info!(
            key = %key,
            documents = index.document_count(),
            "search index cache miss, built index"
        );

        if let Err(e) = self.cache.set(&key, value.clone()) {
            warn!(key = %key, error = %e, "search index cache store failed");
        }

        Ok(value)
    }
}
