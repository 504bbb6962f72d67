//! The site-wide search index node.
//!
//! Pages are appended while content is collected, possibly from several
//! threads. Finalizing yields an immutable [`SearchIndexNode`] whose id is a
//! digest of every member page and the index settings, so any content change
//! produces a new cache key.

use folio_core::Page;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::{Result, document::PageIds, index::IndexSettings};

#[derive(Debug, Default)]
struct Members {
    ids: PageIds,
    list: Vec<Member>,
}

#[derive(Debug)]
struct Member {
    id: String,
    fingerprint: [u8; 32],
}

fn fingerprint(page: &Page) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in [
        page.id.as_str(),
        page.slug.as_str(),
        page.title.as_str(),
        page.content_type.extension(),
        page.markup.as_str(),
    ] {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    match page.date {
        Some(date) => hasher.update(date.to_rfc3339().as_bytes()),
        None => hasher.update([0u8]),
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Collects member pages of the search index node.
#[derive(Debug)]
pub struct SearchIndexAccumulator {
    settings: IndexSettings,
    members: Mutex<Members>,
}

impl SearchIndexAccumulator {
    /// Empty accumulator for an index built with `settings`.
    pub fn new(settings: IndexSettings) -> Self {
        Self {
            settings,
            members: Mutex::new(Members::default()),
        }
    }

    /// Add a page to the index node.
    ///
    /// Page ids must be non-empty, unique and must not look like section
    /// refs (`{id}--{n}`), since section documents are keyed that way.
    pub fn append(&self, page: &Page) -> Result<()> {
        let member = Member {
            id: page.id.clone(),
            fingerprint: fingerprint(page),
        };

        let mut members = self.members.lock();
        members.ids.insert(&member.id)?;
        debug!(page = %member.id, "appended page to search index node");
        members.list.push(member);
        Ok(())
    }

    /// Number of appended pages.
    pub fn len(&self) -> usize {
        self.members.lock().list.len()
    }

    /// Whether no page has been appended.
    pub fn is_empty(&self) -> bool {
        self.members.lock().list.is_empty()
    }

    /// Freeze the member set.
    pub fn finalize(self) -> SearchIndexNode {
        let mut members = self.members.into_inner().list;
        members.sort_by(|a, b| a.id.cmp(&b.id));

        let mut hasher = Sha256::new();
        let analyzer = &self.settings.analyzer;
        hasher.update(analyzer.language.as_bytes());
        hasher.update((analyzer.max_token_length as u64).to_le_bytes());
        hasher.update(self.settings.markup_boost.to_bits().to_le_bytes());
        hasher.update(self.settings.text_boost.to_bits().to_le_bytes());
        for member in &members {
            hasher.update((member.id.len() as u64).to_le_bytes());
            hasher.update(member.id.as_bytes());
            hasher.update(member.fingerprint);
        }

        SearchIndexNode {
            id: hex::encode(hasher.finalize()),
            settings: self.settings,
            pages: members.into_iter().map(|m| m.id).collect(),
        }
    }
}

/// Immutable set of pages forming one search index.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchIndexNode {
    id: String,
    settings: IndexSettings,
    pages: Vec<String>,
}

impl SearchIndexNode {
    /// Content-derived identity.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Member page ids, sorted.
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    /// Settings the index is built with.
    pub fn settings(&self) -> &IndexSettings {
        &self.settings
    }

    /// Cache key of the built index.
    pub fn cache_key(&self) -> String {
        format!("{}:index", self.id)
    }
}
