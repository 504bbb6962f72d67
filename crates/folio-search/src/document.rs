//! Searchable documents and their references.
//!
//! A page contributes one page document (ref = page id) followed by one
//! section document per top-level body element (ref = `{page id}--{offset}`).

use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use crate::{Result, SearchError};

/// Separator between the page id and the element offset of a section ref.
pub const SECTION_SEPARATOR: &str = "--";

/// Query parameter carrying the element offset in a result location.
pub const ELEMENT_INDEX_PARAM: &str = "elementIndex";

/// A document stored in, and returned from, the search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Page id or section ref.
    pub id: String,

    /// Title of the owning page.
    pub title: String,

    /// HTML of the page body or of the section element.
    pub markup: String,

    /// Text content of the page or section.
    pub text: String,

    /// URL path of the owning page.
    pub slug: String,

    /// Publication date of the owning page as RFC 3339.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Zero-based element offset, present on section documents only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

impl Document {
    /// Value of a named field, used by the index to read fields generically.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "id" => Some(&self.id),
            "title" => Some(&self.title),
            "markup" => Some(&self.markup),
            "text" => Some(&self.text),
            "slug" => Some(&self.slug),
            "date" => self.date.as_deref(),
            _ => None,
        }
    }

    /// Whether this document describes a section rather than a whole page.
    pub fn is_section(&self) -> bool {
        self.offset.is_some()
    }

    /// Parsed reference of this document.
    pub fn reference(&self) -> DocRef {
        DocRef::parse(&self.id)
    }

    /// Where a reader should be sent for this document.
    pub fn location(&self) -> Location {
        let reference = self.reference();
        Location {
            page_id: reference.page_id().to_string(),
            path: self.slug.clone(),
            offset: self.offset.or(reference.offset()),
        }
    }
}

/// Reference to a page or one of its sections.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocRef {
    /// Whole page.
    Page(String),
    /// Top-level body element of a page.
    Section {
        /// Owning page id.
        page_id: String,
        /// Zero-based element offset.
        offset: usize,
    },
}

impl DocRef {
    /// Reference to a section of `page_id`.
    pub fn section(page_id: impl Into<String>, offset: usize) -> Self {
        Self::Section {
            page_id: page_id.into(),
            offset,
        }
    }

    /// Parse a stored ref. Anything not ending in `--{digits}` is a page ref.
    pub fn parse(raw: &str) -> Self {
        let section = raw
            .rsplit_once(SECTION_SEPARATOR)
            .filter(|(page_id, offset)| {
                !page_id.is_empty()
                    && !offset.is_empty()
                    && offset.bytes().all(|b| b.is_ascii_digit())
            })
            .and_then(|(page_id, offset)| Some((page_id, offset.parse::<usize>().ok()?)));

        match section {
            Some((page_id, offset)) => Self::section(page_id, offset),
            None => Self::Page(raw.to_string()),
        }
    }

    /// Id of the page this ref belongs to.
    pub fn page_id(&self) -> &str {
        match self {
            Self::Page(id) => id,
            Self::Section { page_id, .. } => page_id,
        }
    }

    /// Element offset for section refs.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Page(_) => None,
            Self::Section { offset, .. } => Some(*offset),
        }
    }
}

impl fmt::Display for DocRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(id) => f.write_str(id),
            Self::Section { page_id, offset } => {
                write!(f, "{page_id}{SECTION_SEPARATOR}{offset}")
            }
        }
    }
}

/// Navigation target of a search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Owning page id.
    pub page_id: String,
    /// Page URL path.
    pub path: String,
    /// Element to scroll to, for section results.
    pub offset: Option<usize>,
}

impl Location {
    /// Link target: the path, plus `?elementIndex=N` for sections.
    pub fn href(&self) -> String {
        match self.offset {
            Some(offset) => format!("{}?{ELEMENT_INDEX_PARAM}={offset}", self.path),
            None => self.path.clone(),
        }
    }
}

/// Page ids admitted into one index.
///
/// A page id must be non-empty, must not parse as a section ref (otherwise
/// it would collide with `{other}--{n}`) and must not repeat.
#[derive(Debug, Default, Clone)]
pub struct PageIds {
    seen: HashSet<String>,
}

impl PageIds {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `id`, or report why it cannot be a page reference.
    pub fn insert(&mut self, id: &str) -> Result<()> {
        if id.is_empty() || DocRef::parse(id).offset().is_some() {
            return Err(SearchError::InvalidPageId(id.to_string()));
        }
        if !self.seen.insert(id.to_string()) {
            return Err(SearchError::DuplicatePage(id.to_string()));
        }
        Ok(())
    }

    /// Whether `id` has been admitted.
    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Number of admitted ids.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing has been admitted.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(feature = "build")]
pub use self::build::{FieldResolver, MarkdownFields, page_documents, resolver_for};

#[cfg(feature = "build")]
mod build {
    use folio_core::{ContentType, Page};
    use tracing::trace;

    use super::{DocRef, Document};
    use crate::fragment::fragment_html;

    /// Reads the searchable fields of a page of one content type.
    pub trait FieldResolver: Send + Sync {
        /// Page title.
        fn title(&self, page: &Page) -> String;
        /// Rendered body HTML.
        fn markup(&self, page: &Page) -> String;
        /// URL path.
        fn slug(&self, page: &Page) -> String;
        /// Publication date as RFC 3339.
        fn date(&self, page: &Page) -> Option<String> {
            page.date.map(|d| d.to_rfc3339())
        }
    }

    /// Field resolver for rendered Markdown pages.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct MarkdownFields;

    impl FieldResolver for MarkdownFields {
        fn title(&self, page: &Page) -> String {
            page.title.clone()
        }

        fn markup(&self, page: &Page) -> String {
            page.markup.clone()
        }

        fn slug(&self, page: &Page) -> String {
            page.slug.clone()
        }
    }

    /// Resolver for a content type. Types without one are not searchable.
    pub fn resolver_for(content_type: ContentType) -> Option<&'static dyn FieldResolver> {
        match content_type {
            ContentType::Markdown => Some(&MarkdownFields),
            ContentType::Html => None,
        }
    }

    /// Documents contributed by one page: its sections in body order, then
    /// the page itself.
    ///
    /// The page document carries the full body as both `markup` and `text`.
    pub fn page_documents(page: &Page) -> Vec<Document> {
        let Some(resolver) = resolver_for(page.content_type) else {
            trace!(page = %page.id, "content type is not searchable");
            return Vec::new();
        };

        let title = resolver.title(page);
        let markup = resolver.markup(page);
        let slug = resolver.slug(page);
        let date = resolver.date(page);

        let fragments = fragment_html(&markup);
        let mut documents = Vec::with_capacity(fragments.len() + 1);

        for fragment in fragments {
            documents.push(Document {
                id: DocRef::section(page.id.as_str(), fragment.offset).to_string(),
                title: title.clone(),
                markup: fragment.markup,
                text: fragment.text,
                slug: slug.clone(),
                date: date.clone(),
                offset: Some(fragment.offset),
            });
        }

        documents.push(Document {
            id: page.id.clone(),
            title,
            text: markup.clone(),
            markup,
            slug,
            date,
            offset: None,
        });

        documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, slug: &str, offset: Option<usize>) -> Document {
        Document {
            id: id.to_string(),
            title: "T".to_string(),
            markup: String::new(),
            text: String::new(),
            slug: slug.to_string(),
            date: None,
            offset,
        }
    }

    #[test]
    fn test_parse_section_ref() {
        let reference = DocRef::parse("p1--2");
        assert_eq!(reference, DocRef::section("p1", 2));
        assert_eq!(reference.page_id(), "p1");
        assert_eq!(reference.offset(), Some(2));
        assert_eq!(reference.to_string(), "p1--2");
    }

    #[test]
    fn test_parse_page_ref() {
        assert_eq!(DocRef::parse("p1"), DocRef::Page("p1".to_string()));
        assert_eq!(DocRef::parse("a--b"), DocRef::Page("a--b".to_string()));
        assert_eq!(DocRef::parse("--3"), DocRef::Page("--3".to_string()));
        assert_eq!(DocRef::parse("p1--"), DocRef::Page("p1--".to_string()));
    }

    #[test]
    fn test_parse_uses_last_separator() {
        assert_eq!(DocRef::parse("a--b--7"), DocRef::section("a--b", 7));
    }

    #[test]
    fn test_page_ids() {
        let mut ids = PageIds::new();
        ids.insert("a").unwrap();
        ids.insert("a--b").unwrap();
        ids.insert("a--").unwrap();

        assert!(matches!(ids.insert("a"), Err(SearchError::DuplicatePage(_))));
        assert!(matches!(ids.insert("a--1"), Err(SearchError::InvalidPageId(_))));
        assert!(matches!(ids.insert(""), Err(SearchError::InvalidPageId(_))));
        assert!(ids.contains("a--b"));
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_field_lookup() {
        let mut d = doc("p1", "/p1", None);
        d.date = Some("2024-01-01T00:00:00+00:00".to_string());
        assert_eq!(d.field("id"), Some("p1"));
        assert_eq!(d.field("slug"), Some("/p1"));
        assert_eq!(d.field("date"), Some("2024-01-01T00:00:00+00:00"));
        assert_eq!(d.field("nope"), None);
    }

    #[test]
    fn test_location_href() {
        let section = doc("p1--2", "/posts/p1", Some(2));
        assert_eq!(section.location().href(), "/posts/p1?elementIndex=2");
        assert_eq!(section.location().page_id, "p1");

        let page = doc("p1", "/posts/p1", None);
        assert_eq!(page.location().href(), "/posts/p1");
        assert!(!page.is_section());
    }

    #[cfg(feature = "build")]
    mod page_model {
        use chrono::{TimeZone, Utc};
        use folio_core::{ContentType, Page};

        use super::super::*;

        fn page(id: &str, content_type: ContentType, markup: &str) -> Page {
            Page {
                id: id.to_string(),
                slug: format!("/{id}"),
                title: "A".to_string(),
                description: None,
                date: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
                draft: false,
                content_type,
                raw: String::new(),
                markup: markup.to_string(),
                source_path: None,
            }
        }

        #[test]
        fn test_sections_then_page() {
            let markup = "<p>Intro text</p><h2>Section</h2>";
            let docs = page_documents(&page("p1", ContentType::Markdown, markup));

            let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
            assert_eq!(ids, vec!["p1--0", "p1--1", "p1"]);

            assert_eq!(docs[0].text, "Intro text");
            assert_eq!(docs[0].markup, "<p>Intro text</p>");
            assert_eq!(docs[1].markup, "<h2>Section</h2>");

            let page_doc = &docs[2];
            assert_eq!(page_doc.markup, markup);
            assert_eq!(page_doc.text, markup);
            assert_eq!(page_doc.offset, None);
        }

        #[test]
        fn test_sections_copy_page_metadata() {
            let docs = page_documents(&page("p1", ContentType::Markdown, "<p>x</p>"));
            let date = Some("2024-05-01T12:00:00+00:00".to_string());
            for d in &docs {
                assert_eq!(d.title, "A");
                assert_eq!(d.slug, "/p1");
                assert_eq!(d.date, date);
            }
        }

        #[test]
        fn test_plain_text_body_has_only_page_document() {
            let docs = page_documents(&page("p2", ContentType::Markdown, "Hello world"));
            assert_eq!(docs.len(), 1);
            assert_eq!(docs[0].id, "p2");
        }

        #[test]
        fn test_html_pages_contribute_nothing() {
            let docs = page_documents(&page("raw", ContentType::Html, "<p>x</p>"));
            assert!(docs.is_empty());
            assert!(resolver_for(ContentType::Html).is_none());
        }
    }
}
