//! Frontmatter of content files.
//!
//! The block at the top of a `.md` or `.html` file supplies the page fields
//! the search index stores with every document (`title`, `date`) and the
//! `draft` flag that keeps a page out of both the site and the index. The
//! block is YAML between `---` lines or TOML between `+++` lines; keys folio
//! does not know are ignored.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Page metadata read from frontmatter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Frontmatter {
    /// Result title. Empty means the page falls back to its slug.
    #[serde(default)]
    pub title: String,

    /// Stored on every document of the page and returned with results.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,

    /// Drafts are skipped unless the build includes them.
    #[serde(default)]
    pub draft: bool,

    /// Rendered as the page's description meta tag.
    #[serde(default)]
    pub description: Option<String>,
}

/// Syntax of a frontmatter block, chosen by its fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontmatterFormat {
    Yaml,
    Toml,
}

impl FrontmatterFormat {
    fn from_fence(line: &str) -> Option<Self> {
        match line.trim_end() {
            "---" => Some(Self::Yaml),
            "+++" => Some(Self::Toml),
            _ => None,
        }
    }

    /// Fence line that opens and closes the block.
    pub fn fence(&self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }
}

/// Split content into its frontmatter block and the page body.
///
/// Fences only count on a line of their own, so `---` inside a value or a
/// Markdown rule further down never closes the block. An unclosed block is
/// not frontmatter.
pub fn split_frontmatter(content: &str) -> Option<(FrontmatterFormat, &str, &str)> {
    let content = content.trim_start_matches('\u{feff}').trim_start();
    let (open, rest) = content.split_once('\n')?;
    let format = FrontmatterFormat::from_fence(open)?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == format.fence() {
            let block = rest[..offset].trim();
            let body = rest[offset + line.len()..].trim_start();
            return Some((format, block, body));
        }
        offset += line.len();
    }

    None
}

/// Read the frontmatter of the content file at `path`.
///
/// Content without a frontmatter block yields default metadata and the full
/// content as body. A block that does not deserialize fails the page, and
/// with it the build.
pub fn parse_frontmatter(content: &str, path: &Path) -> Result<(Frontmatter, String)> {
    let Some((format, block, body)) = split_frontmatter(content) else {
        return Ok((Frontmatter::default(), content.to_string()));
    };

    let frontmatter = match format {
        FrontmatterFormat::Yaml if block.is_empty() => Frontmatter::default(),
        FrontmatterFormat::Yaml => {
            serde_yaml::from_str(block).map_err(|e| CoreError::frontmatter(path, e.to_string()))?
        }
        FrontmatterFormat::Toml => {
            toml::from_str(block).map_err(|e| CoreError::frontmatter(path, e.to_string()))?
        }
    };

    Ok((frontmatter, body.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_yaml_sets_indexed_fields() {
        let content = "---\ntitle: \"Borrowing\"\ndate: 2024-01-14T10:00:00Z\ndraft: true\n---\n\nBody text.";

        let (fm, body) = parse_frontmatter(content, Path::new("posts/borrowing.md")).unwrap();

        assert_eq!(fm.title, "Borrowing");
        assert_eq!(
            fm.date,
            Some(Utc.with_ymd_and_hms(2024, 1, 14, 10, 0, 0).unwrap())
        );
        assert!(fm.draft);
        assert_eq!(body, "Body text.");
    }

    #[test]
    fn test_toml_block() {
        let content = "+++\ntitle = \"Imprint\"\ndescription = \"Legal notes\"\n+++\n<p>Legal</p>";

        let (format, block, body) = split_frontmatter(content).unwrap();
        assert_eq!(format, FrontmatterFormat::Toml);
        assert!(block.starts_with("title ="));
        assert_eq!(body, "<p>Legal</p>");

        let (fm, _) = parse_frontmatter(content, Path::new("imprint.html")).unwrap();
        assert_eq!(fm.title, "Imprint");
        assert_eq!(fm.description.as_deref(), Some("Legal notes"));
        assert!(!fm.draft);
    }

    #[test]
    fn test_fence_must_be_its_own_line() {
        let content = "---\ntitle: before---after\n---\nIntro\n\n---\n\nOutro";

        let (fm, body) = parse_frontmatter(content, Path::new("rules.md")).unwrap();

        assert_eq!(fm.title, "before---after");
        assert_eq!(body, "Intro\n\n---\n\nOutro");
    }

    #[test]
    fn test_leading_rule_is_not_frontmatter() {
        let content = "--- not a fence\n\nText";
        assert!(split_frontmatter(content).is_none());

        let unclosed = "---\ntitle: Lost\n\nText";
        let (fm, body) = parse_frontmatter(unclosed, Path::new("lost.md")).unwrap();
        assert!(fm.title.is_empty());
        assert_eq!(body, unclosed);
    }

    #[test]
    fn test_empty_block() {
        let (fm, body) = parse_frontmatter("---\n---\nHello", Path::new("empty.md")).unwrap();
        assert!(fm.title.is_empty());
        assert_eq!(body, "Hello");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let content = "---\ntitle: Tagged\ntags: [rust, search]\nlayout: post\n---\nBody";

        let (fm, _) = parse_frontmatter(content, Path::new("tagged.md")).unwrap();
        assert_eq!(fm.title, "Tagged");
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "Just some content without frontmatter.";

        let (fm, body) = parse_frontmatter(content, Path::new("plain.md")).unwrap();
        assert!(fm.title.is_empty());
        assert!(fm.date.is_none());
        assert_eq!(body, content);
    }

    #[test]
    fn test_bad_date_names_the_file() {
        let content = "---\ntitle: Post\ndate: yesterday\n---\n\nBody";

        let err = parse_frontmatter(content, Path::new("posts/post.md")).unwrap_err();
        assert!(matches!(err, CoreError::Frontmatter { .. }));
        assert!(err.to_string().contains("posts/post.md"));
    }
}
