//! Pass-through parser for hand-written HTML pages.

use std::path::Path;

use folio_core::{content::ParsedContent, frontmatter::parse_frontmatter};

/// Parser for `.html` content files.
///
/// The body after the frontmatter block is used verbatim as the page markup.
#[derive(Debug, Clone, Default)]
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser.
    pub fn new() -> Self {
        Self
    }

    /// Split frontmatter from the HTML body.
    pub fn parse(&self, content: &str, path: &Path) -> folio_core::Result<ParsedContent> {
        let (frontmatter, body) = parse_frontmatter(content, path)?;

        Ok(ParsedContent {
            frontmatter,
            html: body.clone(),
            raw: body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_is_kept_verbatim() {
        let parser = HtmlParser::new();
        let parsed = parser
            .parse("<section><p>Hi</p></section>", Path::new("page.html"))
            .unwrap();

        assert!(parsed.frontmatter.title.is_empty());
        assert_eq!(parsed.html, "<section><p>Hi</p></section>");
    }
}
