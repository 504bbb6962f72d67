//! Markdown parser using pulldown-cmark.

use std::path::Path;

use folio_core::{content::ParsedContent, frontmatter::parse_frontmatter};
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use thiserror::Error;

/// Markdown parsing errors.
#[derive(Debug, Error)]
pub enum MarkdownError {
    /// Failed to parse frontmatter.
    #[error("frontmatter error: {0}")]
    Frontmatter(#[from] folio_core::error::CoreError),
}

/// Result type for markdown operations.
pub type Result<T> = std::result::Result<T, MarkdownError>;

/// Markdown parser producing sanitized HTML.
#[derive(Debug, Clone)]
pub struct MarkdownParser {
    options: Options,
    allow_raw_html: bool,
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Heading being rendered: level, explicit id, plain text and inner HTML.
struct OpenHeading {
    level: u8,
    explicit_id: Option<String>,
    text: String,
    html: String,
}

/// Image being rendered: its alt text arrives as nested text events.
struct OpenImage {
    src: String,
    title: String,
    alt: String,
}

impl MarkdownParser {
    /// Create a new markdown parser with default options.
    ///
    /// Raw HTML in the source is escaped.
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        Self {
            options,
            allow_raw_html: false,
        }
    }

    /// Create a parser that passes raw HTML blocks and inline HTML through.
    pub fn with_raw_html() -> Self {
        Self {
            allow_raw_html: true,
            ..Self::new()
        }
    }

    /// Parse markdown content with frontmatter.
    pub fn parse(&self, content: &str, path: &Path) -> Result<ParsedContent> {
        let (frontmatter, body) = parse_frontmatter(content, path)?;
        let html = self.render_markdown(&body);

        Ok(ParsedContent {
            frontmatter,
            html,
            raw: body,
        })
    }

    /// Parse markdown without frontmatter (body only).
    pub fn parse_body(&self, body: &str) -> String {
        self.render_markdown(body)
    }

    /// Render markdown to HTML. Headings get an `id` anchor: the explicit
    /// `{#id}` attribute, or a slug of their text.
    fn render_markdown(&self, content: &str) -> String {
        let parser = Parser::new_ext(content, self.options);
        let mut out = String::new();
        let mut heading: Option<OpenHeading> = None;
        let mut image: Option<OpenImage> = None;
        let mut code_block: Option<Option<String>> = None;
        let mut code_block_content = String::new();

        for event in parser {
            if let Some(img) = image.as_mut() {
                match &event {
                    Event::Text(text) | Event::Code(text) => {
                        img.alt.push_str(text);
                        continue;
                    }
                    Event::End(TagEnd::Image) => {}
                    _ => continue,
                }
            }

            let html = match heading.as_mut() {
                Some(open) => &mut open.html,
                None => &mut out,
            };

            match event {
                Event::Start(Tag::Heading { level, id, .. }) => {
                    heading = Some(OpenHeading {
                        level: level as u8,
                        explicit_id: id.map(|i| i.to_string()),
                        text: String::new(),
                        html: String::new(),
                    });
                }

                Event::End(TagEnd::Heading(_)) => {
                    if let Some(open) = heading.take() {
                        let id = open.explicit_id.unwrap_or_else(|| slugify(&open.text));
                        out.push_str(&format!(
                            "<h{lvl} id=\"{id}\">{inner}</h{lvl}>\n",
                            lvl = open.level,
                            id = html_escape(&id),
                            inner = open.html,
                        ));
                    }
                }

                Event::Start(Tag::CodeBlock(kind)) => {
                    code_block = Some(match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                        _ => None,
                    });
                    code_block_content.clear();
                }

                Event::End(TagEnd::CodeBlock) => {
                    let class = code_block
                        .take()
                        .flatten()
                        .map(|lang| format!(" class=\"language-{}\"", html_escape(&lang)))
                        .unwrap_or_default();
                    html.push_str(&format!(
                        "<pre><code{class}>{}</code></pre>\n",
                        html_escape(&code_block_content)
                    ));
                    code_block_content.clear();
                }

                Event::Text(text) if code_block.is_some() => {
                    code_block_content.push_str(&text);
                }

                Event::Text(text) => {
                    html.push_str(&html_escape(&text));
                    if let Some(open) = heading.as_mut() {
                        open.text.push_str(&text);
                    }
                }

                Event::Code(code) => {
                    html.push_str(&format!("<code>{}</code>", html_escape(&code)));
                    if let Some(open) = heading.as_mut() {
                        open.text.push_str(&code);
                    }
                }

                Event::Start(Tag::Image {
                    dest_url, title, ..
                }) => {
                    image = Some(OpenImage {
                        src: safe_url(&dest_url),
                        title: title.to_string(),
                        alt: String::new(),
                    });
                }

                Event::End(TagEnd::Image) => {
                    if let Some(img) = image.take() {
                        let title_attr = if img.title.is_empty() {
                            String::new()
                        } else {
                            format!(" title=\"{}\"", html_escape(&img.title))
                        };
                        html.push_str(&format!(
                            "<img src=\"{}\" alt=\"{}\"{title_attr} />",
                            html_escape(&img.src),
                            html_escape(&img.alt)
                        ));
                    }
                }

                Event::SoftBreak => html.push('\n'),

                Event::HardBreak => html.push_str("<br />\n"),

                Event::Start(tag) => html.push_str(&tag_to_html_start(&tag)),

                Event::End(tag) => html.push_str(&tag_to_html_end(&tag)),

                Event::Html(raw) | Event::InlineHtml(raw) => {
                    if self.allow_raw_html {
                        html.push_str(&raw);
                    } else {
                        html.push_str(&html_escape(&raw));
                    }
                }

                Event::FootnoteReference(name) => {
                    let name = html_escape(&name);
                    html.push_str(&format!(
                        "<sup class=\"footnote-ref\"><a href=\"#fn-{name}\">[{name}]</a></sup>"
                    ));
                }

                Event::Rule => html.push_str("<hr />\n"),

                Event::TaskListMarker(checked) => {
                    html.push_str(if checked {
                        "<input type=\"checkbox\" checked disabled />"
                    } else {
                        "<input type=\"checkbox\" disabled />"
                    });
                }

                Event::InlineMath(math) => {
                    html.push_str(&format!(
                        "<span class=\"math inline\">\\({}\\)</span>",
                        html_escape(&math)
                    ));
                }

                Event::DisplayMath(math) => {
                    html.push_str(&format!(
                        "<div class=\"math display\">\\[{}\\]</div>",
                        html_escape(&math)
                    ));
                }
            }
        }

        out
    }
}

/// Convert a pulldown-cmark tag to HTML opening tag.
fn tag_to_html_start(tag: &Tag) -> String {
    match tag {
        Tag::Paragraph => "<p>".to_string(),
        Tag::Heading { level, .. } => format!("<h{}>", *level as u8),
        Tag::BlockQuote(_) => "<blockquote>\n".to_string(),
        Tag::CodeBlock(_) => String::new(),
        Tag::List(Some(1)) => "<ol>\n".to_string(),
        Tag::List(Some(start)) => format!("<ol start=\"{start}\">\n"),
        Tag::List(None) => "<ul>\n".to_string(),
        Tag::Item => "<li>".to_string(),
        Tag::FootnoteDefinition(name) => {
            format!("<div class=\"footnote\" id=\"fn-{}\">", html_escape(name))
        }
        Tag::Table(_) => "<table>".to_string(),
        Tag::TableHead => "<thead><tr>".to_string(),
        Tag::TableRow => "<tr>".to_string(),
        Tag::TableCell => "<td>".to_string(),
        Tag::Emphasis => "<em>".to_string(),
        Tag::Strong => "<strong>".to_string(),
        Tag::Strikethrough => "<del>".to_string(),
        Tag::Link {
            dest_url, title, ..
        } => {
            let title_attr = if title.is_empty() {
                String::new()
            } else {
                format!(" title=\"{}\"", html_escape(title))
            };
            format!(
                "<a href=\"{}\"{title_attr}>",
                html_escape(&safe_url(dest_url))
            )
        }
        Tag::Image { .. } => String::new(),
        Tag::HtmlBlock => String::new(),
        Tag::MetadataBlock(_) => String::new(),
        Tag::DefinitionList => "<dl>\n".to_string(),
        Tag::DefinitionListTitle => "<dt>".to_string(),
        Tag::DefinitionListDefinition => "<dd>".to_string(),
        Tag::Superscript => "<sup>".to_string(),
        Tag::Subscript => "<sub>".to_string(),
    }
}

/// Convert a pulldown-cmark tag end to HTML closing tag.
fn tag_to_html_end(tag: &TagEnd) -> String {
    match tag {
        TagEnd::Paragraph => "</p>\n".to_string(),
        TagEnd::Heading(level) => format!("</h{}>\n", *level as u8),
        TagEnd::BlockQuote(_) => "</blockquote>\n".to_string(),
        TagEnd::CodeBlock => String::new(),
        TagEnd::List(true) => "</ol>\n".to_string(),
        TagEnd::List(false) => "</ul>\n".to_string(),
        TagEnd::Item => "</li>\n".to_string(),
        TagEnd::FootnoteDefinition => "</div>\n".to_string(),
        TagEnd::Table => "</table>\n".to_string(),
        TagEnd::TableHead => "</tr></thead>\n".to_string(),
        TagEnd::TableRow => "</tr>\n".to_string(),
        TagEnd::TableCell => "</td>".to_string(),
        TagEnd::Emphasis => "</em>".to_string(),
        TagEnd::Strong => "</strong>".to_string(),
        TagEnd::Strikethrough => "</del>".to_string(),
        TagEnd::Link => "</a>".to_string(),
        TagEnd::Image => String::new(),
        TagEnd::HtmlBlock => String::new(),
        TagEnd::MetadataBlock(_) => String::new(),
        TagEnd::DefinitionList => "</dl>\n".to_string(),
        TagEnd::DefinitionListTitle => "</dt>\n".to_string(),
        TagEnd::DefinitionListDefinition => "</dd>\n".to_string(),
        TagEnd::Superscript => "</sup>".to_string(),
        TagEnd::Subscript => "</sub>".to_string(),
    }
}

/// Neutralize script-capable URL schemes.
fn safe_url(url: &CowStr) -> String {
    let lower = url.trim_start().to_ascii_lowercase();
    let scriptable = ["javascript:", "vbscript:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme));

    if scriptable && !lower.starts_with("data:image/") {
        "#".to_string()
    } else {
        url.to_string()
    }
}

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Convert text to a URL-safe slug.
fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_markdown() {
        let parser = MarkdownParser::new();
        let content = r#"---
title: "Test Post"
---

# Hello World

This is a test."#;

        let result = parser.parse(content, Path::new("test.md")).unwrap();

        assert_eq!(result.frontmatter.title, "Test Post");
        assert!(result.html.contains("<h1 id=\"hello-world\">Hello World</h1>"));
        assert!(result.html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_parse_code_block() {
        let parser = MarkdownParser::new();
        let html = parser.parse_body(
            r#"```rust
fn main() {
    println!("<hi>");
}
```"#,
        );

        assert!(html.contains("<pre><code class=\"language-rust\">"));
        assert!(html.contains("&lt;hi&gt;"));
    }

    #[test]
    fn test_indented_code_block() {
        let parser = MarkdownParser::new();
        let html = parser.parse_body("Intro\n\n    let x = 1;\n");

        assert!(html.contains("<pre><code>let x = 1;\n</code></pre>"));
    }

    #[test]
    fn test_heading_anchors() {
        let parser = MarkdownParser::new();
        let html = parser.parse_body(
            r#"# Heading 1
## Heading `two`
### Heading 3 {#custom}"#,
        );

        assert!(html.contains("<h1 id=\"heading-1\">Heading 1</h1>"));
        assert!(html.contains("<h2 id=\"heading-two\">Heading <code>two</code></h2>"));
        assert!(html.contains("<h3 id=\"custom\">"));
    }

    #[test]
    fn test_raw_html_is_escaped_by_default() {
        let parser = MarkdownParser::new();
        let html = parser.parse_body("<script>alert(1)</script>\n\nText");

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_raw_html_allowed() {
        let parser = MarkdownParser::with_raw_html();
        let html = parser.parse_body("<div class=\"note\">kept</div>\n");

        assert!(html.contains("<div class=\"note\">kept</div>"));
    }

    #[test]
    fn test_javascript_links_are_neutralized() {
        let parser = MarkdownParser::new();
        let html = parser.parse_body("[click](javascript:alert(1)) [ok](https://example.com)");

        assert!(html.contains("<a href=\"#\">click</a>"));
        assert!(html.contains("<a href=\"https://example.com\">ok</a>"));
    }

    #[test]
    fn test_image_alt_text() {
        let parser = MarkdownParser::new();
        let html = parser.parse_body("![A *small* cat](cat.png \"Cat\")");

        assert!(html.contains("<img src=\"cat.png\" alt=\"A small cat\" title=\"Cat\" />"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Test 123 Post"), "test-123-post");
        assert_eq!(slugify("Multiple   Spaces"), "multiple-spaces");
        assert_eq!(slugify("Special!@#Chars"), "specialchars");
    }

    #[test]
    fn test_table_rendering() {
        let parser = MarkdownParser::new();
        let html = parser.parse_body(
            r#"| Header 1 | Header 2 |
|----------|----------|
| Cell 1   | Cell 2   |"#,
        );

        assert!(html.contains("<table>"));
        assert!(html.contains("<thead>"));
        assert!(html.contains("<td>"));
    }

    #[test]
    fn test_task_list() {
        let parser = MarkdownParser::new();
        let html = parser.parse_body(
            r#"- [x] Done
- [ ] Not done"#,
        );

        assert!(html.contains("checkbox"));
        assert!(html.contains("checked"));
    }

    #[test]
    fn test_no_frontmatter() {
        let parser = MarkdownParser::new();
        let content = "# Just Content\n\nNo frontmatter here.";
        let result = parser.parse(content, Path::new("test.md")).unwrap();

        assert!(result.frontmatter.title.is_empty());
        assert!(result.html.contains("Just Content"));
    }

    #[test]
    fn test_broken_frontmatter_fails() {
        let parser = MarkdownParser::new();
        let content = "---\ntitle: [oops\n---\n\nBody";

        assert!(parser.parse(content, Path::new("broken.md")).is_err());
    }
}
