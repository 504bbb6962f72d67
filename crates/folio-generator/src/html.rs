//! HTML generation from parsed content.
//!
//! Every page is written as a minimal document whose `<body>` holds the
//! page markup and nothing else, so the top-level body elements line up
//! with the section offsets recorded in the search index.

use std::path::{Path, PathBuf};

use folio_core::{Config, Page};
use tracing::debug;

/// HTML page generator.
#[derive(Debug)]
pub struct HtmlGenerator {
    config: Config,
}

impl HtmlGenerator {
    /// Create a new HTML generator with the given configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Generate HTML for a page.
    pub fn generate_page(&self, page: &Page) -> String {
        debug!(page = %page.id, "generating HTML for page");

        let title = if page.title.is_empty() || page.slug == "/" {
            escape_html(&self.config.site.title)
        } else {
            format!(
                "{} | {}",
                escape_html(&page.title),
                escape_html(&self.config.site.title)
            )
        };

        let description = page
            .description
            .as_deref()
            .or(self.config.site.description.as_deref())
            .map(|d| format!("<meta name=\"description\" content=\"{}\">", escape_html(d)))
            .unwrap_or_default();

        let search_meta = if self.config.search.enabled {
            format!(
                "<meta name=\"folio-search-index\" content=\"{}\">",
                escape_html(&format!("/{}", self.config.search.output_file))
            )
        } else {
            String::new()
        };

        format!(
            "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title>\
             {description}<link rel=\"canonical\" href=\"{canonical}\">{search_meta}</head>\
             <body>{body}</body></html>\n",
            canonical = escape_html(&self.config.url_for(&page.slug)),
            body = page.markup,
        )
    }

    /// Get the output file path for a page.
    pub fn output_path(&self, page: &Page, output_dir: &Path) -> PathBuf {
        let relative = page.slug.trim_start_matches('/');

        if relative.is_empty() {
            output_dir.join("index.html")
        } else {
            output_dir.join(relative).join("index.html")
        }
    }
}

/// Escape text for use in HTML content and attribute values.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use folio_core::ContentType;
    use folio_search::fragment_html;

    use super::*;

    fn test_config() -> Config {
        Config {
            site: folio_core::config::SiteConfig {
                title: "Test Site".to_string(),
                base_url: "https://example.com".to_string(),
                description: Some("A test site".to_string()),
            },
            build: folio_core::config::BuildConfig::default(),
            search: folio_core::config::SearchConfig::default(),
        }
    }

    fn test_page(slug: &str, markup: &str) -> Page {
        Page {
            id: slug.trim_start_matches('/').to_string(),
            slug: slug.to_string(),
            title: "Tom & Jerry".to_string(),
            description: None,
            date: None,
            draft: false,
            content_type: ContentType::Markdown,
            raw: String::new(),
            markup: markup.to_string(),
            source_path: None,
        }
    }

    #[test]
    fn test_generate_page() {
        let generator = HtmlGenerator::new(test_config());
        let html = generator.generate_page(&test_page("/posts/hello", "<p>Hi</p>"));

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Tom &amp; Jerry | Test Site</title>"));
        assert!(html.contains("content=\"A test site\""));
        assert!(html.contains("href=\"https://example.com/posts/hello\""));
        assert!(html.contains("<body><p>Hi</p></body>"));
        assert!(html.contains("content=\"/search_index.json\""));
    }

    #[test]
    fn test_body_children_match_markup_fragments() {
        let markup = "<h1>Title</h1><p>One</p><ul><li>Two</li></ul>";
        let generator = HtmlGenerator::new(test_config());
        let html = generator.generate_page(&test_page("/doc", markup));

        assert_eq!(fragment_html(&html), fragment_html(markup));
    }

    #[test]
    fn test_output_path() {
        let generator = HtmlGenerator::new(test_config());
        let out = Path::new("/out");

        assert_eq!(
            generator.output_path(&test_page("/", ""), out),
            PathBuf::from("/out/index.html")
        );
        assert_eq!(
            generator.output_path(&test_page("/posts/hello", ""), out),
            PathBuf::from("/out/posts/hello/index.html")
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">'&'</a>"),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }
}
