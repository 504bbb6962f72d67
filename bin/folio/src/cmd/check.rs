//! Check command - validate configuration and content

use std::path::Path;

use color_eyre::eyre::{Result, bail};
use folio_core::{Config, ContentType};
use folio_generator::ContentCollector;
use folio_search::{PageIds, parse_language};

/// Validation result.
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
///
/// Validates configuration and renders all content files without writing
/// any output.
pub fn run(config_path: &Path, content_dir: &Path, strict: bool) -> Result<()> {
    tracing::info!(?config_path, ?content_dir, strict, "Checking configuration and content");

    let result = validate(config_path, content_dir);

    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

fn validate(config_path: &Path, content_dir: &Path) -> ValidationResult {
    let mut result = ValidationResult::default();

    println!("Checking configuration...");
    let config = match Config::load_with_env(config_path) {
        Ok(c) => {
            println!("  ✓ Configuration valid");
            c
        }
        Err(e) => {
            result.add_error(format!("Configuration error: {e}"));
            return result;
        }
    };

    if config.search.enabled {
        println!("\nChecking search settings...");
        if let Err(e) = parse_language(&config.search.language) {
            result.add_error(format!("search.language: {e}"));
        }
    }

    if !content_dir.exists() {
        result.add_warning(format!(
            "Content directory {} does not exist",
            content_dir.display()
        ));
        return result;
    }

    println!("\nChecking content files...");
    let search_enabled = config.search.enabled;
    match ContentCollector::new(config, content_dir).collect() {
        Ok(content) => {
            println!(
                "  ✓ {} page(s) rendered ({} markdown, {} html)",
                content.pages.len(),
                content.count_of(ContentType::Markdown),
                content.count_of(ContentType::Html)
            );
            if content.pages.is_empty() {
                result.add_warning("No pages found; the search index will be empty");
            }
            let mut ids = PageIds::new();
            for page in content.pages() {
                if search_enabled {
                    if let Err(e) = ids.insert(&page.id) {
                        result.add_error(format!("{e} ({})", source_of(page)));
                    }
                }
                if page.raw.trim().is_empty() {
                    result.add_warning(format!("Page `{}` has no content to index", page.id));
                } else if page.markup.trim().is_empty() {
                    result.add_warning(format!("Page `{}` renders to empty markup", page.id));
                }
            }
        }
        Err(e) => result.add_error(e.to_string()),
    }

    result
}

fn source_of(page: &folio_core::Page) -> String {
    page.source_path
        .as_deref()
        .map_or_else(|| page.id.clone(), |p| p.display().to_string())
}
