//! Search command - queries a built search index

use std::{fs, path::Path};

use color_eyre::eyre::{Result, WrapErr};
use folio_search::{QueryEngine, SearchResult};

/// Run the search command.
///
/// Loads the serialized index and prints the best matches for `query`.
pub fn run(index_path: &Path, query: &str, limit: usize, json: bool) -> Result<()> {
    let results = search(index_path, query, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results for \"{query}\"");
        return Ok(());
    }

    for (rank, result) in results.iter().enumerate() {
        println!(
            "{:>3}. {} ({:.3})",
            rank + 1,
            result.document.title,
            result.score
        );
        println!("     {}", result.location().href());
        if result.document.is_section() {
            println!("     {}", snippet(&result.document.text, 80));
        }
    }

    Ok(())
}

/// Ranked results for `query`, at most `limit` of them.
pub fn search(index_path: &Path, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
    tracing::info!(?index_path, query, limit, "Searching");

    let json = fs::read_to_string(index_path)
        .wrap_err_with(|| format!("Failed to read search index {}", index_path.display()))?;
    let mut engine = QueryEngine::from_json(json);
    let results = engine
        .search_with_limit(query, limit)
        .wrap_err("Failed to query search index")?;

    Ok(results)
}

fn snippet(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use folio_core::Config;
    use tempfile::TempDir;

    use super::*;
    use crate::cmd::build::build_site;

    fn built_site() -> TempDir {
        let content = TempDir::new().unwrap();
        fs::write(
            content.path().join("hello.md"),
            "---\ntitle: Hello\n---\n\nIntro text\n\nMore words",
        )
        .unwrap();
        let output = TempDir::new().unwrap();
        let config = Config {
            site: folio_core::config::SiteConfig {
                title: "CLI Site".to_string(),
                base_url: "https://example.com".to_string(),
                description: None,
            },
            build: folio_core::config::BuildConfig::default(),
            search: folio_core::config::SearchConfig::default(),
        };
        build_site(config, content.path(), output.path(), false).unwrap();
        output
    }

    #[test]
    fn test_search_built_index() {
        let output = built_site();
        let index = output.path().join("search_index.json");

        let results = search(&index, "intro", 10).unwrap();
        assert_eq!(results[0].document.id, "hello--0");
        assert_eq!(results[0].location().href(), "/hello?elementIndex=0");

        assert_eq!(search(&index, "intro", 1).unwrap().len(), 1);
        assert!(search(&index, "", 10).unwrap().is_empty());
    }

    #[test]
    fn test_missing_index_file() {
        let dir = TempDir::new().unwrap();
        assert!(search(&dir.path().join("nope.json"), "intro", 10).is_err());
    }

    #[test]
    fn test_snippet() {
        assert_eq!(snippet("short", 10), "short");
        assert_eq!(snippet("abcdef", 3), "abc…");
    }
}
