//! Build command - generates the static site and its search index

use std::{path::Path, time::Instant};

use color_eyre::eyre::{Result, WrapErr};
use folio_core::Config;
use folio_generator::{BuildStats, Builder};

/// Run the build command.
///
/// Builds the static site from content files to the output directory.
pub fn run(config_path: &Path, content: &Path, output: &Path, drafts: bool) -> Result<()> {
    let start = Instant::now();
    tracing::info!(?config_path, ?content, ?output, drafts, "Starting build");

    let config = Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;
    let stats = build_site(config, content, output, drafts)?;

    let duration = start.elapsed();

    println!();
    println!("  Build completed successfully!");
    println!();
    println!("  Pages:      {}", stats.pages);
    println!("  Drafts:     {} skipped", stats.skipped_drafts);
    match &stats.search_index_key {
        Some(key) => {
            println!("  Search:     {} documents", stats.search_documents);
            println!("  Index key:  {key}");
        }
        None => println!("  Search:     disabled"),
    }
    println!();
    println!("  Duration:   {:.2}s", duration.as_secs_f64());
    println!("  Output:     {}", output.display());
    println!();

    tracing::info!(?stats, ?duration, "Build completed successfully");

    Ok(())
}

/// Build with an already loaded configuration.
pub fn build_site(
    mut config: Config,
    content: &Path,
    output: &Path,
    drafts: bool,
) -> Result<BuildStats> {
    config.build.output_dir = output.to_string_lossy().to_string();
    config.build.drafts |= drafts;

    tracing::debug!(?config, "Loaded configuration");

    Builder::new(config, content, output)
        .build()
        .wrap_err("Build failed")
}
