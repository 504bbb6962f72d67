//! Folio CLI
//!
//! Static site generator with a section-level search index.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;

/// Command-line interface for Folio.
#[derive(Parser)]
#[command(
    name = "folio",
    version,
    about = "A static site generator with section-level search"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Build the static site and its search index
    Build {
        /// Content directory
        #[arg(long, default_value = "content")]
        content: PathBuf,
        /// Output directory (defaults to build.output_dir from the config)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Include draft pages
        #[arg(long)]
        drafts: bool,
    },
    /// Query a built search index
    Search {
        /// Query text
        query: String,
        /// Serialized search index
        #[arg(short, long, default_value = "public/search_index.json")]
        index: PathBuf,
        /// Maximum number of results
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate configuration and content
    Check {
        /// Content directory
        #[arg(long, default_value = "content")]
        content: PathBuf,
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    folio::init_tracing(cli.verbose);

    match cli.command {
        Commands::Build {
            content,
            output,
            drafts,
        } => {
            let output = match output {
                Some(output) => output,
                None => folio::Config::load(&cli.config)?.build.output_dir.into(),
            };
            folio::cmd::build::run(&cli.config, &content, &output, drafts)?;
        }
        Commands::Search {
            query,
            index,
            limit,
            json,
        } => {
            folio::cmd::search::run(&index, &query, limit, json)?;
        }
        Commands::Check { content, strict } => {
            folio::cmd::check::run(&cli.config, &content, strict)?;
        }
    }

    Ok(())
}
