//! # semdex CLI
//!
//! The `semdex` binary indexes a markdown documentation corpus into a
//! vector-database artifact and answers natural-language questions
//! against it.
//!
//! ## Usage
//!
//! ```bash
//! semdex --config ./semdex.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `semdex build` | Incrementally index the corpus into the artifact |
//! | `semdex query "<question>"` | Retrieve and format the best-matching passages |
//! | `semdex stats` | Print a summary of the artifact |
//!
//! ## Examples
//!
//! ```bash
//! # Full rebuild, ignoring the prior artifact
//! semdex build --full
//!
//! # See what a build would do without embedding anything
//! semdex build --dry-run
//!
//! # Ask a question, JSON output for scripting
//! semdex query "how do I enable dark mode?" --json
//! ```

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use semdex::progress::ProgressMode;
use semdex::{builder, config, query, stats};

/// Semantic indexing and retrieval engine for static documentation
/// sites.
#[derive(Parser)]
#[command(
    name = "semdex",
    about = "Semantic indexing and retrieval for static documentation sites",
    version,
    long_about = "semdex splits a markdown corpus into heading-aware chunks, embeds them \
    through an external inference engine, and persists a flat vector-database artifact. \
    Queries rank every chunk by exact cosine similarity and format the top passages into \
    a citation-bearing answer."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./semdex.toml")]
    config: PathBuf,

    /// Progress output on stderr: auto, off, human, or json.
    #[arg(long, global = true, default_value = "auto")]
    progress: String,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Index the documentation corpus into the vector database artifact.
    ///
    /// Documents whose content hash matches the prior artifact keep their
    /// cached chunks and embeddings; only changed documents are
    /// re-chunked and re-embedded.
    Build {
        /// Ignore the prior artifact and re-embed everything.
        #[arg(long)]
        full: bool,

        /// Show document and chunk counts without embedding or writing.
        #[arg(long)]
        dry_run: bool,
    },

    /// Ask a question against the indexed corpus.
    ///
    /// Embeds the query, ranks every chunk by cosine similarity, and
    /// prints a formatted answer with source citations.
    Query {
        /// The question to ask.
        query: String,

        /// Number of results to retrieve (defaults to retrieval.top_k).
        #[arg(long)]
        top_k: Option<usize>,

        /// Print the answer object as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Print a summary of the vector database artifact.
    Stats,
}

fn parse_progress_mode(value: &str) -> Result<ProgressMode> {
    match value {
        "auto" => Ok(ProgressMode::default_for_tty()),
        "off" => Ok(ProgressMode::Off),
        "human" => Ok(ProgressMode::Human),
        "json" => Ok(ProgressMode::Json),
        other => bail!("Unknown progress mode: {}. Use auto, off, human, or json.", other),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config(&cli.config)?;
    let mode = parse_progress_mode(&cli.progress)?;

    match cli.command {
        Commands::Build { full, dry_run } => builder::run_build(&config, full, dry_run, mode).await,
        Commands::Query { query, top_k, json } => {
            query::run_query(&config, &query, top_k, json).await
        }
        Commands::Stats => stats::run_stats(&config),
    }
}
