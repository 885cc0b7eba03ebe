//! Cortex CLI: the main entry point.
//!
//! Commands:
//! - `chat`      Interactive chat or single-message mode
//! - `index`     Build the document index from a folder
//! - `retrieve`  Print the passages the retriever would return
//! - `remember`  Save a fact to long-term memory
//! - `recall`    Query long-term memory

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod runtime;
mod spinner;

#[derive(Parser)]
#[command(
    name = "cortex",
    about = "Cortex: a tool-selecting agent with short- and long-term memory",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ~/.cortex/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging and print each turn's steps
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the agent
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Build the document index used by the Retriever
    Index {
        /// Folder of plain-text documents (overrides memory.documents_dir)
        #[arg(short, long)]
        documents: Option<PathBuf>,
    },

    /// Print the top passages for a query
    Retrieve {
        query: String,
    },

    /// Save a fact to long-term memory
    Remember {
        text: String,
    },

    /// Query long-term memory
    Recall {
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so answers on stdout stay clean.
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Chat { message } => commands::chat::run(&config, message, cli.verbose).await?,
        Commands::Index { documents } => commands::index::run(&config, documents).await?,
        Commands::Retrieve { query } => commands::retrieve::run(&config, &query).await?,
        Commands::Remember { text } => commands::memory::remember(&config, &text).await?,
        Commands::Recall { query } => commands::memory::recall(&config, &query).await?,
    }

    Ok(())
}
