//! `slotkv`: command-line tooling for slotkv data files.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "slotkv")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert or update a record.
    Put {
        /// Path to the store file; created if it doesn't exist.
        path: PathBuf,
        /// Key, interpreted as raw UTF-8 bytes.
        key: String,
        /// Value, interpreted as raw UTF-8 bytes.
        value: String,
    },

    /// Read a record and print its value to stdout.
    Get {
        path: PathBuf,
        key: String,
    },

    /// Remove a record.
    Delete {
        path: PathBuf,
        key: String,
    },

    /// List every key in the store.
    List { path: PathBuf },

    /// Print header, index, and free-space diagnostics.
    Inspect { path: PathBuf },

    /// Rewrite a store with a larger `max_key_len` into a new file.
    Expand {
        source: PathBuf,
        new_max_key_len: u8,
        destination: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Put { path, key, value } => commands::put::run(&path, key.as_bytes(), value.as_bytes()),
        Commands::Get { path, key } => commands::get::run(&path, key.as_bytes()),
        Commands::Delete { path, key } => commands::delete::run(&path, key.as_bytes()),
        Commands::List { path } => commands::list::run(&path),
        Commands::Inspect { path } => commands::inspect::run(&path),
        Commands::Expand {
            source,
            new_max_key_len,
            destination,
        } => commands::expand::run(&source, new_max_key_len, &destination),
    }
}
