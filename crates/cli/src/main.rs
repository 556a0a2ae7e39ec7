use anyhow::Result;
use clap::{Parser, Subcommand};
use doxsearch_core::{MatchMode, SymbolKind};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "doxsearch")]
#[command(about = "Static symbol index for generated API documentation search", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build search shards from a JSON symbol table
    Build {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long, default_value = "search")]
        out_dir: PathBuf,
        /// Global the shards bind their table to
        #[arg(long)]
        var: Option<String>,
    },
    /// Query every shard of a search directory
    Lookup {
        query: String,
        #[arg(short, long, default_value = "search")]
        dir: PathBuf,
        #[arg(short, long, default_value = "all")]
        section: SymbolKind,
        /// prefix or substring
        #[arg(short, long)]
        mode: Option<MatchMode>,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Validate shard files
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print a shard's table as JSON
    Dump {
        file: PathBuf,
        #[arg(long)]
        var: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, out_dir, var } => commands::build::run(&input, &out_dir, var),
        Commands::Lookup { query, dir, section, mode, limit } => {
            commands::lookup::run(&query, &dir, section, mode, limit)
        },
        Commands::Check { files } => commands::check::run(&files),
        Commands::Dump { file, var } => commands::dump::run(&file, var.as_deref()),
    }
}
