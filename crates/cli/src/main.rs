//! swcache command line tools.

mod generate;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::generate::{DEFAULT_MAX_SIZE, GenerateOptions};

#[derive(Parser)]
#[command(name = "swcache")]
#[command(version, about = "Offline cache worker tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan project assets and write a precache manifest
    Generate {
        /// Project root to scan
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Output manifest file, relative to the root
        #[arg(long, default_value = "precache-manifest.json")]
        out: PathBuf,

        /// Largest file to include, in bytes
        #[arg(long, default_value_t = DEFAULT_MAX_SIZE)]
        max_size: u64,

        /// Directories to scan, relative to the root
        #[arg(long, num_args = 0.., default_values = ["web", "assets"])]
        scan_paths: Vec<PathBuf>,

        /// Worker TOML config whose embedded precache list is replaced (a
        /// timestamped backup is kept)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { root, out, max_size, scan_paths, config } => {
            let options = GenerateOptions { root, out, max_size, scan_paths, config };
            let report = generate::run(&options)?;
            println!("Wrote {} URLs to {}", report.urls, report.manifest.display());
            if let (Some(config), Some(backup)) = (&report.config, &report.backup) {
                println!("Updated {} (backup at {})", config.display(), backup.display());
            }
        }
    }

    Ok(())
}
