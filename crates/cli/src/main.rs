//! Teakspice CLI - Database migrations and catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! teakspice-cli migrate
//!
//! # Load or update the catalog from a YAML file
//! teakspice-cli seed products data/products.yaml
//!
//! # Same, but first drop products no order refers to
//! teakspice-cli seed products data/products.yaml --replace
//!
//! # Show catalog counts
//! teakspice-cli seed stats
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "teakspice-cli")]
#[command(author, version, about = "Teakspice CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Upsert products from a YAML file (matched by name)
    Products {
        /// Path to the YAML file
        file: PathBuf,

        /// Delete products that are not referenced by any order first
        #[arg(long)]
        replace: bool,
    },
    /// Show product and stock counts
    Stats,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Products { file, replace } => {
                commands::seed::products(&file, replace).await?;
            }
            SeedTarget::Stats => commands::seed::stats().await?,
        },
    }
    Ok(())
}
