//! Command-line interface for geno-catalog.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **serve**: Run the REST service
//! - **migrate**: Create or upgrade a catalog database
//! - **catalog**: Print genes, variants or patient reports from a database
//!
//! ## Usage
//!
//! ```text
//! # Create the database, then serve it
//! geno-catalog migrate --database catalog.db
//! geno-catalog serve --database catalog.db --port 8000
//!
//! # Inspect the catalog from the shell
//! geno-catalog catalog genes --database catalog.db
//! geno-catalog --format tsv catalog reports --patient-id 6f1c2a4e-8d3b-4b6a-9c2d-1e5f7a8b9c0d
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod catalog;
pub mod migrate;

/// Database file used when none is given
pub const DEFAULT_DATABASE: &str = "geno_catalog.db";

#[derive(Parser)]
#[command(name = "geno-catalog")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "REST catalog of genes, genetic variants and patient variant reports")]
#[command(
    long_about = "geno-catalog serves an oncology gene catalog over HTTP.\n\nIt stores genes, the genetic variants registered against them, and the variants detected in patient samples, validating every write and cascading deletes from genes to variants to reports."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST service
    Serve(ServeArgs),

    /// Create or upgrade the catalog database schema
    Migrate(migrate::MigrateArgs),

    /// Print the contents of the catalog
    Catalog(catalog::CatalogArgs),
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, env = "GENO_CATALOG_PORT", default_value = "8000")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, env = "GENO_CATALOG_ADDRESS", default_value = "127.0.0.1")]
    pub address: String,

    /// Path to the catalog database (created if missing)
    #[arg(long, env = "GENO_CATALOG_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: PathBuf,

    /// Keep the catalog in memory instead of on disk; overrides --database
    #[arg(long)]
    pub in_memory: bool,

    /// Allow browser requests from this origin
    #[arg(long, env = "GENO_CATALOG_CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    /// Requests per second allowed per client IP (0 disables rate limiting)
    #[arg(long, default_value = "0")]
    pub rate_limit_per_second: u64,

    /// Burst size for per-IP rate limiting
    #[arg(long, default_value = "50")]
    pub rate_limit_burst: u32,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
