use std::path::PathBuf;

use clap::Args;

use crate::cli::{OutputFormat, DEFAULT_DATABASE};
use crate::store::Database;

#[derive(Args)]
pub struct MigrateArgs {
    /// Path to the catalog database (created if missing)
    #[arg(long, env = "GENO_CATALOG_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: PathBuf,
}

/// Open the database, which applies any pending schema migrations
///
/// # Errors
///
/// Returns an error if the file cannot be opened or a migration fails.
pub fn run(args: MigrateArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let existed = args.database.exists();
    if verbose {
        eprintln!(
            "{} {}",
            if existed { "Upgrading" } else { "Creating" },
            args.database.display()
        );
    }

    let db = Database::open(&args.database)?;
    let version = db.schema_version()?;

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "database": args.database.display().to_string(),
                "created": !existed,
                "schema_version": version,
            }))?
        ),
        OutputFormat::Tsv => {
            println!("database\tcreated\tschema_version");
            println!("{}\t{}\t{}", args.database.display(), !existed, version);
        }
        OutputFormat::Text => println!(
            "Catalog database {} is at schema version {version}",
            args.database.display()
        ),
    }

    Ok(())
}
