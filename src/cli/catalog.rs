use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

use crate::cli::{OutputFormat, DEFAULT_DATABASE};
use crate::schema::{GeneOutput, ReportOutput, VariantOutput};
use crate::service::Catalog;
use crate::store::Database;

#[derive(Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommands,

    /// Path to the catalog database
    #[arg(long, global = true, env = "GENO_CATALOG_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: PathBuf,
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List all genes
    Genes,

    /// List all genetic variants with their gene
    Variants,

    /// List patient variant reports
    Reports {
        /// Only reports for this patient (UUID)
        #[arg(long)]
        patient_id: Option<String>,
    },
}

/// Run a catalog listing command
///
/// # Errors
///
/// Returns an error if the database is missing or cannot be read, or if
/// `--patient-id` is not a UUID.
pub fn run(args: CatalogArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let catalog = open_catalog(&args.database)?;
    if verbose {
        eprintln!("Reading catalog from {}", args.database.display());
    }

    match args.command {
        CatalogCommands::Genes => print_genes(&catalog.genes.list()?, format),
        CatalogCommands::Variants => print_variants(&catalog.variants.list()?, format),
        CatalogCommands::Reports { patient_id } => {
            let reports = match patient_id {
                Some(patient_id) => catalog.reports.list_by_patient(Some(&patient_id))?,
                None => catalog.reports.list()?,
            };
            print_reports(&reports, format)
        }
    }
}

fn open_catalog(path: &Path) -> anyhow::Result<Catalog> {
    if !path.exists() {
        anyhow::bail!(
            "Database {} does not exist (run `geno-catalog migrate` first)",
            path.display()
        );
    }
    Ok(Catalog::new(Database::open(path)?))
}

fn print_genes(genes: &[GeneOutput], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            let symbol_width = genes.iter().map(|g| g.symbol.len()).max().unwrap_or(6).max(6);
            let name_width = genes
                .iter()
                .map(|g| g.full_name.len().min(40))
                .max()
                .unwrap_or(4)
                .max(4);

            println!("Genes ({})\n", genes.len());
            println!(
                "{:>6} {:<sym_w$} {:<name_w$}",
                "ID",
                "Symbol",
                "Name",
                sym_w = symbol_width,
                name_w = name_width
            );
            println!("{}", "-".repeat(6 + symbol_width + name_width + 2));
            for g in genes {
                println!(
                    "{:>6} {:<sym_w$} {:<name_w$}",
                    g.id.0,
                    g.symbol,
                    truncate(&g.full_name, name_width),
                    sym_w = symbol_width,
                    name_w = name_width
                );
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(genes)?),
        OutputFormat::Tsv => {
            println!("id\tsymbol\tfull_name\tfunction_summary");
            for g in genes {
                println!(
                    "{}\t{}\t{}\t{}",
                    g.id,
                    g.symbol,
                    g.full_name,
                    tsv_field(&g.function_summary)
                );
            }
        }
    }
    Ok(())
}

fn print_variants(variants: &[VariantOutput], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("Genetic variants ({})\n", variants.len());
            println!(
                "{:<36} {:<10} {:<18} {:<12} {:<12}",
                "ID", "Gene", "Locus", "Change", "Impact"
            );
            println!("{}", "-".repeat(92));
            for v in variants {
                println!(
                    "{:<36} {:<10} {:<18} {:<12} {:<12}",
                    v.id.to_string(),
                    v.gene_symbol,
                    format!("{}:{}", v.chromosome, v.position),
                    truncate(&format!("{}>{}", v.reference_base, v.alternate_base), 12),
                    v.impact.as_str()
                );
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(variants)?),
        OutputFormat::Tsv => {
            println!("id\tgene_id\tgene_symbol\tchromosome\tposition\treference_base\talternate_base\timpact");
            for v in variants {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    v.id,
                    v.gene_id,
                    v.gene_symbol,
                    v.chromosome,
                    v.position,
                    v.reference_base,
                    v.alternate_base,
                    v.impact
                );
            }
        }
    }
    Ok(())
}

fn print_reports(reports: &[ReportOutput], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("Patient variant reports ({})\n", reports.len());
            println!(
                "{:<36} {:<36} {:<10} {:<10} {:>9}",
                "ID", "Patient", "Detected", "Gene", "VAF"
            );
            println!("{}", "-".repeat(105));
            for r in reports {
                println!(
                    "{:<36} {:<36} {:<10} {:<10} {:>9}",
                    r.id.to_string(),
                    r.patient_id.to_string(),
                    r.detection_date.to_string(),
                    r.gene_symbol,
                    r.allele_frequency
                );
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(reports)?),
        OutputFormat::Tsv => {
            println!("id\tpatient_id\tdetection_date\tallele_frequency\tvariant_id\tgene_symbol\tchromosome\tposition\timpact");
            for r in reports {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    r.id,
                    r.patient_id,
                    r.detection_date,
                    r.allele_frequency,
                    r.variant_id,
                    r.gene_symbol,
                    r.chromosome,
                    r.position,
                    r.impact
                );
            }
        }
    }
    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Tabs and newlines would break the row
fn tsv_field(s: &str) -> String {
    s.replace(['\t', '\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("TP53", 10), "TP53");
        assert_eq!(truncate("Tumor protein p53", 10), "Tumor p...");
        assert_eq!(truncate("ÅÅÅÅÅÅ", 5), "ÅÅ...");
    }

    #[test]
    fn test_tsv_field() {
        assert_eq!(tsv_field("line one\nline\ttwo"), "line one line two");
    }

    #[test]
    fn test_open_catalog_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(open_catalog(&dir.path().join("missing.db")).is_err());
    }
}
