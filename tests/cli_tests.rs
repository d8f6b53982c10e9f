//! Command-Line Interface Tests
//!
//! Runs the compiled binary against temporary database files.

use assert_cmd::Command;
use predicates::prelude::*;

use geno_catalog::schema::{GeneInput, ReportInput, VariantInput};
use geno_catalog::service::Catalog;
use geno_catalog::store::Database;

const PATIENT: &str = "6f1c2a4e-8d3b-4b6a-9c2d-1e5f7a8b9c0d";

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("geno-catalog").unwrap();
    cmd.env_remove("GENO_CATALOG_DATABASE").env_remove("RUST_LOG");
    cmd
}

/// Create a database holding TP53, one variant and one report
fn seeded_database(path: &std::path::Path) {
    let catalog = Catalog::new(Database::open(path).unwrap());
    let gene = catalog
        .genes
        .create(GeneInput {
            symbol: Some(Some("TP53".to_string())),
            full_name: Some(Some("Tumor protein p53".to_string())),
            function_summary: Some(Some("Tumor suppressor".to_string())),
        })
        .unwrap();
    let variant = catalog
        .variants
        .create(VariantInput {
            gene_id: Some(Some(serde_json::json!(gene.id.0))),
            chromosome: Some(Some("chr17".to_string())),
            position: Some(Some(serde_json::json!(7_673_802))),
            reference_base: Some(Some("G".to_string())),
            alternate_base: Some(Some("A".to_string())),
            impact: Some(Some("Missense".to_string())),
        })
        .unwrap();
    catalog
        .reports
        .create(ReportInput {
            patient_id: Some(Some(PATIENT.to_string())),
            variant_id: Some(Some(variant.id.to_string())),
            detection_date: Some(Some("2024-03-01".to_string())),
            allele_frequency: Some(Some(serde_json::json!(0.25))),
        })
        .unwrap();
}

#[test]
fn test_migrate_creates_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");

    cli()
        .args(["migrate", "--database"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("schema version 1"));
    assert!(path.exists());

    // Running it again is a no-op
    cli()
        .args(["--format", "json", "migrate", "--database"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"created\": false"));
}

#[test]
fn test_catalog_genes_text_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");
    seeded_database(&path);

    cli()
        .args(["catalog", "genes", "--database"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Genes (1)").and(predicate::str::contains("TP53")));

    let output = cli()
        .args(["--format", "json", "catalog", "genes", "--database"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let genes: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(genes[0]["symbol"], "TP53");
    assert_eq!(genes[0]["full_name"], "Tumor protein p53");
}

#[test]
fn test_catalog_variants_tsv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");
    seeded_database(&path);

    cli()
        .args(["--format", "tsv", "catalog", "variants", "--database"])
        .arg(&path)
        .assert()
        .success()
        .stdout(
            predicate::str::starts_with("id\tgene_id\tgene_symbol")
                .and(predicate::str::contains("\tTP53\tchr17\t7673802\tG\tA\tMissense")),
        );
}

#[test]
fn test_catalog_reports_by_patient() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");
    seeded_database(&path);

    cli()
        .args(["--format", "tsv", "catalog", "reports", "--patient-id", PATIENT, "--database"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("0.2500").and(predicate::str::contains(PATIENT)));

    cli()
        .args(["catalog", "reports", "--patient-id", "someone", "--database"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("patient_id"));
}

#[test]
fn test_catalog_missing_database_fails() {
    let dir = tempfile::tempdir().unwrap();
    cli()
        .args(["catalog", "genes", "--database"])
        .arg(dir.path().join("absent.db"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}
