//! Table definitions and schema versioning.
//!
//! The version is tracked in SQLite's `user_version` pragma. Each entry of
//! [`MIGRATIONS`] upgrades the schema by one version.

use rusqlite::Connection;

use crate::store::{StoreError, StoreResult};

/// Schema version this build reads and writes
pub const SCHEMA_VERSION: i64 = 1;

const V1_INITIAL: &str = "
CREATE TABLE IF NOT EXISTS genes (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    symbol           TEXT NOT NULL UNIQUE,
    full_name        TEXT NOT NULL,
    function_summary TEXT NOT NULL,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS genetic_variants (
    id             TEXT PRIMARY KEY,
    gene_id        INTEGER NOT NULL REFERENCES genes(id) ON DELETE CASCADE,
    chromosome     TEXT NOT NULL,
    position       INTEGER NOT NULL CHECK (position >= 0),
    reference_base TEXT NOT NULL,
    alternate_base TEXT NOT NULL,
    impact         TEXT NOT NULL CHECK (impact IN
                       ('Missense', 'Nonsense', 'Frameshift', 'Silent', 'Splice Site', 'Otros')),
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_genetic_variants_gene_id ON genetic_variants(gene_id);

CREATE TABLE IF NOT EXISTS patient_variant_reports (
    id               TEXT PRIMARY KEY,
    patient_id       TEXT NOT NULL,
    variant_id       TEXT NOT NULL REFERENCES genetic_variants(id) ON DELETE CASCADE,
    detection_date   TEXT NOT NULL,
    allele_frequency TEXT NOT NULL,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_patient_variant_reports_patient_id
    ON patient_variant_reports(patient_id);
CREATE INDEX IF NOT EXISTS idx_patient_variant_reports_variant_id
    ON patient_variant_reports(variant_id);
";

/// Ordered upgrade scripts; index `i` upgrades from version `i` to `i + 1`
const MIGRATIONS: &[&str] = &[V1_INITIAL];

/// Version currently recorded in the database (0 for a fresh file)
///
/// # Errors
///
/// Returns an error if the pragma cannot be read.
pub fn current_version(conn: &Connection) -> StoreResult<i64> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

/// Apply every pending migration. Returns the number applied.
///
/// # Errors
///
/// Returns an error if a migration fails, or if the database was written by a
/// newer build.
pub fn migrate(conn: &Connection) -> StoreResult<usize> {
    let from = current_version(conn)?;
    if from > SCHEMA_VERSION {
        return Err(StoreError::CorruptRow {
            table: "schema",
            reason: format!(
                "database schema version {from} is newer than supported version {SCHEMA_VERSION}"
            ),
        });
    }

    let start = usize::try_from(from).unwrap_or_default();
    let pending = &MIGRATIONS[start..];
    for (offset, script) in pending.iter().enumerate() {
        let target = from + i64::try_from(offset).unwrap_or_default() + 1;
        tracing::info!("Migrating catalog schema to version {target}");
        conn.execute_batch(script)?;
        conn.pragma_update(None, "user_version", target)?;
    }

    Ok(pending.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_fresh_database() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(current_version(&conn).unwrap(), 0);
        assert_eq!(migrate(&conn).unwrap(), MIGRATIONS.len());
        assert_eq!(current_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(migrate(&conn).unwrap(), 0);
    }

    #[test]
    fn test_refuses_newer_schema() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1)
            .unwrap();
        assert!(migrate(&conn).is_err());
    }

    #[test]
    fn test_impact_check_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();
        migrate(&conn).unwrap();
        conn.execute(
            "INSERT INTO genes (symbol, full_name, function_summary, created_at, updated_at)
             VALUES ('BRAF', 'B-Raf proto-oncogene', 'Kinase', 't', 't')",
            [],
        )
        .unwrap();

        let bad = conn.execute(
            "INSERT INTO genetic_variants
             (id, gene_id, chromosome, position, reference_base, alternate_base, impact, created_at, updated_at)
             VALUES ('v1', 1, 'chr7', 140753336, 'A', 'T', 'Unknown', 't', 't')",
            [],
        );
        assert!(bad.is_err());
    }
}
