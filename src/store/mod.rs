//! Relational storage for the genomic catalog.
//!
//! The catalog lives in a single SQLite database with three tables:
//!
//! | Table                     | Key                 | Parent (cascade)   |
//! |---------------------------|---------------------|--------------------|
//! | `genes`                   | integer, autoincr.  | -                  |
//! | `genetic_variants`        | UUID text           | `genes`            |
//! | `patient_variant_reports` | UUID text           | `genetic_variants` |
//!
//! Access goes through one repository trait per entity ([`GeneRepository`],
//! [`VariantRepository`], [`ReportRepository`]). Repository methods never own
//! a connection: the caller passes the scope in, which is either the shared
//! connection ([`Database::read`]) or an open transaction ([`Database::write`]).
//!
//! ## Example
//!
//! ```rust
//! use geno_catalog::core::gene::NewGene;
//! use geno_catalog::store::{Database, GeneRepository, SqliteGeneRepository};
//!
//! let db = Database::open_in_memory().unwrap();
//! let genes = SqliteGeneRepository;
//!
//! let created = db
//!     .write(|conn| {
//!         genes.insert(
//!             conn,
//!             &NewGene {
//!                 symbol: "TP53".to_string(),
//!                 full_name: "Tumor protein p53".to_string(),
//!                 function_summary: "Tumor suppressor".to_string(),
//!             },
//!         )
//!     })
//!     .unwrap();
//!
//! let found = db.read(|conn| genes.get(conn, created.id)).unwrap();
//! assert_eq!(found.unwrap().symbol, "TP53");
//! ```

pub mod genes;
pub mod reports;
pub mod schema;
pub mod variants;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

pub use genes::{GeneRepository, SqliteGeneRepository};
pub use reports::{ReportRepository, SqliteReportRepository};
pub use variants::{SqliteVariantRepository, VariantRepository};

/// How long a statement waits on a locked database file before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt row in {table}: {reason}")]
    CorruptRow { table: &'static str, reason: String },

    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// True when the failure is a UNIQUE constraint violation
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            Self::Sqlite(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )
    }

    /// True when the failure is a FOREIGN KEY constraint violation
    #[must_use]
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            Self::Sqlite(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
        )
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Handle to the catalog database, cheap to clone and share across handlers
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) a database file and bring its schema up to date
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the schema migration fails.
    pub fn open(path: &Path) -> StoreResult<Self> {
        tracing::debug!("Opening catalog database at {}", path.display());
        Self::init(Connection::open(path)?)
    }

    /// Open a private in-memory database, used by tests and `serve --in-memory`
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite cannot allocate the database or migrate it.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        // Cascading deletes depend on this; SQLite defaults it to off per connection
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        schema::migrate(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Run read-only work against the shared connection
    ///
    /// # Errors
    ///
    /// Propagates the closure's error, or a store error if the connection is unavailable.
    pub fn read<T, E>(&self, f: impl FnOnce(&Connection) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Run work inside one transaction: committed when the closure succeeds,
    /// rolled back when it fails.
    ///
    /// # Errors
    ///
    /// Propagates the closure's error, or a store error if the transaction
    /// cannot be opened or committed.
    pub fn write<T, E>(&self, f: impl FnOnce(&Connection) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(StoreError::from)?;
        let value = f(&tx)?;
        tx.commit().map_err(StoreError::from)?;
        Ok(value)
    }

    /// Check that the database answers a trivial query
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is poisoned or the query fails.
    pub fn ping(&self) -> StoreResult<()> {
        self.read(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map(|_| ())
                .map_err(StoreError::from)
        })
    }

    /// Schema version recorded in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    pub fn schema_version(&self) -> StoreResult<i64> {
        self.read(schema::current_version)
    }
}

/// Current time in the stored timestamp format.
/// Fixed-width microsecond precision keeps text ordering chronological.
pub(crate) fn now() -> (DateTime<Utc>, String) {
    let now = Utc::now().trunc_subsecs(6);
    (now, encode_timestamp(now))
}

pub(crate) fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_timestamp(table: &'static str, value: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StoreError::CorruptRow {
            table,
            reason: format!("bad timestamp '{value}': {e}"),
        })
}

pub(crate) fn decode_uuid(table: &'static str, value: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| StoreError::CorruptRow {
        table,
        reason: format!("bad uuid '{value}': {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory_enables_foreign_keys() {
        let db = Database::open_in_memory().unwrap();
        let enabled: i64 = db
            .read(|conn| {
                conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))
                    .map_err(StoreError::from)
            })
            .unwrap();
        assert_eq!(enabled, 1);
        assert_eq!(db.schema_version().unwrap(), schema::SCHEMA_VERSION);
        assert!(db.ping().is_ok());
    }

    #[test]
    fn test_write_rolls_back_on_error() {
        let db = Database::open_in_memory().unwrap();
        let result: StoreResult<()> = db.write(|conn| {
            conn.execute(
                "INSERT INTO genes (symbol, full_name, function_summary, created_at, updated_at)
                 VALUES ('KRAS', 'KRAS proto-oncogene', 'GTPase', 'x', 'x')",
                [],
            )?;
            Err(StoreError::CorruptRow {
                table: "genes",
                reason: "forced".to_string(),
            })
        });
        assert!(result.is_err());

        let count: i64 = db
            .read(|conn| {
                conn.query_row("SELECT COUNT(*) FROM genes", [], |row| row.get(0))
                    .map_err(StoreError::from)
            })
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_open_file_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");

        {
            let db = Database::open(&path).unwrap();
            db.write(|conn| {
                conn.execute(
                    "INSERT INTO genes (symbol, full_name, function_summary, created_at, updated_at)
                     VALUES ('EGFR', 'Epidermal growth factor receptor', 'Kinase', 'x', 'x')",
                    [],
                )
                .map_err(StoreError::from)
            })
            .unwrap();
        }

        let reopened = Database::open(&path).unwrap();
        let symbol: String = reopened
            .read(|conn| {
                conn.query_row("SELECT symbol FROM genes", [], |row| row.get(0))
                    .map_err(StoreError::from)
            })
            .unwrap();
        assert_eq!(symbol, "EGFR");
    }

    #[test]
    fn test_timestamp_round_trip_and_corruption() {
        let (ts, text) = now();
        assert_eq!(decode_timestamp("genes", &text).unwrap(), ts);
        assert!(matches!(
            decode_timestamp("genes", "yesterday"),
            Err(StoreError::CorruptRow { table: "genes", .. })
        ));
        assert!(decode_uuid("genetic_variants", "nope").is_err());
    }
}
