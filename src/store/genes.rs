use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::core::gene::{Gene, NewGene};
use crate::core::types::GeneId;
use crate::store::{decode_timestamp, now, StoreResult};

const TABLE: &str = "genes";

const SELECT_GENE: &str = "SELECT id, symbol, full_name, function_summary, created_at, updated_at
     FROM genes";

/// Persistence operations for genes
pub trait GeneRepository: Send + Sync {
    /// All genes, ordered by id
    fn list(&self, conn: &Connection) -> StoreResult<Vec<Gene>>;

    fn get(&self, conn: &Connection, id: GeneId) -> StoreResult<Option<Gene>>;

    /// Exact, case-sensitive symbol lookup
    fn find_by_symbol(&self, conn: &Connection, symbol: &str) -> StoreResult<Option<Gene>>;

    /// Store a new gene and return it with its generated id and timestamps
    fn insert(&self, conn: &Connection, gene: &NewGene) -> StoreResult<Gene>;

    /// Overwrite every mutable column; refreshes `updated_at`
    fn update(&self, conn: &Connection, gene: &Gene) -> StoreResult<Gene>;

    /// Delete a gene and, through the foreign keys, its variants and their reports.
    /// Returns false when no row had that id.
    fn delete(&self, conn: &Connection, id: GeneId) -> StoreResult<bool>;
}

/// [`GeneRepository`] backed by the `genes` table
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteGeneRepository;

/// Raw column values, decoded outside the rusqlite row callback
struct GeneRow {
    id: i64,
    symbol: String,
    full_name: String,
    function_summary: String,
    created_at: String,
    updated_at: String,
}

impl GeneRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            symbol: row.get(1)?,
            full_name: row.get(2)?,
            function_summary: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    fn decode(self) -> StoreResult<Gene> {
        Ok(Gene {
            id: GeneId(self.id),
            symbol: self.symbol,
            full_name: self.full_name,
            function_summary: self.function_summary,
            created_at: decode_timestamp(TABLE, &self.created_at)?,
            updated_at: decode_timestamp(TABLE, &self.updated_at)?,
        })
    }
}

impl GeneRepository for SqliteGeneRepository {
    fn list(&self, conn: &Connection) -> StoreResult<Vec<Gene>> {
        let mut stmt = conn.prepare(&format!("{SELECT_GENE} ORDER BY id"))?;
        let rows = stmt
            .query_map([], GeneRow::read)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(GeneRow::decode).collect()
    }

    fn get(&self, conn: &Connection, id: GeneId) -> StoreResult<Option<Gene>> {
        conn.query_row(
            &format!("{SELECT_GENE} WHERE id = ?1"),
            params![id.0],
            GeneRow::read,
        )
        .optional()?
        .map(GeneRow::decode)
        .transpose()
    }

    fn find_by_symbol(&self, conn: &Connection, symbol: &str) -> StoreResult<Option<Gene>> {
        conn.query_row(
            &format!("{SELECT_GENE} WHERE symbol = ?1"),
            params![symbol],
            GeneRow::read,
        )
        .optional()?
        .map(GeneRow::decode)
        .transpose()
    }

    fn insert(&self, conn: &Connection, gene: &NewGene) -> StoreResult<Gene> {
        let (created_at, stamp) = now();
        conn.execute(
            "INSERT INTO genes (symbol, full_name, function_summary, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![gene.symbol, gene.full_name, gene.function_summary, stamp],
        )?;

        Ok(Gene {
            id: GeneId(conn.last_insert_rowid()),
            symbol: gene.symbol.clone(),
            full_name: gene.full_name.clone(),
            function_summary: gene.function_summary.clone(),
            created_at,
            updated_at: created_at,
        })
    }

    fn update(&self, conn: &Connection, gene: &Gene) -> StoreResult<Gene> {
        let (updated_at, stamp) = now();
        conn.execute(
            "UPDATE genes SET symbol = ?1, full_name = ?2, function_summary = ?3, updated_at = ?4
             WHERE id = ?5",
            params![
                gene.symbol,
                gene.full_name,
                gene.function_summary,
                stamp,
                gene.id.0
            ],
        )?;

        Ok(Gene {
            updated_at,
            ..gene.clone()
        })
    }

    fn delete(&self, conn: &Connection, id: GeneId) -> StoreResult<bool> {
        let removed = conn.execute("DELETE FROM genes WHERE id = ?1", params![id.0])?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Database;

    fn new_gene(symbol: &str) -> NewGene {
        NewGene {
            symbol: symbol.to_string(),
            full_name: format!("{symbol} full name"),
            function_summary: format!("{symbol} summary"),
        }
    }

    #[test]
    fn test_insert_get_list() {
        let db = Database::open_in_memory().unwrap();
        let repo = SqliteGeneRepository;

        let tp53 = db.write(|conn| repo.insert(conn, &new_gene("TP53"))).unwrap();
        let brca1 = db.write(|conn| repo.insert(conn, &new_gene("BRCA1"))).unwrap();
        assert!(brca1.id > tp53.id);

        let fetched = db.read(|conn| repo.get(conn, tp53.id)).unwrap().unwrap();
        assert_eq!(fetched, tp53);

        let all = db.read(|conn| repo.list(conn)).unwrap();
        assert_eq!(
            all.iter().map(|g| g.symbol.as_str()).collect::<Vec<_>>(),
            vec!["TP53", "BRCA1"]
        );

        assert!(db.read(|conn| repo.get(conn, GeneId(999))).unwrap().is_none());
    }

    #[test]
    fn test_find_by_symbol_is_exact() {
        let db = Database::open_in_memory().unwrap();
        let repo = SqliteGeneRepository;
        db.write(|conn| repo.insert(conn, &new_gene("KRAS"))).unwrap();

        assert!(db.read(|conn| repo.find_by_symbol(conn, "KRAS")).unwrap().is_some());
        assert!(db.read(|conn| repo.find_by_symbol(conn, "kras")).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_symbol_is_unique_violation() {
        let db = Database::open_in_memory().unwrap();
        let repo = SqliteGeneRepository;
        db.write(|conn| repo.insert(conn, &new_gene("MYC"))).unwrap();

        let err = db.write(|conn| repo.insert(conn, &new_gene("MYC"))).unwrap_err();
        assert!(err.is_unique_violation());
        assert!(!err.is_foreign_key_violation());
    }

    #[test]
    fn test_update_and_delete() {
        let db = Database::open_in_memory().unwrap();
        let repo = SqliteGeneRepository;
        let mut gene = db.write(|conn| repo.insert(conn, &new_gene("PTEN"))).unwrap();

        gene.full_name = "Phosphatase and tensin homolog".to_string();
        let updated = db.write(|conn| repo.update(conn, &gene)).unwrap();
        assert!(updated.updated_at >= updated.created_at);

        let stored = db.read(|conn| repo.get(conn, gene.id)).unwrap().unwrap();
        assert_eq!(stored.full_name, "Phosphatase and tensin homolog");
        assert_eq!(stored.created_at, gene.created_at);
        assert_eq!(stored.updated_at, updated.updated_at);

        assert!(db.write(|conn| repo.delete(conn, gene.id)).unwrap());
        assert!(!db.write(|conn| repo.delete(conn, gene.id)).unwrap());
    }
}
