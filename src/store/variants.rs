use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::core::types::{GeneId, Impact, VariantId};
use crate::core::variant::{GeneSummary, GeneticVariant, NewVariant, VariantDetail};
use crate::store::{decode_timestamp, decode_uuid, now, StoreError, StoreResult};

const TABLE: &str = "genetic_variants";

/// Variant columns followed by the owning gene's symbol and name.
/// Report queries select the same columns after their own, see [`VariantRow::read_at`].
pub(crate) const VARIANT_COLUMNS: &str = "v.id, v.gene_id, v.chromosome, v.position, \
     v.reference_base, v.alternate_base, v.impact, v.created_at, v.updated_at, \
     g.symbol, g.full_name";

const SELECT_VARIANT: &str = "FROM genetic_variants v JOIN genes g ON g.id = v.gene_id";

/// Persistence operations for genetic variants
pub trait VariantRepository: Send + Sync {
    /// All variants joined with their gene, in insertion order
    fn list(&self, conn: &Connection) -> StoreResult<Vec<VariantDetail>>;

    fn get(&self, conn: &Connection, id: VariantId) -> StoreResult<Option<VariantDetail>>;

    fn insert(&self, conn: &Connection, variant: &NewVariant) -> StoreResult<GeneticVariant>;

    /// Overwrite every mutable column; refreshes `updated_at`
    fn update(&self, conn: &Connection, variant: &GeneticVariant) -> StoreResult<GeneticVariant>;

    /// Delete a variant and its reports. Returns false when no row had that id.
    fn delete(&self, conn: &Connection, id: VariantId) -> StoreResult<bool>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteVariantRepository;

pub(crate) struct VariantRow {
    id: String,
    gene_id: i64,
    chromosome: String,
    position: i64,
    reference_base: String,
    alternate_base: String,
    impact: String,
    created_at: String,
    updated_at: String,
    gene_symbol: String,
    gene_name: String,
}

impl VariantRow {
    /// Read [`VARIANT_COLUMNS`] starting at column `start`
    pub(crate) fn read_at(row: &Row<'_>, start: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(start)?,
            gene_id: row.get(start + 1)?,
            chromosome: row.get(start + 2)?,
            position: row.get(start + 3)?,
            reference_base: row.get(start + 4)?,
            alternate_base: row.get(start + 5)?,
            impact: row.get(start + 6)?,
            created_at: row.get(start + 7)?,
            updated_at: row.get(start + 8)?,
            gene_symbol: row.get(start + 9)?,
            gene_name: row.get(start + 10)?,
        })
    }

    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Self::read_at(row, 0)
    }

    pub(crate) fn decode(self) -> StoreResult<VariantDetail> {
        let impact = Impact::parse(&self.impact).ok_or_else(|| StoreError::CorruptRow {
            table: TABLE,
            reason: format!("unknown impact '{}'", self.impact),
        })?;
        let gene_id = GeneId(self.gene_id);

        Ok(VariantDetail {
            variant: GeneticVariant {
                id: VariantId(decode_uuid(TABLE, &self.id)?),
                gene_id,
                chromosome: self.chromosome,
                position: self.position,
                reference_base: self.reference_base,
                alternate_base: self.alternate_base,
                impact,
                created_at: decode_timestamp(TABLE, &self.created_at)?,
                updated_at: decode_timestamp(TABLE, &self.updated_at)?,
            },
            gene: GeneSummary {
                id: gene_id,
                symbol: self.gene_symbol,
                full_name: self.gene_name,
            },
        })
    }
}

fn query_details(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> StoreResult<Vec<VariantDetail>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, VariantRow::read)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(VariantRow::decode).collect()
}

impl VariantRepository for SqliteVariantRepository {
    fn list(&self, conn: &Connection) -> StoreResult<Vec<VariantDetail>> {
        query_details(
            conn,
            &format!("SELECT {VARIANT_COLUMNS} {SELECT_VARIANT} ORDER BY v.rowid"),
            [],
        )
    }

    fn get(&self, conn: &Connection, id: VariantId) -> StoreResult<Option<VariantDetail>> {
        conn.query_row(
            &format!("SELECT {VARIANT_COLUMNS} {SELECT_VARIANT} WHERE v.id = ?1"),
            params![id.to_string()],
            VariantRow::read,
        )
        .optional()?
        .map(VariantRow::decode)
        .transpose()
    }

    fn insert(&self, conn: &Connection, variant: &NewVariant) -> StoreResult<GeneticVariant> {
        let id = VariantId::new_v4();
        let (created_at, stamp) = now();
        conn.execute(
            "INSERT INTO genetic_variants
             (id, gene_id, chromosome, position, reference_base, alternate_base, impact,
              created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                id.to_string(),
                variant.gene_id.0,
                variant.chromosome,
                variant.position,
                variant.reference_base,
                variant.alternate_base,
                variant.impact.as_str(),
                stamp,
            ],
        )?;

        Ok(GeneticVariant {
            id,
            gene_id: variant.gene_id,
            chromosome: variant.chromosome.clone(),
            position: variant.position,
            reference_base: variant.reference_base.clone(),
            alternate_base: variant.alternate_base.clone(),
            impact: variant.impact,
            created_at,
            updated_at: created_at,
        })
    }

    fn update(&self, conn: &Connection, variant: &GeneticVariant) -> StoreResult<GeneticVariant> {
        let (updated_at, stamp) = now();
        conn.execute(
            "UPDATE genetic_variants
             SET gene_id = ?1, chromosome = ?2, position = ?3, reference_base = ?4,
                 alternate_base = ?5, impact = ?6, updated_at = ?7
             WHERE id = ?8",
            params![
                variant.gene_id.0,
                variant.chromosome,
                variant.position,
                variant.reference_base,
                variant.alternate_base,
                variant.impact.as_str(),
                stamp,
                variant.id.to_string(),
            ],
        )?;

        Ok(GeneticVariant {
            updated_at,
            ..variant.clone()
        })
    }

    fn delete(&self, conn: &Connection, id: VariantId) -> StoreResult<bool> {
        let removed = conn.execute(
            "DELETE FROM genetic_variants WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(removed > 0)
    }
}
