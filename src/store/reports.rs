use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use crate::core::report::{
    format_allele_frequency, NewReport, PatientVariantReport, ReportDetail,
};
use crate::core::types::{PatientId, ReportId, VariantId};
use crate::store::variants::{VariantRow, VARIANT_COLUMNS};
use crate::store::{decode_timestamp, decode_uuid, now, StoreError, StoreResult};

const TABLE: &str = "patient_variant_reports";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Number of report columns preceding the joined variant columns
const REPORT_COLUMN_COUNT: usize = 7;

const SELECT_REPORT: &str = "FROM patient_variant_reports r
     JOIN genetic_variants v ON v.id = r.variant_id
     JOIN genes g ON g.id = v.gene_id";

fn select_sql(tail: &str) -> String {
    format!(
        "SELECT r.id, r.patient_id, r.variant_id, r.detection_date, r.allele_frequency, \
         r.created_at, r.updated_at, {VARIANT_COLUMNS} {SELECT_REPORT} {tail}"
    )
}

/// Persistence operations for patient variant reports
pub trait ReportRepository: Send + Sync {
    /// All reports joined with their variant and gene, in insertion order
    fn list(&self, conn: &Connection) -> StoreResult<Vec<ReportDetail>>;

    fn get(&self, conn: &Connection, id: ReportId) -> StoreResult<Option<ReportDetail>>;

    /// Reports for one patient, in insertion order
    fn list_by_patient(
        &self,
        conn: &Connection,
        patient_id: PatientId,
    ) -> StoreResult<Vec<ReportDetail>>;

    fn insert(&self, conn: &Connection, report: &NewReport) -> StoreResult<PatientVariantReport>;

    /// Overwrite every mutable column; refreshes `updated_at`
    fn update(
        &self,
        conn: &Connection,
        report: &PatientVariantReport,
    ) -> StoreResult<PatientVariantReport>;

    /// Returns false when no row had that id
    fn delete(&self, conn: &Connection, id: ReportId) -> StoreResult<bool>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteReportRepository;

struct ReportRow {
    id: String,
    patient_id: String,
    variant_id: String,
    detection_date: String,
    allele_frequency: String,
    created_at: String,
    updated_at: String,
    variant: VariantRow,
}

impl ReportRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            variant_id: row.get(2)?,
            detection_date: row.get(3)?,
            allele_frequency: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
            variant: VariantRow::read_at(row, REPORT_COLUMN_COUNT)?,
        })
    }

    fn decode(self) -> StoreResult<ReportDetail> {
        let detection_date = NaiveDate::parse_from_str(&self.detection_date, DATE_FORMAT)
            .map_err(|e| StoreError::CorruptRow {
                table: TABLE,
                reason: format!("bad detection date '{}': {e}", self.detection_date),
            })?;
        let allele_frequency =
            Decimal::from_str(&self.allele_frequency).map_err(|e| StoreError::CorruptRow {
                table: TABLE,
                reason: format!("bad allele frequency '{}': {e}", self.allele_frequency),
            })?;

        Ok(ReportDetail {
            report: PatientVariantReport {
                id: ReportId(decode_uuid(TABLE, &self.id)?),
                patient_id: PatientId(decode_uuid(TABLE, &self.patient_id)?),
                variant_id: VariantId(decode_uuid(TABLE, &self.variant_id)?),
                detection_date,
                allele_frequency,
                created_at: decode_timestamp(TABLE, &self.created_at)?,
                updated_at: decode_timestamp(TABLE, &self.updated_at)?,
            },
            variant: self.variant.decode()?,
        })
    }
}

fn query_details(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> StoreResult<Vec<ReportDetail>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, ReportRow::read)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(ReportRow::decode).collect()
}

impl ReportRepository for SqliteReportRepository {
    fn list(&self, conn: &Connection) -> StoreResult<Vec<ReportDetail>> {
        query_details(conn, &select_sql("ORDER BY r.rowid"), [])
    }

    fn get(&self, conn: &Connection, id: ReportId) -> StoreResult<Option<ReportDetail>> {
        conn.query_row(
            &select_sql("WHERE r.id = ?1"),
            params![id.to_string()],
            ReportRow::read,
        )
        .optional()?
        .map(ReportRow::decode)
        .transpose()
    }

    fn list_by_patient(
        &self,
        conn: &Connection,
        patient_id: PatientId,
    ) -> StoreResult<Vec<ReportDetail>> {
        query_details(
            conn,
            &select_sql("WHERE r.patient_id = ?1 ORDER BY r.rowid"),
            params![patient_id.to_string()],
        )
    }

    fn insert(&self, conn: &Connection, report: &NewReport) -> StoreResult<PatientVariantReport> {
        let id = ReportId::new_v4();
        let (created_at, stamp) = now();
        conn.execute(
            "INSERT INTO patient_variant_reports
             (id, patient_id, variant_id, detection_date, allele_frequency, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                id.to_string(),
                report.patient_id.to_string(),
                report.variant_id.to_string(),
                report.detection_date.format(DATE_FORMAT).to_string(),
                format_allele_frequency(report.allele_frequency),
                stamp,
            ],
        )?;

        Ok(PatientVariantReport {
            id,
            patient_id: report.patient_id,
            variant_id: report.variant_id,
            detection_date: report.detection_date,
            allele_frequency: report.allele_frequency,
            created_at,
            updated_at: created_at,
        })
    }

    fn update(
        &self,
        conn: &Connection,
        report: &PatientVariantReport,
    ) -> StoreResult<PatientVariantReport> {
        let (updated_at, stamp) = now();
        conn.execute(
            "UPDATE patient_variant_reports
             SET patient_id = ?1, variant_id = ?2, detection_date = ?3, allele_frequency = ?4,
                 updated_at = ?5
             WHERE id = ?6",
            params![
                report.patient_id.to_string(),
                report.variant_id.to_string(),
                report.detection_date.format(DATE_FORMAT).to_string(),
                format_allele_frequency(report.allele_frequency),
                stamp,
                report.id.to_string(),
            ],
        )?;

        Ok(PatientVariantReport {
            updated_at,
            ..report.clone()
        })
    }

    fn delete(&self, conn: &Connection, id: ReportId) -> StoreResult<bool> {
        let removed = conn.execute(
            "DELETE FROM patient_variant_reports WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gene::NewGene;
    use crate::core::types::{GeneId, Impact};
    use crate::core::variant::NewVariant;
    use crate::store::{
        Database, GeneRepository, SqliteGeneRepository, SqliteVariantRepository,
        VariantRepository,
    };

    fn seed_variant(db: &Database) -> (GeneId, VariantId) {
        db.write(|conn| {
            let gene = SqliteGeneRepository.insert(
                conn,
                &NewGene {
                    symbol: "TP53".to_string(),
                    full_name: "Tumor protein p53".to_string(),
                    function_summary: "Tumor suppressor".to_string(),
                },
            )?;
            let variant = SqliteVariantRepository.insert(
                conn,
                &NewVariant {
                    gene_id: gene.id,
                    chromosome: "chr17".to_string(),
                    position: 7_673_802,
                    reference_base: "G".to_string(),
                    alternate_base: "A".to_string(),
                    impact: Impact::Missense,
                },
            )?;
            Ok::<_, StoreError>((gene.id, variant.id))
        })
        .unwrap()
    }

    fn new_report(patient_id: PatientId, variant_id: VariantId, frequency: &str) -> NewReport {
        NewReport {
            patient_id,
            variant_id,
            detection_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            allele_frequency: Decimal::from_str(frequency).unwrap(),
        }
    }

    #[test]
    fn test_insert_and_get_joins_variant_and_gene() {
        let db = Database::open_in_memory().unwrap();
        let (gene_id, variant_id) = seed_variant(&db);
        let repo = SqliteReportRepository;
        let patient = PatientId::new_v4();

        let report = db
            .write(|conn| repo.insert(conn, &new_report(patient, variant_id, "0.45")))
            .unwrap();
        let detail = db.read(|conn| repo.get(conn, report.id)).unwrap().unwrap();

        assert_eq!(detail.report.patient_id, patient);
        assert_eq!(detail.report.detection_date, report.detection_date);
        assert_eq!(format_allele_frequency(detail.report.allele_frequency), "0.4500");
        assert_eq!(detail.variant.variant.id, variant_id);
        assert_eq!(detail.variant.gene.id, gene_id);
        assert_eq!(detail.variant.gene.symbol, "TP53");
    }

    #[test]
    fn test_list_by_patient_filters() {
        let db = Database::open_in_memory().unwrap();
        let (_, variant_id) = seed_variant(&db);
        let repo = SqliteReportRepository;
        let alice = PatientId::new_v4();
        let bob = PatientId::new_v4();

        for (patient, frequency) in [(alice, "0.1"), (bob, "0.2"), (alice, "0.3")] {
            db.write(|conn| repo.insert(conn, &new_report(patient, variant_id, frequency)))
                .unwrap();
        }

        let for_alice = db.read(|conn| repo.list_by_patient(conn, alice)).unwrap();
        let frequencies: Vec<String> = for_alice
            .iter()
            .map(|d| format_allele_frequency(d.report.allele_frequency))
            .collect();
        assert_eq!(frequencies, vec!["0.1000", "0.3000"]);

        assert_eq!(db.read(|conn| repo.list(conn)).unwrap().len(), 3);
        assert!(db
            .read(|conn| repo.list_by_patient(conn, PatientId::new_v4()))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_insert_with_unknown_variant_violates_foreign_key() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .write(|conn| {
                SqliteReportRepository.insert(
                    conn,
                    &new_report(PatientId::new_v4(), VariantId::new_v4(), "0.5"),
                )
            })
            .unwrap_err();
        assert!(err.is_foreign_key_violation());
    }

    #[test]
    fn test_gene_delete_cascades_through_variants_to_reports() {
        let db = Database::open_in_memory().unwrap();
        let (gene_id, variant_id) = seed_variant(&db);
        let repo = SqliteReportRepository;
        let report = db
            .write(|conn| repo.insert(conn, &new_report(PatientId::new_v4(), variant_id, "1")))
            .unwrap();

        assert!(db.write(|conn| SqliteGeneRepository.delete(conn, gene_id)).unwrap());

        assert!(db
            .read(|conn| SqliteVariantRepository.get(conn, variant_id))
            .unwrap()
            .is_none());
        assert!(db.read(|conn| repo.get(conn, report.id)).unwrap().is_none());
    }

    #[test]
    fn test_update_and_delete() {
        let db = Database::open_in_memory().unwrap();
        let (_, variant_id) = seed_variant(&db);
        let repo = SqliteReportRepository;
        let mut report = db
            .write(|conn| repo.insert(conn, &new_report(PatientId::new_v4(), variant_id, "0.2")))
            .unwrap();

        report.allele_frequency = Decimal::from_str("0.75").unwrap();
        db.write(|conn| repo.update(conn, &report)).unwrap();
        let stored = db.read(|conn| repo.get(conn, report.id)).unwrap().unwrap();
        assert_eq!(format_allele_frequency(stored.report.allele_frequency), "0.7500");

        assert!(db.write(|conn| repo.delete(conn, report.id)).unwrap());
        assert!(!db.write(|conn| repo.delete(conn, report.id)).unwrap());
    }
}
