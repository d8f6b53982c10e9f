use std::sync::Arc;

use rusqlite::Connection;

use crate::core::report::{ReportDetail, ReportPatch};
use crate::core::types::{PatientId, ReportId, VariantId};
use crate::schema::report::{ReportInput, ReportOutput};
use crate::service::{missing_reference, ServiceError, ServiceResult};
use crate::store::{
    Database, ReportRepository, SqliteReportRepository, SqliteVariantRepository, StoreError,
    VariantRepository,
};
use crate::utils::validation::{uuid_field, FieldErrors};

pub const MSG_PATIENT_ID_REQUIRED: &str = "The patient_id parameter is required";

/// CRUD over patient variant reports; every report must reference an existing variant
#[derive(Clone)]
pub struct ReportService {
    db: Database,
    variants: Arc<dyn VariantRepository>,
    reports: Arc<dyn ReportRepository>,
}

fn not_found(id: &str) -> ServiceError {
    ServiceError::AssociationNotFound { id: id.to_string() }
}

fn map_store_error(err: StoreError, variant_id: VariantId) -> ServiceError {
    if err.is_foreign_key_violation() {
        ServiceError::invalid("variant_id", missing_reference(variant_id))
    } else {
        ServiceError::Storage(err)
    }
}

impl ReportService {
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self::with_repositories(
            db,
            Arc::new(SqliteVariantRepository),
            Arc::new(SqliteReportRepository),
        )
    }

    pub fn with_repositories(
        db: Database,
        variants: Arc<dyn VariantRepository>,
        reports: Arc<dyn ReportRepository>,
    ) -> Self {
        Self {
            db,
            variants,
            reports,
        }
    }

    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub fn list(&self) -> ServiceResult<Vec<ReportOutput>> {
        let reports = self.db.read(|conn| self.reports.list(conn))?;
        tracing::debug!("Listing {} reports", reports.len());
        Ok(reports.into_iter().map(ReportOutput::from).collect())
    }

    /// Reports of one patient. An unknown patient yields an empty list.
    ///
    /// # Errors
    ///
    /// `InvalidData` when `patient_id` is absent, blank, or not a UUID.
    pub fn list_by_patient(&self, patient_id: Option<&str>) -> ServiceResult<Vec<ReportOutput>> {
        let raw = patient_id.map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Err(ServiceError::invalid("patient_id", MSG_PATIENT_ID_REQUIRED));
        }
        let patient_id = uuid_field(raw, PatientId::parse)
            .map_err(|reason| ServiceError::invalid("patient_id", reason))?;

        let reports = self
            .db
            .read(|conn| self.reports.list_by_patient(conn, patient_id))?;
        tracing::debug!("Patient {patient_id} has {} reports", reports.len());
        Ok(reports.into_iter().map(ReportOutput::from).collect())
    }

    /// # Errors
    ///
    /// `InvalidData` for field violations or an unknown `variant_id`.
    pub fn create(&self, input: ReportInput) -> ServiceResult<ReportOutput> {
        let new_report = input.validate().map_err(|errors| {
            tracing::warn!("Rejected report create: {errors}");
            ServiceError::from(errors)
        })?;

        let detail = self.db.write(|conn| {
            self.require_variant(conn, new_report.variant_id)?;
            let report = self
                .reports
                .insert(conn, &new_report)
                .map_err(|e| map_store_error(e, new_report.variant_id))?;
            self.reload(conn, report.id)
        })?;

        tracing::info!(
            "Created report {} for patient {} (variant {})",
            detail.report.id,
            detail.report.patient_id,
            detail.report.variant_id
        );
        Ok(detail.into())
    }

    /// # Errors
    ///
    /// `AssociationNotFound` when the id is malformed or unknown.
    pub fn retrieve(&self, id: &str) -> ServiceResult<ReportOutput> {
        let detail = self.db.read(|conn| self.load(conn, id))?;
        Ok(detail.into())
    }

    /// # Errors
    ///
    /// `AssociationNotFound`, or `InvalidData` for an incomplete payload.
    pub fn update(&self, id: &str, input: ReportInput) -> ServiceResult<ReportOutput> {
        self.save(id, input.validate().map(ReportPatch::from))
    }

    /// # Errors
    ///
    /// `AssociationNotFound`, or `InvalidData` for invalid present fields.
    pub fn partial_update(&self, id: &str, input: ReportInput) -> ServiceResult<ReportOutput> {
        self.save(id, input.validate_patch())
    }

    /// # Errors
    ///
    /// `AssociationNotFound` when the id is malformed or unknown.
    pub fn delete(&self, id: &str) -> ServiceResult<()> {
        let report_id = ReportId::parse(id).ok_or_else(|| not_found(id))?;
        if !self.db.write(|conn| self.reports.delete(conn, report_id))? {
            return Err(not_found(id));
        }
        tracing::info!("Deleted report {report_id}");
        Ok(())
    }

    fn require_variant(&self, conn: &Connection, variant_id: VariantId) -> ServiceResult<()> {
        if self.variants.get(conn, variant_id)?.is_none() {
            tracing::warn!("Rejected report: variant {variant_id} does not exist");
            return Err(ServiceError::invalid(
                "variant_id",
                missing_reference(variant_id),
            ));
        }
        Ok(())
    }

    fn load(&self, conn: &Connection, id: &str) -> ServiceResult<ReportDetail> {
        let report_id = ReportId::parse(id).ok_or_else(|| not_found(id))?;
        tracing::debug!("Looking up report {report_id}");
        self.reports.get(conn, report_id)?.ok_or_else(|| not_found(id))
    }

    fn reload(&self, conn: &Connection, id: ReportId) -> ServiceResult<ReportDetail> {
        self.reports
            .get(conn, id)?
            .ok_or_else(|| not_found(&id.to_string()))
    }

    fn save(&self, id: &str, patch: Result<ReportPatch, FieldErrors>) -> ServiceResult<ReportOutput> {
        let detail = self.db.write(|conn| {
            let mut report = self.load(conn, id)?.report;
            let patch = patch.map_err(|errors| {
                tracing::warn!("Rejected update of report {id}: {errors}");
                ServiceError::from(errors)
            })?;

            if let Some(variant_id) = patch.variant_id {
                self.require_variant(conn, variant_id)?;
            }

            report.apply(patch);
            self.reports
                .update(conn, &report)
                .map_err(|e| map_store_error(e, report.variant_id))?;
            self.reload(conn, report.id)
        })?;

        tracing::info!("Updated report {}", detail.report.id);
        Ok(detail.into())
    }
}
