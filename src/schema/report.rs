use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::report::{
    format_allele_frequency, NewReport, ReportDetail, ReportPatch, ALLELE_FREQUENCY_DECIMAL_PLACES,
    ALLELE_FREQUENCY_MAX_DIGITS,
};
use crate::core::types::{Impact, PatientId, ReportId, VariantId};
use crate::utils::validation::{
    date_field, decimal_field, not_null, nullable, required, uuid_field, FieldErrors,
};

pub const MSG_ALLELE_FREQUENCY_RANGE: &str = "Allele frequency must be between 0 and 1";

/// Request body for creating or updating a patient variant report.
///
/// `allele_frequency` is kept as raw JSON so both `0.45` and `"0.45"` are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportInput {
    #[serde(default, deserialize_with = "nullable")]
    pub patient_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub variant_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub detection_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub allele_frequency: Option<Option<serde_json::Value>>,
}

fn parse_patient_id(value: Option<String>) -> Result<PatientId, String> {
    not_null(value).and_then(|s| uuid_field(&s, PatientId::parse))
}

fn parse_variant_id(value: Option<String>) -> Result<VariantId, String> {
    not_null(value).and_then(|s| uuid_field(&s, VariantId::parse))
}

fn parse_detection_date(value: Option<String>) -> Result<NaiveDate, String> {
    not_null(value).and_then(|s| date_field(&s))
}

fn parse_allele_frequency(value: Option<serde_json::Value>) -> Result<Decimal, String> {
    let frequency = decimal_field(
        &not_null(value)?,
        ALLELE_FREQUENCY_MAX_DIGITS,
        ALLELE_FREQUENCY_DECIMAL_PLACES,
    )?;
    if frequency < Decimal::ZERO || frequency > Decimal::ONE {
        return Err(MSG_ALLELE_FREQUENCY_RANGE.to_string());
    }
    Ok(frequency)
}

impl ReportInput {
    /// Validate a complete payload (create and full update).
    /// Whether `variant_id` exists is checked by the service, not here.
    ///
    /// # Errors
    ///
    /// Returns every missing or invalid field.
    pub fn validate(self) -> Result<NewReport, FieldErrors> {
        let mut errors = FieldErrors::new();

        let patient_id = errors.check(
            "patient_id",
            required(self.patient_id).and_then(parse_patient_id),
        );
        let variant_id = errors.check(
            "variant_id",
            required(self.variant_id).and_then(parse_variant_id),
        );
        let detection_date = errors.check(
            "detection_date",
            required(self.detection_date).and_then(parse_detection_date),
        );
        let allele_frequency = errors.check(
            "allele_frequency",
            required(self.allele_frequency).and_then(parse_allele_frequency),
        );

        match (patient_id, variant_id, detection_date, allele_frequency) {
            (Some(patient_id), Some(variant_id), Some(detection_date), Some(allele_frequency))
                if errors.is_empty() =>
            {
                Ok(NewReport {
                    patient_id,
                    variant_id,
                    detection_date,
                    allele_frequency,
                })
            }
            _ => Err(errors),
        }
    }

    /// Validate only the fields present in the payload (partial update)
    ///
    /// # Errors
    ///
    /// Returns every present field that is invalid.
    pub fn validate_patch(self) -> Result<ReportPatch, FieldErrors> {
        let mut errors = FieldErrors::new();

        let patch = ReportPatch {
            patient_id: self
                .patient_id
                .and_then(|s| errors.check("patient_id", parse_patient_id(s))),
            variant_id: self
                .variant_id
                .and_then(|s| errors.check("variant_id", parse_variant_id(s))),
            detection_date: self
                .detection_date
                .and_then(|s| errors.check("detection_date", parse_detection_date(s))),
            allele_frequency: self
                .allele_frequency
                .and_then(|v| errors.check("allele_frequency", parse_allele_frequency(v))),
        };

        if errors.is_empty() {
            Ok(patch)
        } else {
            Err(errors)
        }
    }
}

/// Public view of a report with the variant's locus and gene symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOutput {
    pub id: ReportId,
    pub patient_id: PatientId,
    pub detection_date: NaiveDate,
    /// Fixed 4-place decimal string, e.g. "0.4500"
    pub allele_frequency: String,
    pub variant_id: VariantId,
    pub gene_symbol: String,
    pub chromosome: String,
    pub position: i64,
    pub impact: Impact,
}

impl From<ReportDetail> for ReportOutput {
    fn from(detail: ReportDetail) -> Self {
        let ReportDetail { report, variant } = detail;
        Self {
            id: report.id,
            patient_id: report.patient_id,
            detection_date: report.detection_date,
            allele_frequency: format_allele_frequency(report.allele_frequency),
            variant_id: variant.variant.id,
            gene_symbol: variant.gene.symbol,
            chromosome: variant.variant.chromosome,
            position: variant.variant.position,
            impact: variant.variant.impact,
        }
    }
}
