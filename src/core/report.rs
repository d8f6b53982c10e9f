use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::core::types::{PatientId, ReportId, VariantId};
use crate::core::variant::VariantDetail;

/// Total significant digits allowed in an allele frequency
pub const ALLELE_FREQUENCY_MAX_DIGITS: u32 = 5;

/// Decimal places kept for an allele frequency
pub const ALLELE_FREQUENCY_DECIMAL_PLACES: u32 = 4;

/// Observation of a variant in a patient's sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientVariantReport {
    pub id: ReportId,

    /// Not validated against any patient store
    pub patient_id: PatientId,

    /// Reported variant; deleting it deletes the report
    pub variant_id: VariantId,

    pub detection_date: NaiveDate,

    /// Variant allele frequency in [0, 1], scale 4
    pub allele_frequency: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A report joined with its variant and gene
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDetail {
    pub report: PatientVariantReport,
    pub variant: VariantDetail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReport {
    pub patient_id: PatientId,
    pub variant_id: VariantId,
    pub detection_date: NaiveDate,
    pub allele_frequency: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportPatch {
    pub patient_id: Option<PatientId>,
    pub variant_id: Option<VariantId>,
    pub detection_date: Option<NaiveDate>,
    pub allele_frequency: Option<Decimal>,
}

impl From<NewReport> for ReportPatch {
    fn from(report: NewReport) -> Self {
        Self {
            patient_id: Some(report.patient_id),
            variant_id: Some(report.variant_id),
            detection_date: Some(report.detection_date),
            allele_frequency: Some(report.allele_frequency),
        }
    }
}

impl PatientVariantReport {
    pub fn apply(&mut self, patch: ReportPatch) {
        if let Some(patient_id) = patch.patient_id {
            self.patient_id = patient_id;
        }
        if let Some(variant_id) = patch.variant_id {
            self.variant_id = variant_id;
        }
        if let Some(detection_date) = patch.detection_date {
            self.detection_date = detection_date;
        }
        if let Some(allele_frequency) = patch.allele_frequency {
            self.allele_frequency = allele_frequency;
        }
    }
}

/// Render an allele frequency with its fixed scale ("0.5" -> "0.5000")
#[must_use]
pub fn format_allele_frequency(value: Decimal) -> String {
    let mut scaled = value;
    scaled.rescale(ALLELE_FREQUENCY_DECIMAL_PLACES);
    scaled.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_format_allele_frequency() {
        let cases = [
            ("0.5", "0.5000"),
            ("0", "0.0000"),
            ("1", "1.0000"),
            ("0.1234", "0.1234"),
            ("0.45000", "0.4500"),
        ];
        for (input, expected) in cases {
            let value = Decimal::from_str(input).unwrap();
            assert_eq!(format_allele_frequency(value), expected, "input {input}");
        }
    }

    #[test]
    fn test_apply_patch() {
        let now = Utc::now();
        let mut report = PatientVariantReport {
            id: ReportId::new_v4(),
            patient_id: PatientId::new_v4(),
            variant_id: VariantId::new_v4(),
            detection_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            allele_frequency: Decimal::from_str("0.25").unwrap(),
            created_at: now,
            updated_at: now,
        };
        let first_variant = report.variant_id;

        report.apply(ReportPatch {
            allele_frequency: Some(Decimal::ONE),
            ..ReportPatch::default()
        });

        assert_eq!(report.allele_frequency, Decimal::ONE);
        assert_eq!(report.variant_id, first_variant);
    }
}
