use serde::{Deserialize, Serialize};

use crate::core::types::{GeneId, Impact, VariantId};
use crate::core::variant::{
    NewVariant, VariantDetail, VariantPatch, ALLELE_MAX_LENGTH, CHROMOSOME_MAX_LENGTH,
};
use crate::utils::validation::{
    char_field, choice_field, integer_field, non_negative, not_null, nullable, required,
    FieldErrors,
};

/// Request body for creating or updating a genetic variant.
///
/// `gene_id` and `position` are kept as raw JSON so both `7` and `"7"` are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariantInput {
    #[serde(default, deserialize_with = "nullable")]
    pub gene_id: Option<Option<serde_json::Value>>,
    #[serde(default, deserialize_with = "nullable")]
    pub chromosome: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub position: Option<Option<serde_json::Value>>,
    #[serde(default, deserialize_with = "nullable")]
    pub reference_base: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub alternate_base: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub impact: Option<Option<String>>,
}

fn parse_gene_id(value: Option<serde_json::Value>) -> Result<GeneId, String> {
    not_null(value).and_then(|v| integer_field(&v)).map(GeneId)
}

fn parse_position(value: Option<serde_json::Value>) -> Result<i64, String> {
    not_null(value)
        .and_then(|v| integer_field(&v))
        .and_then(non_negative)
}

fn parse_chromosome(value: Option<String>) -> Result<String, String> {
    not_null(value).and_then(|s| char_field(s, Some(CHROMOSOME_MAX_LENGTH)))
}

fn parse_allele(value: Option<String>) -> Result<String, String> {
    not_null(value).and_then(|s| char_field(s, Some(ALLELE_MAX_LENGTH)))
}

fn parse_impact(value: Option<String>) -> Result<Impact, String> {
    not_null(value).and_then(|s| choice_field(&s, Impact::parse))
}

impl VariantInput {
    /// Validate a complete payload (create and full update).
    /// Whether `gene_id` exists is checked by the service, not here.
    ///
    /// # Errors
    ///
    /// Returns every missing or invalid field.
    pub fn validate(self) -> Result<NewVariant, FieldErrors> {
        let mut errors = FieldErrors::new();

        let gene_id = errors.check("gene_id", required(self.gene_id).and_then(parse_gene_id));
        let chromosome = errors.check(
            "chromosome",
            required(self.chromosome).and_then(parse_chromosome),
        );
        let position = errors.check("position", required(self.position).and_then(parse_position));
        let reference_base = errors.check(
            "reference_base",
            required(self.reference_base).and_then(parse_allele),
        );
        let alternate_base = errors.check(
            "alternate_base",
            required(self.alternate_base).and_then(parse_allele),
        );
        let impact = errors.check("impact", required(self.impact).and_then(parse_impact));

        match (gene_id, chromosome, position, reference_base, alternate_base, impact) {
            (
                Some(gene_id),
                Some(chromosome),
                Some(position),
                Some(reference_base),
                Some(alternate_base),
                Some(impact),
            ) if errors.is_empty() => Ok(NewVariant {
                gene_id,
                chromosome,
                position,
                reference_base,
                alternate_base,
                impact,
            }),
            _ => Err(errors),
        }
    }

    /// Validate only the fields present in the payload (partial update)
    ///
    /// # Errors
    ///
    /// Returns every present field that is invalid.
    pub fn validate_patch(self) -> Result<VariantPatch, FieldErrors> {
        let mut errors = FieldErrors::new();

        let patch = VariantPatch {
            gene_id: self
                .gene_id
                .and_then(|v| errors.check("gene_id", parse_gene_id(v))),
            chromosome: self
                .chromosome
                .and_then(|s| errors.check("chromosome", parse_chromosome(s))),
            position: self
                .position
                .and_then(|v| errors.check("position", parse_position(v))),
            reference_base: self
                .reference_base
                .and_then(|s| errors.check("reference_base", parse_allele(s))),
            alternate_base: self
                .alternate_base
                .and_then(|s| errors.check("alternate_base", parse_allele(s))),
            impact: self
                .impact
                .and_then(|s| errors.check("impact", parse_impact(s))),
        };

        if errors.is_empty() {
            Ok(patch)
        } else {
            Err(errors)
        }
    }
}

/// Public view of a variant with its gene denormalized alongside
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantOutput {
    pub id: VariantId,
    pub gene_id: GeneId,
    pub gene_symbol: String,
    pub gene_name: String,
    pub chromosome: String,
    pub position: i64,
    pub reference_base: String,
    pub alternate_base: String,
    pub impact: Impact,
}

impl From<VariantDetail> for VariantOutput {
    fn from(detail: VariantDetail) -> Self {
        let VariantDetail { variant, gene } = detail;
        Self {
            id: variant.id,
            gene_id: gene.id,
            gene_symbol: gene.symbol,
            gene_name: gene.full_name,
            chromosome: variant.chromosome,
            position: variant.position,
            reference_base: variant.reference_base,
            alternate_base: variant.alternate_base,
            impact: variant.impact,
        }
    }
}
