use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::{GeneId, Impact, VariantId};

/// Maximum length of a chromosome label (e.g. "chr17", "X", "MT")
pub const CHROMOSOME_MAX_LENGTH: usize = 10;

/// Maximum length of the reference and alternate alleles
pub const ALLELE_MAX_LENGTH: usize = 500;

/// A specific mutation registered against a gene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneticVariant {
    pub id: VariantId,

    /// Owning gene; deleting the gene deletes the variant
    pub gene_id: GeneId,

    pub chromosome: String,

    /// Genomic coordinate, never negative
    pub position: i64,

    pub reference_base: String,
    pub alternate_base: String,

    pub impact: Impact,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity of the owning gene, carried alongside a variant for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneSummary {
    pub id: GeneId,
    pub symbol: String,
    pub full_name: String,
}

/// A variant joined with its gene
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDetail {
    pub variant: GeneticVariant,
    pub gene: GeneSummary,
}

/// A validated variant that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVariant {
    pub gene_id: GeneId,
    pub chromosome: String,
    pub position: i64,
    pub reference_base: String,
    pub alternate_base: String,
    pub impact: Impact,
}

/// Validated changes to an existing variant; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantPatch {
    pub gene_id: Option<GeneId>,
    pub chromosome: Option<String>,
    pub position: Option<i64>,
    pub reference_base: Option<String>,
    pub alternate_base: Option<String>,
    pub impact: Option<Impact>,
}

impl From<NewVariant> for VariantPatch {
    fn from(variant: NewVariant) -> Self {
        Self {
            gene_id: Some(variant.gene_id),
            chromosome: Some(variant.chromosome),
            position: Some(variant.position),
            reference_base: Some(variant.reference_base),
            alternate_base: Some(variant.alternate_base),
            impact: Some(variant.impact),
        }
    }
}

impl GeneticVariant {
    /// Merge a patch into this variant
    pub fn apply(&mut self, patch: VariantPatch) {
        if let Some(gene_id) = patch.gene_id {
            self.gene_id = gene_id;
        }
        if let Some(chromosome) = patch.chromosome {
            self.chromosome = chromosome;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(reference_base) = patch.reference_base {
            self.reference_base = reference_base;
        }
        if let Some(alternate_base) = patch.alternate_base {
            self.alternate_base = alternate_base;
        }
        if let Some(impact) = patch.impact {
            self.impact = impact;
        }
    }

    /// Locus in `chromosome:position` notation
    #[must_use]
    pub fn locus(&self) -> String {
        format!("{}:{}", self.chromosome, self.position)
    }
}
