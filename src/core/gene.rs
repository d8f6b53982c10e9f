use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::GeneId;

/// Maximum length of a gene symbol (e.g. "TP53", "BRCA1")
pub const SYMBOL_MAX_LENGTH: usize = 20;

/// Maximum length of a gene's full name
pub const FULL_NAME_MAX_LENGTH: usize = 200;

/// A gene of interest in the oncology catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gene {
    pub id: GeneId,

    /// HGNC-style symbol, unique across the catalog
    pub symbol: String,

    pub full_name: String,

    pub function_summary: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated gene that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGene {
    pub symbol: String,
    pub full_name: String,
    pub function_summary: String,
}

/// Validated changes to an existing gene; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenePatch {
    pub symbol: Option<String>,
    pub full_name: Option<String>,
    pub function_summary: Option<String>,
}

impl From<NewGene> for GenePatch {
    fn from(gene: NewGene) -> Self {
        Self {
            symbol: Some(gene.symbol),
            full_name: Some(gene.full_name),
            function_summary: Some(gene.function_summary),
        }
    }
}

impl Gene {
    /// Merge a patch into this gene
    pub fn apply(&mut self, patch: GenePatch) {
        if let Some(symbol) = patch.symbol {
            self.symbol = symbol;
        }
        if let Some(full_name) = patch.full_name {
            self.full_name = full_name;
        }
        if let Some(function_summary) = patch.function_summary {
            self.function_summary = function_summary;
        }
    }
}
