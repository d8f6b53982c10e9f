//! Resource services: CRUD over genes, variants and reports.
//!
//! Each service owns a [`Database`] handle plus the repositories it needs and
//! runs every operation inside one storage scope. Reads go through
//! [`Database::read`]; mutations go through [`Database::write`] so a failed
//! lookup or constraint check rolls the whole operation back.
//!
//! Service methods are blocking. The HTTP layer calls them from
//! `tokio::task::spawn_blocking`.
//!
//! [`Database`]: crate::store::Database
//! [`Database::read`]: crate::store::Database::read
//! [`Database::write`]: crate::store::Database::write

pub mod gene;
pub mod report;
pub mod variant;

use thiserror::Error;

use crate::store::{Database, StoreError};
use crate::utils::validation::FieldErrors;

pub use gene::GeneService;
pub use report::ReportService;
pub use variant::VariantService;

/// How a missing record was looked up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Id(String),
    Name(String),
    Unspecified,
}

fn gene_not_found(lookup: &Lookup) -> String {
    match lookup {
        Lookup::Id(id) => format!("Gene with ID {id} not found"),
        Lookup::Name(symbol) => format!("Gene with symbol {symbol} not found"),
        Lookup::Unspecified => "Gene not found".to_string(),
    }
}

fn pathway_not_found(lookup: &Lookup) -> String {
    match lookup {
        Lookup::Id(id) => format!("Pathway with ID {id} not found"),
        Lookup::Name(name) => format!("Pathway '{name}' not found"),
        Lookup::Unspecified => "Pathway not found".to_string(),
    }
}

fn invalid_data(field: &str, reason: &str) -> String {
    if field.is_empty() || reason.is_empty() {
        "Invalid gene data".to_string()
    } else {
        format!("Invalid data in field '{field}': {reason}")
    }
}

/// Failures surfaced by the resource services
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{}", gene_not_found(.0))]
    GeneNotFound(Lookup),

    #[error("Genetic variant with ID {id} not found")]
    VariantNotFound { id: String },

    /// Reserved for the pathway taxonomy, which has no resource yet
    #[error("{}", pathway_not_found(.0))]
    PathwayNotFound(Lookup),

    #[error("Report/association with ID {id} not found")]
    AssociationNotFound { id: String },

    #[error("A gene with symbol '{symbol}' already exists")]
    DuplicateGene { symbol: String },

    #[error("{}", invalid_data(field, reason))]
    InvalidData { field: String, reason: String },

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl ServiceError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidData {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether this is a client error rather than an internal failure
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

/// Fold per-field messages into one `InvalidData`. A single offending field
/// keeps its own name; several are listed together.
impl From<FieldErrors> for ServiceError {
    fn from(errors: FieldErrors) -> Self {
        let fields: Vec<&str> = errors.fields().collect();
        match fields.as_slice() {
            [field] => {
                let reason = errors.get(field).unwrap_or_default().join(" ");
                Self::invalid(*field, reason)
            }
            _ => Self::invalid(fields.join(", "), errors.to_string()),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Message used when a referenced record does not exist
fn missing_reference(id: impl std::fmt::Display) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

/// The three resource services over one database
#[derive(Clone)]
pub struct Catalog {
    pub db: Database,
    pub genes: GeneService,
    pub variants: VariantService,
    pub reports: ReportService,
}

impl Catalog {
    /// Services backed by the SQLite repositories
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self {
            genes: GeneService::new(db.clone()),
            variants: VariantService::new(db.clone()),
            reports: ReportService::new(db.clone()),
            db,
        }
    }
}
