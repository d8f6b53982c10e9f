use std::sync::Arc;

use rusqlite::Connection;

use crate::core::gene::{Gene, GenePatch};
use crate::core::types::GeneId;
use crate::schema::gene::{GeneInput, GeneOutput};
use crate::service::{Lookup, ServiceError, ServiceResult};
use crate::store::{Database, GeneRepository, SqliteGeneRepository, StoreError};
use crate::utils::validation::FieldErrors;

pub const MSG_SYMBOL_REQUIRED: &str = "The symbol parameter is required";

/// CRUD over the gene catalog, enforcing symbol uniqueness
#[derive(Clone)]
pub struct GeneService {
    db: Database,
    genes: Arc<dyn GeneRepository>,
}

fn not_found(id: &str) -> ServiceError {
    ServiceError::GeneNotFound(Lookup::Id(id.to_string()))
}

/// A UNIQUE violation on insert/update can only come from the symbol column
fn map_store_error(err: StoreError, symbol: &str) -> ServiceError {
    if err.is_unique_violation() {
        ServiceError::DuplicateGene {
            symbol: symbol.to_string(),
        }
    } else {
        ServiceError::Storage(err)
    }
}

impl GeneService {
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self::with_repository(db, Arc::new(SqliteGeneRepository))
    }

    pub fn with_repository(db: Database, genes: Arc<dyn GeneRepository>) -> Self {
        Self { db, genes }
    }

    /// All genes ordered by id
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub fn list(&self) -> ServiceResult<Vec<GeneOutput>> {
        let genes = self.db.read(|conn| self.genes.list(conn))?;
        tracing::debug!("Listing {} genes", genes.len());
        Ok(genes.into_iter().map(GeneOutput::from).collect())
    }

    /// Create a gene. A symbol already in use is rejected before the rest of
    /// the payload is validated.
    ///
    /// # Errors
    ///
    /// `DuplicateGene` for a taken symbol, `InvalidData` for field violations.
    pub fn create(&self, input: GeneInput) -> ServiceResult<GeneOutput> {
        let gene = self.db.write(|conn| {
            if let Some(symbol) = input.symbol.as_ref().and_then(Option::as_deref).map(str::trim) {
                if self.genes.find_by_symbol(conn, symbol)?.is_some() {
                    tracing::warn!("Rejected gene create: symbol '{symbol}' already exists");
                    return Err(ServiceError::DuplicateGene {
                        symbol: symbol.to_string(),
                    });
                }
            }

            let new_gene = input.validate().map_err(|errors| {
                tracing::warn!("Rejected gene create: {errors}");
                ServiceError::from(errors)
            })?;

            self.genes
                .insert(conn, &new_gene)
                .map_err(|e| map_store_error(e, &new_gene.symbol))
        })?;

        tracing::info!("Created gene {} ({})", gene.symbol, gene.id);
        Ok(gene.into())
    }

    /// # Errors
    ///
    /// `GeneNotFound` when the id is malformed or unknown.
    pub fn retrieve(&self, id: &str) -> ServiceResult<GeneOutput> {
        let gene = self.db.read(|conn| self.load(conn, id))?;
        Ok(gene.into())
    }

    /// Replace every field of a gene
    ///
    /// # Errors
    ///
    /// `GeneNotFound`, `InvalidData`, or `DuplicateGene` when the new symbol
    /// belongs to another gene.
    pub fn update(&self, id: &str, input: GeneInput) -> ServiceResult<GeneOutput> {
        self.save(id, input.validate().map(GenePatch::from))
    }

    /// Change only the fields present in the payload
    ///
    /// # Errors
    ///
    /// Same as [`GeneService::update`].
    pub fn partial_update(&self, id: &str, input: GeneInput) -> ServiceResult<GeneOutput> {
        self.save(id, input.validate_patch())
    }

    /// Delete a gene with its variants and their reports
    ///
    /// # Errors
    ///
    /// `GeneNotFound` when the id is malformed or unknown.
    pub fn delete(&self, id: &str) -> ServiceResult<()> {
        let gene_id = GeneId::parse(id).ok_or_else(|| not_found(id))?;
        let removed = self.db.write(|conn| self.genes.delete(conn, gene_id))?;
        if !removed {
            return Err(not_found(id));
        }
        tracing::info!("Deleted gene {gene_id}");
        Ok(())
    }

    /// Exact, case-sensitive symbol lookup
    ///
    /// # Errors
    ///
    /// `InvalidData` when `symbol` is absent or blank, `GeneNotFound` naming
    /// the symbol when no gene carries it.
    pub fn find_by_symbol(&self, symbol: Option<&str>) -> ServiceResult<GeneOutput> {
        let symbol = symbol.map(str::trim).unwrap_or_default();
        if symbol.is_empty() {
            return Err(ServiceError::invalid("symbol", MSG_SYMBOL_REQUIRED));
        }
        self.db
            .read(|conn| self.genes.find_by_symbol(conn, symbol))?
            .map(GeneOutput::from)
            .ok_or_else(|| ServiceError::GeneNotFound(Lookup::Name(symbol.to_string())))
    }

    fn load(&self, conn: &Connection, id: &str) -> ServiceResult<Gene> {
        let gene_id = GeneId::parse(id).ok_or_else(|| not_found(id))?;
        tracing::debug!("Looking up gene {gene_id}");
        self.genes.get(conn, gene_id)?.ok_or_else(|| not_found(id))
    }

    fn save(&self, id: &str, patch: Result<GenePatch, FieldErrors>) -> ServiceResult<GeneOutput> {
        let gene = self.db.write(|conn| {
            let mut gene = self.load(conn, id)?;
            let patch = patch.map_err(|errors| {
                tracing::warn!("Rejected update of gene {id}: {errors}");
                ServiceError::from(errors)
            })?;

            if let Some(symbol) = patch.symbol.as_deref() {
                if let Some(owner) = self.genes.find_by_symbol(conn, symbol)? {
                    if owner.id != gene.id {
                        tracing::warn!("Rejected update of gene {id}: symbol '{symbol}' is taken");
                        return Err(ServiceError::DuplicateGene {
                            symbol: symbol.to_string(),
                        });
                    }
                }
            }

            gene.apply(patch);
            self.genes
                .update(conn, &gene)
                .map_err(|e| map_store_error(e, &gene.symbol))
        })?;

        tracing::info!("Updated gene {} ({})", gene.symbol, gene.id);
        Ok(gene.into())
    }
}
