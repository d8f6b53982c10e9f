use std::sync::Arc;

use rusqlite::Connection;

use crate::core::types::{GeneId, VariantId};
use crate::core::variant::{VariantDetail, VariantPatch};
use crate::schema::variant::{VariantInput, VariantOutput};
use crate::service::{missing_reference, ServiceError, ServiceResult};
use crate::store::{
    Database, GeneRepository, SqliteGeneRepository, SqliteVariantRepository, StoreError,
    VariantRepository,
};
use crate::utils::validation::FieldErrors;

/// CRUD over genetic variants; every variant must reference an existing gene
#[derive(Clone)]
pub struct VariantService {
    db: Database,
    genes: Arc<dyn GeneRepository>,
    variants: Arc<dyn VariantRepository>,
}

fn not_found(id: &str) -> ServiceError {
    ServiceError::VariantNotFound { id: id.to_string() }
}

fn map_store_error(err: StoreError, gene_id: GeneId) -> ServiceError {
    if err.is_foreign_key_violation() {
        ServiceError::invalid("gene_id", missing_reference(gene_id))
    } else {
        ServiceError::Storage(err)
    }
}

impl VariantService {
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self::with_repositories(
            db,
            Arc::new(SqliteGeneRepository),
            Arc::new(SqliteVariantRepository),
        )
    }

    pub fn with_repositories(
        db: Database,
        genes: Arc<dyn GeneRepository>,
        variants: Arc<dyn VariantRepository>,
    ) -> Self {
        Self {
            db,
            genes,
            variants,
        }
    }

    /// All variants in creation order
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub fn list(&self) -> ServiceResult<Vec<VariantOutput>> {
        let variants = self.db.read(|conn| self.variants.list(conn))?;
        tracing::debug!("Listing {} variants", variants.len());
        Ok(variants.into_iter().map(VariantOutput::from).collect())
    }

    /// # Errors
    ///
    /// `InvalidData` for field violations or an unknown `gene_id`.
    pub fn create(&self, input: VariantInput) -> ServiceResult<VariantOutput> {
        let new_variant = input.validate().map_err(|errors| {
            tracing::warn!("Rejected variant create: {errors}");
            ServiceError::from(errors)
        })?;

        let detail = self.db.write(|conn| {
            self.require_gene(conn, new_variant.gene_id)?;
            let variant = self
                .variants
                .insert(conn, &new_variant)
                .map_err(|e| map_store_error(e, new_variant.gene_id))?;
            self.reload(conn, variant.id)
        })?;

        tracing::info!(
            "Created variant {} at {} on gene {}",
            detail.variant.id,
            detail.variant.locus(),
            detail.gene.symbol
        );
        Ok(detail.into())
    }

    /// # Errors
    ///
    /// `VariantNotFound` when the id is malformed or unknown.
    pub fn retrieve(&self, id: &str) -> ServiceResult<VariantOutput> {
        let detail = self.db.read(|conn| self.load(conn, id))?;
        Ok(detail.into())
    }

    /// # Errors
    ///
    /// `VariantNotFound`, or `InvalidData` for an incomplete payload.
    pub fn update(&self, id: &str, input: VariantInput) -> ServiceResult<VariantOutput> {
        self.save(id, input.validate().map(VariantPatch::from))
    }

    /// # Errors
    ///
    /// `VariantNotFound`, or `InvalidData` for invalid present fields.
    pub fn partial_update(&self, id: &str, input: VariantInput) -> ServiceResult<VariantOutput> {
        self.save(id, input.validate_patch())
    }

    /// Delete a variant and the reports that reference it
    ///
    /// # Errors
    ///
    /// `VariantNotFound` when the id is malformed or unknown.
    pub fn delete(&self, id: &str) -> ServiceResult<()> {
        let variant_id = VariantId::parse(id).ok_or_else(|| not_found(id))?;
        if !self.db.write(|conn| self.variants.delete(conn, variant_id))? {
            return Err(not_found(id));
        }
        tracing::info!("Deleted variant {variant_id}");
        Ok(())
    }

    fn require_gene(&self, conn: &Connection, gene_id: GeneId) -> ServiceResult<()> {
        if self.genes.get(conn, gene_id)?.is_none() {
            tracing::warn!("Rejected variant: gene {gene_id} does not exist");
            return Err(ServiceError::invalid("gene_id", missing_reference(gene_id)));
        }
        Ok(())
    }

    fn load(&self, conn: &Connection, id: &str) -> ServiceResult<VariantDetail> {
        let variant_id = VariantId::parse(id).ok_or_else(|| not_found(id))?;
        tracing::debug!("Looking up variant {variant_id}");
        self.variants.get(conn, variant_id)?.ok_or_else(|| not_found(id))
    }

    /// Fetch a row written in the current transaction, with its gene joined
    fn reload(&self, conn: &Connection, id: VariantId) -> ServiceResult<VariantDetail> {
        self.variants
            .get(conn, id)?
            .ok_or_else(|| not_found(&id.to_string()))
    }

    fn save(&self, id: &str, patch: Result<VariantPatch, FieldErrors>) -> ServiceResult<VariantOutput> {
        let detail = self.db.write(|conn| {
            let mut variant = self.load(conn, id)?.variant;
            let patch = patch.map_err(|errors| {
                tracing::warn!("Rejected update of variant {id}: {errors}");
                ServiceError::from(errors)
            })?;

            if let Some(gene_id) = patch.gene_id {
                self.require_gene(conn, gene_id)?;
            }

            variant.apply(patch);
            self.variants
                .update(conn, &variant)
                .map_err(|e| map_store_error(e, variant.gene_id))?;
            self.reload(conn, variant.id)
        })?;

        tracing::info!("Updated variant {}", detail.variant.id);
        Ok(detail.into())
    }
}
