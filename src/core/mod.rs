//! Core data types for the genomic catalog.
//!
//! This module provides the records stored and served by the catalog:
//!
//! - [`Gene`](gene::Gene): a gene of interest, identified by a numeric id and a unique symbol
//! - [`GeneticVariant`](variant::GeneticVariant): a mutation registered against one gene
//! - [`PatientVariantReport`](report::PatientVariantReport): a variant observed in a patient
//! - [`GeneId`], [`VariantId`], [`ReportId`], [`PatientId`], [`Impact`]: identifiers and enums
//!
//! Each record has a `New*` form (validated input for creation) and a `*Patch`
//! form (validated changes, `None` meaning "keep the stored value").
//!
//! ## Ownership
//!
//! | Parent  | Child                | On parent delete |
//! |---------|----------------------|------------------|
//! | Gene    | GeneticVariant       | cascade          |
//! | Variant | PatientVariantReport | cascade          |

pub mod gene;
pub mod report;
pub mod types;
pub mod variant;

pub use types::{GeneId, Impact, PatientId, ReportId, VariantId};
