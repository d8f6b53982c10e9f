//! # geno-catalog
//!
//! A REST catalog of oncology genes, the genetic variants registered against
//! them, and the variants detected in patient samples.
//!
//! Every write goes through the same pipeline: the JSON body is decoded into
//! an input struct, validated field by field, checked against the referenced
//! records, and persisted in one SQLite transaction. Failures surface as a
//! [`service::ServiceError`] which the HTTP layer maps onto a status code and
//! a `{"error", "detail", "status_code"}` body.
//!
//! ## Features
//!
//! - **Genes**: unique symbols, full names and function summaries
//! - **Genetic variants**: locus, alleles and a fixed impact classification
//! - **Patient variant reports**: detection date and allele frequency in [0, 1]
//! - **Cascading deletes**: gene -> variants -> reports
//! - **Per-field validation**: every offending field is reported at once
//!
//! ## Example
//!
//! ```rust
//! use geno_catalog::schema::GeneInput;
//! use geno_catalog::service::{Catalog, ServiceError};
//! use geno_catalog::store::Database;
//!
//! let catalog = Catalog::new(Database::open_in_memory().unwrap());
//!
//! let tp53 = catalog
//!     .genes
//!     .create(GeneInput {
//!         symbol: Some(Some("TP53".to_string())),
//!         full_name: Some(Some("Tumor protein p53".to_string())),
//!         function_summary: Some(Some("Tumor suppressor".to_string())),
//!     })
//!     .unwrap();
//!
//! let again = catalog.genes.create(GeneInput {
//!     symbol: Some(Some("TP53".to_string())),
//!     ..GeneInput::default()
//! });
//! assert!(matches!(again, Err(ServiceError::DuplicateGene { .. })));
//! assert_eq!(catalog.genes.retrieve(&tp53.id.to_string()).unwrap(), tp53);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Domain records and identifiers
//! - [`schema`]: Request/response bodies and their validation
//! - [`store`]: SQLite storage and repositories
//! - [`service`]: Resource services and the error taxonomy
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: REST interface

pub mod cli;
pub mod core;
pub mod schema;
pub mod service;
pub mod store;
pub mod utils;
pub mod web;

// Re-export commonly used types for convenience
pub use core::types::*;
pub use service::{Catalog, ServiceError, ServiceResult};
pub use store::Database;
