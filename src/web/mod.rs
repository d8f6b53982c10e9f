//! REST interface for the genomic catalog.
//!
//! Built on Axum. Handlers decode the request, hand the work to the blocking
//! resource services and map failures through [`error::ApiError`].
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8000 with ./geno_catalog.db
//! geno-catalog serve
//!
//! # Custom port and database file
//! geno-catalog serve --port 9000 --database /var/lib/geno/catalog.db
//!
//! # Bind to all interfaces, allow a browser front end
//! geno-catalog serve --address 0.0.0.0 --cors-origin http://localhost:3000
//! ```
//!
//! ## API Endpoints
//!
//! Every path is also served without its trailing slash.
//!
//! - `GET|POST /genes/`, `GET|PUT|PATCH|DELETE /genes/{id}/`
//! - `GET /genes/by_symbol/?symbol=<symbol>`
//! - `GET|POST /genetic-variants/`, `GET|PUT|PATCH|DELETE /genetic-variants/{id}/`
//! - `GET|POST /patient-variant-reports/`,
//!   `GET|PUT|PATCH|DELETE /patient-variant-reports/{id}/`
//! - `GET /patient-variant-reports/by_patient/?patient_id=<uuid>`
//! - `GET /health/`, `GET /health/status/`

pub mod error;
pub mod extract;
pub mod genes;
pub mod health;
pub mod reports;
pub mod server;
pub mod variants;
