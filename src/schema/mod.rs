//! Request and response bodies for the REST interface.
//!
//! Input structs (`*Input`) mirror the JSON a client may send: every field is
//! optional so a partial update can carry any subset, and an explicit `null`
//! is kept apart from an absent key so it can be rejected. Each input has two
//! validation functions:
//!
//! - `validate()` requires the complete payload and yields a `New*` record
//! - `validate_patch()` checks only the fields present and yields a `*Patch`
//!
//! Output structs (`*Output`) are what the service returns. They never expose
//! the stored timestamps, and variants/reports carry a denormalized view of
//! their parent records.

pub mod gene;
pub mod report;
pub mod variant;

pub use gene::{GeneInput, GeneOutput};
pub use report::{ReportInput, ReportOutput};
pub use variant::{VariantInput, VariantOutput};
