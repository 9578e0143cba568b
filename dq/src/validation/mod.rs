//! Validation/Retry utility
//!
//! Guarantees every stage receives a value conforming to its declared schema,
//! whichever capability the completion adapter offers.

mod extract;
mod retry;
mod schema;

pub use extract::extract_json;
pub use retry::{DEFAULT_RETRIES, SCHEMA_MARKER, complete_and_validate, corrective_suffix};
pub use schema::{OutputSchema, StructuredOutput};
