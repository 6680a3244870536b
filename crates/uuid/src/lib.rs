//! Screening record identifiers.
//!
//! Every persisted screening is keyed by a freshly generated UUID v4. The identifier is opaque
//! to callers, but the store and the REST layer need a single textual form so that a value
//! written to a log line compares equal to the value a client sends back in a result-view query.
//!
//! ## Canonical form
//! - Length: 36
//! - Lowercase hexadecimal digits in the `8-4-4-4-12` hyphenated layout
//! - Example: `550e8400-e29b-41d4-a716-446655440000`
//!
//! This is the form produced by `Uuid::new_v4().hyphenated().to_string()`. [`RecordId::parse`]
//! rejects anything else (uppercase, simple/braced/URN forms), so a malformed query id can never
//! accidentally match a stored record.

mod record_id;

pub use record_id::RecordId;

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
