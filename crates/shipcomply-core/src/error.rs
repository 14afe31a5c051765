//! # Error Types
//!
//! Errors raised while building or parsing domain records. Storage, transport
//! and classifier errors live in their own crates.

use thiserror::Error;

/// Error constructing or parsing a domain record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A draft is missing a field the factory cannot default.
    #[error("{entity} draft is missing required field `{field}`")]
    MissingField {
        /// Entity kind being created (e.g. "ComplianceRule").
        entity: &'static str,
        /// Name of the missing field.
        field: &'static str,
    },

    /// A string did not name a known variant of a closed vocabulary.
    #[error("unknown {vocabulary} value: {value:?}")]
    UnknownVariant {
        /// Vocabulary name (e.g. "constraint type").
        vocabulary: &'static str,
        /// The rejected input.
        value: String,
    },

    /// A timestamp string could not be parsed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
