//! # Store Errors
//!
//! Failures of rule store operations. These propagate to the caller for all
//! rule, category and constraint CRUD: the catalog is authoritative and no
//! data is ever substituted on failure.

use shipcomply_core::{CategoryId, ModelError};
use thiserror::Error;

use crate::kind::EntityKind;

/// Error from a rule store or the admin catalog.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing store could not be read or written.
    #[error("rule store unavailable: {reason}")]
    Unavailable {
        /// What failed.
        reason: String,
    },

    /// An operation exceeded its deadline.
    #[error("rule store {operation} timed out after {after_ms}ms")]
    Timeout {
        /// Operation name (e.g. "get_all").
        operation: &'static str,
        /// Deadline that expired, in milliseconds.
        after_ms: u64,
    },

    /// Update or delete addressed a record that does not exist.
    #[error("{kind} record {id} not found")]
    NotFound {
        kind: EntityKind,
        id: String,
    },

    /// A category cannot be deleted while rules reference it.
    #[error("category {id} is still referenced by {rules} rule(s)")]
    CategoryInUse {
        id: CategoryId,
        rules: usize,
    },

    /// A record could not be converted to or from its stored form.
    #[error("failed to (de)serialize {kind} record: {source}")]
    Serialization {
        kind: EntityKind,
        #[source]
        source: serde_json::Error,
    },

    /// A draft was rejected by its factory.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl StoreError {
    /// Shorthand for [`StoreError::Unavailable`].
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Whether retrying later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }
}
