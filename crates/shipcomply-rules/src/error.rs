//! # Rule Errors
//!
//! Transform failures are non-fatal (the engine falls back to the original
//! value). Load issues describe stored rule data that could not be compiled;
//! the offending entry is skipped and the rest of the rule set still loads.
//! Loader errors are fatal at startup.

use shipcomply_core::{ConstraintId, RuleId, TransformKind};
use shipcomply_store::StoreError;
use thiserror::Error;

/// A named transform could not normalize a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// The value is not in a shape the transform understands.
    #[error("{transform} cannot normalize {value:?}")]
    Unrecognized {
        transform: TransformKind,
        value: String,
    },

    /// `custom` is reserved and has no implementation.
    #[error("transform `custom` is reserved")]
    Reserved,
}

/// Stored rule data that could not be compiled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleLoadIssue {
    /// A rule's validation pattern is not a valid regular expression. The
    /// rule still loads without a pattern check.
    #[error("rule {rule_id} ({field_key}): invalid validation pattern: {error}")]
    InvalidPattern {
        rule_id: RuleId,
        field_key: String,
        error: String,
    },

    /// A regional override carries an invalid pattern. The override is
    /// skipped for that region.
    #[error("rule {rule_id} region {region}: invalid override pattern: {error}")]
    InvalidRegionalPattern {
        rule_id: RuleId,
        region: String,
        error: String,
    },

    /// A `pattern` constraint is not a valid regular expression.
    #[error("constraint {constraint_id} on rule {rule_id}: invalid pattern: {error}")]
    InvalidConstraintPattern {
        constraint_id: ConstraintId,
        rule_id: RuleId,
        error: String,
    },

    /// A `min`/`max` constraint value is not a number.
    #[error("constraint {constraint_id} on rule {rule_id}: {value:?} is not a number")]
    InvalidBound {
        constraint_id: ConstraintId,
        rule_id: RuleId,
        value: String,
    },
}

/// Seeding or resetting the default catalog failed.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("rule store error while seeding defaults: {0}")]
    Store(#[from] StoreError),

    #[error("default catalog entry is invalid: {0}")]
    Model(#[from] shipcomply_core::ModelError),
}
