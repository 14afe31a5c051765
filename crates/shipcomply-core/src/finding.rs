//! # Findings
//!
//! Result entries produced by the two engines. A violation is a finding,
//! never an error: an empty finding list means the shipment passed.

use serde::{Deserialize, Serialize};

use crate::identity::{ConstraintId, FindingId};
use crate::rule::{ConstraintType, ValidationLevel};

/// What produced a field validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FindingKind {
    /// Required field was empty.
    Required,
    /// Value did not match the rule's pattern.
    Pattern,
    /// A rule constraint rejected the value.
    #[serde(rename_all = "camelCase")]
    Constraint {
        constraint_id: ConstraintId,
        constraint_type: ConstraintType,
    },
}

/// One field-level validation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFinding {
    pub field_key: String,
    pub level: ValidationLevel,
    pub kind: FindingKind,
    pub message: String,
    /// The value exactly as supplied.
    pub value: String,
}

/// Outcome of one cross-border check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplianceStatus {
    Compliant,
    NonCompliant,
    Warning,
}

/// One cross-border compliance result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceFinding {
    pub id: FindingId,
    /// Field or scope label, e.g. `recipientCountry` or `packageContents:global`.
    pub field: String,
    /// The value or list that triggered the finding.
    pub value: String,
    pub status: ComplianceStatus,
    pub message: String,
}

impl ComplianceFinding {
    /// A non-compliant finding with a fresh id.
    pub fn non_compliant(
        field: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::with_status(ComplianceStatus::NonCompliant, field, value, message)
    }

    /// A warning finding with a fresh id.
    pub fn warning(
        field: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::with_status(ComplianceStatus::Warning, field, value, message)
    }

    fn with_status(
        status: ComplianceStatus,
        field: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: FindingId::new(),
            field: field.into(),
            value: value.into(),
            status,
            message: message.into(),
        }
    }
}

/// How the restricted-content classifier took part in an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ClassifierStatus {
    /// No classifier call was needed (domestic shipment or no contents).
    #[default]
    NotRequired,
    /// Classifier disabled by configuration; keyword matching only.
    Disabled,
    /// Every classifier call answered.
    Available,
    /// At least one call failed or timed out; those scopes fell back to
    /// keyword matching.
    Degraded { reason: String },
}

impl ClassifierStatus {
    /// Whether restricted-content recall was reduced.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Where the cross-border reference tables came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferenceSource {
    /// Loaded from the rule store.
    #[default]
    Store,
    /// Store unavailable at engine construction; built-in defaults in use.
    Defaults,
}

/// Result of a cross-border compliance pass over one shipment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub international: bool,
    /// Normalized destination code, when one was known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    pub findings: Vec<ComplianceFinding>,
    pub classifier: ClassifierStatus,
    pub reference_source: ReferenceSource,
}

impl ComplianceReport {
    /// Whether any finding is non-compliant.
    pub fn has_violations(&self) -> bool {
        self.findings
            .iter()
            .any(|f| f.status == ComplianceStatus::NonCompliant)
    }

    /// Count of findings with the given status.
    pub fn count(&self, status: ComplianceStatus) -> usize {
        self.findings.iter().filter(|f| f.status == status).count()
    }
}
