//! # Rule Model
//!
//! Categories, field rules, constraints, dependencies and regional overrides.
//!
//! ```text
//! RuleCategory 1 ──── * ComplianceRule 1 ──── * ValidationConstraint
//!                              │
//!                              ├──── * RegionalRule      (per-region override)
//!                              └──── * RuleDependency    (persisted, not evaluated)
//! ```
//!
//! Every record is built from a draft through its `create` factory, which
//! fills in ids, `is_active = true` and timestamps, and rejects drafts that
//! omit a mandatory reference.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::identity::{CategoryId, ConstraintId, DependencyId, RegionalRuleId, RuleId};
use crate::record::impl_record;
use crate::shipment::humanize_field_key;
use crate::temporal::Timestamp;

// ─── Vocabularies ────────────────────────────────────────────────────

/// Declared type of a shipment field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text.
    #[default]
    Text,
    /// Calendar date.
    Date,
    /// Numeric quantity, possibly with a unit suffix.
    Number,
    /// One of an enumerated set of values.
    Select,
    /// Value whose validity is entirely defined by its pattern.
    Regex,
}

/// Kind of an additional rule constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintType {
    /// Numeric lower bound (inclusive).
    Min,
    /// Numeric upper bound (inclusive).
    Max,
    /// Exact string equality.
    Equal,
    /// Additional regular expression.
    Pattern,
    /// Host-provided check, selected by name.
    Custom,
}

impl ConstraintType {
    /// Wire name of the constraint type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::Equal => "equal",
            Self::Pattern => "pattern",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity attached to a validation finding.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    /// Blocks the shipment.
    #[default]
    Error,
    /// Should be reviewed.
    Warning,
    /// Informational only.
    Info,
}

impl ValidationLevel {
    /// Wire name of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationLevel {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warning" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            _ => Err(ModelError::UnknownVariant {
                vocabulary: "validation level",
                value: s.to_string(),
            }),
        }
    }
}

/// Named, host-defined normalization applied to a field value after
/// validation.
///
/// Stored rules select one of these by tag; nothing stored is ever executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformKind {
    /// Strip surrounding whitespace.
    #[serde(rename = "trim")]
    Trim,
    /// Uppercase and trim.
    #[serde(rename = "uppercase")]
    Uppercase,
    /// Lowercase and trim.
    #[serde(rename = "lowercase")]
    Lowercase,
    /// Normalize a country name or code to its two-letter code.
    #[serde(rename = "uppercase2LetterCode")]
    Uppercase2LetterCode,
    /// Reformat a recognizable date as `YYYY-MM-DD`.
    #[serde(rename = "normalizeDateISO")]
    NormalizeDateIso,
    /// Reformat `LxWxH unit` dimensions as `L x W x H unit`.
    #[serde(rename = "normalizeDimensions")]
    NormalizeDimensions,
    /// Reformat `<number><unit>` weights as `<number> <unit>`.
    #[serde(rename = "normalizeWeight")]
    NormalizeWeight,
    /// Keep only ASCII digits.
    #[serde(rename = "digitsOnly")]
    DigitsOnly,
    /// Reserved for a future sandboxed expression language.
    #[serde(rename = "custom")]
    Custom,
}

impl TransformKind {
    /// Wire tag of the transform.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trim => "trim",
            Self::Uppercase => "uppercase",
            Self::Lowercase => "lowercase",
            Self::Uppercase2LetterCode => "uppercase2LetterCode",
            Self::NormalizeDateIso => "normalizeDateISO",
            Self::NormalizeDimensions => "normalizeDimensions",
            Self::NormalizeWeight => "normalizeWeight",
            Self::DigitsOnly => "digitsOnly",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "trim" => Self::Trim,
            "uppercase" => Self::Uppercase,
            "lowercase" => Self::Lowercase,
            "uppercase2LetterCode" => Self::Uppercase2LetterCode,
            "normalizeDateISO" => Self::NormalizeDateIso,
            "normalizeDimensions" => Self::NormalizeDimensions,
            "normalizeWeight" => Self::NormalizeWeight,
            "digitsOnly" => Self::DigitsOnly,
            "custom" => Self::Custom,
            _ => {
                return Err(ModelError::UnknownVariant {
                    vocabulary: "transform",
                    value: s.to_string(),
                })
            }
        };
        Ok(kind)
    }
}

/// Relationship between two rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencyType {
    /// The primary rule requires the other field to be present.
    Requires,
    /// The primary rule applies only when the other field has the trigger value.
    ConditionalOn,
    /// The two fields must not both be present.
    Conflicts,
}

// ─── RuleCategory ────────────────────────────────────────────────────

/// Grouping of rules, ordered by `priority` (lower first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCategory {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub priority: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Partial [`RuleCategory`]; `name` is mandatory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryDraft {
    pub id: Option<CategoryId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i32>,
    pub is_active: Option<bool>,
}

impl RuleCategory {
    /// Build a category from a draft.
    pub fn create(draft: CategoryDraft) -> Result<Self, ModelError> {
        let name = draft.name.ok_or(ModelError::MissingField {
            entity: "RuleCategory",
            field: "name",
        })?;
        let now = Timestamp::now();
        Ok(Self {
            id: draft.id.unwrap_or_default(),
            name,
            description: draft.description.unwrap_or_default(),
            priority: draft.priority.unwrap_or(0),
            is_active: draft.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        })
    }
}

// ─── ComplianceRule ──────────────────────────────────────────────────

/// Typed description of one shipment field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceRule {
    pub id: RuleId,
    pub category_id: CategoryId,
    /// Logical field name, e.g. `trackingNumber`.
    pub field_key: String,
    pub display_name: String,
    pub description: String,
    pub field_type: FieldType,
    pub is_required: bool,
    pub is_active: bool,
    /// Regular expression source; empty means no pattern check.
    pub validation_pattern: String,
    pub validation_message: String,
    pub example_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform_function: Option<TransformKind>,
    pub priority: i32,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Partial [`ComplianceRule`]; `categoryId` and `fieldKey` are mandatory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleDraft {
    pub id: Option<RuleId>,
    pub category_id: Option<CategoryId>,
    pub field_key: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub field_type: Option<FieldType>,
    pub is_required: Option<bool>,
    pub is_active: Option<bool>,
    pub validation_pattern: Option<String>,
    pub validation_message: Option<String>,
    pub example_value: Option<String>,
    pub transform_function: Option<TransformKind>,
    pub priority: Option<i32>,
    pub metadata: Option<BTreeMap<String, String>>,
}

impl ComplianceRule {
    /// Build a rule from a draft. A missing display name is derived from the
    /// field key (`recipientCountry` → `Recipient Country`).
    pub fn create(draft: RuleDraft) -> Result<Self, ModelError> {
        let category_id = draft.category_id.ok_or(ModelError::MissingField {
            entity: "ComplianceRule",
            field: "categoryId",
        })?;
        let field_key = draft
            .field_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(ModelError::MissingField {
                entity: "ComplianceRule",
                field: "fieldKey",
            })?;
        let display_name = draft
            .display_name
            .unwrap_or_else(|| humanize_field_key(&field_key));
        let validation_message = draft
            .validation_message
            .unwrap_or_else(|| format!("{display_name} has an invalid format"));
        let now = Timestamp::now();
        Ok(Self {
            id: draft.id.unwrap_or_default(),
            category_id,
            field_key,
            display_name,
            description: draft.description.unwrap_or_default(),
            field_type: draft.field_type.unwrap_or_default(),
            is_required: draft.is_required.unwrap_or(false),
            is_active: draft.is_active.unwrap_or(true),
            validation_pattern: draft.validation_pattern.unwrap_or_default(),
            validation_message,
            example_value: draft.example_value.unwrap_or_default(),
            transform_function: draft.transform_function,
            priority: draft.priority.unwrap_or(0),
            metadata: draft.metadata.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
    }
}

// ─── ValidationConstraint ────────────────────────────────────────────

/// Independently evaluated check attached to a rule.
///
/// `constraint_value` is interpreted per type: a number for `min`/`max`, a
/// literal for `equal`, a regex for `pattern`, a handler name for `custom`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationConstraint {
    pub id: ConstraintId,
    pub rule_id: RuleId,
    pub constraint_type: ConstraintType,
    pub constraint_value: String,
    pub validation_level: ValidationLevel,
    pub error_message: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Partial [`ValidationConstraint`]; `ruleId` and `constraintType` are mandatory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConstraintDraft {
    pub id: Option<ConstraintId>,
    pub rule_id: Option<RuleId>,
    pub constraint_type: Option<ConstraintType>,
    pub constraint_value: Option<String>,
    pub validation_level: Option<ValidationLevel>,
    pub error_message: Option<String>,
    pub is_active: Option<bool>,
}

impl ValidationConstraint {
    /// Build a constraint from a draft.
    pub fn create(draft: ConstraintDraft) -> Result<Self, ModelError> {
        let rule_id = draft.rule_id.ok_or(ModelError::MissingField {
            entity: "ValidationConstraint",
            field: "ruleId",
        })?;
        let constraint_type = draft.constraint_type.ok_or(ModelError::MissingField {
            entity: "ValidationConstraint",
            field: "constraintType",
        })?;
        let now = Timestamp::now();
        Ok(Self {
            id: draft.id.unwrap_or_default(),
            rule_id,
            constraint_type,
            constraint_value: draft.constraint_value.unwrap_or_default(),
            validation_level: draft.validation_level.unwrap_or_default(),
            error_message: draft.error_message.unwrap_or_default(),
            is_active: draft.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        })
    }
}

// ─── RuleDependency ──────────────────────────────────────────────────

/// Link between two rules. Persisted for future rule graphs; the validation
/// engines do not evaluate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDependency {
    pub id: DependencyId,
    pub primary_rule_id: RuleId,
    pub depends_on_rule_id: RuleId,
    pub dependency_type: DependencyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_value: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Partial [`RuleDependency`]; both rule ids and the type are mandatory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DependencyDraft {
    pub id: Option<DependencyId>,
    pub primary_rule_id: Option<RuleId>,
    pub depends_on_rule_id: Option<RuleId>,
    pub dependency_type: Option<DependencyType>,
    pub trigger_value: Option<String>,
    pub is_active: Option<bool>,
}

impl RuleDependency {
    /// Build a dependency from a draft.
    pub fn create(draft: DependencyDraft) -> Result<Self, ModelError> {
        let primary_rule_id = draft.primary_rule_id.ok_or(ModelError::MissingField {
            entity: "RuleDependency",
            field: "primaryRuleId",
        })?;
        let depends_on_rule_id = draft.depends_on_rule_id.ok_or(ModelError::MissingField {
            entity: "RuleDependency",
            field: "dependsOnRuleId",
        })?;
        let dependency_type = draft.dependency_type.ok_or(ModelError::MissingField {
            entity: "RuleDependency",
            field: "dependencyType",
        })?;
        let now = Timestamp::now();
        Ok(Self {
            id: draft.id.unwrap_or_default(),
            primary_rule_id,
            depends_on_rule_id,
            dependency_type,
            trigger_value: draft.trigger_value,
            is_active: draft.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        })
    }
}

// ─── RegionalRule ────────────────────────────────────────────────────

/// Per-region override of a rule's pattern, message, or required-ness.
/// `None` keeps the base rule's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalRule {
    pub id: RegionalRuleId,
    pub base_rule_id: RuleId,
    /// Region code, normalized like a country code.
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Partial [`RegionalRule`]; `baseRuleId` and `region` are mandatory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegionalRuleDraft {
    pub id: Option<RegionalRuleId>,
    pub base_rule_id: Option<RuleId>,
    pub region: Option<String>,
    pub validation_pattern: Option<String>,
    pub validation_message: Option<String>,
    pub is_required: Option<bool>,
    pub is_active: Option<bool>,
}

impl RegionalRule {
    /// Build a regional override from a draft. The region is stored uppercased.
    pub fn create(draft: RegionalRuleDraft) -> Result<Self, ModelError> {
        let base_rule_id = draft.base_rule_id.ok_or(ModelError::MissingField {
            entity: "RegionalRule",
            field: "baseRuleId",
        })?;
        let region = draft
            .region
            .map(|r| r.trim().to_uppercase())
            .filter(|r| !r.is_empty())
            .ok_or(ModelError::MissingField {
                entity: "RegionalRule",
                field: "region",
            })?;
        let now = Timestamp::now();
        Ok(Self {
            id: draft.id.unwrap_or_default(),
            base_rule_id,
            region,
            validation_pattern: draft.validation_pattern,
            validation_message: draft.validation_message,
            is_required: draft.is_required,
            is_active: draft.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply this override to a copy of `rule`.
    pub fn apply_to(&self, rule: &ComplianceRule) -> ComplianceRule {
        let mut merged = rule.clone();
        if let Some(pattern) = &self.validation_pattern {
            merged.validation_pattern = pattern.clone();
        }
        if let Some(message) = &self.validation_message {
            merged.validation_message = message.clone();
        }
        if let Some(required) = self.is_required {
            merged.is_required = required;
        }
        merged
    }
}

impl_record!(RuleCategory, CategoryId);
impl_record!(ComplianceRule, RuleId);
impl_record!(ValidationConstraint, ConstraintId);
impl_record!(RuleDependency, DependencyId);
impl_record!(RegionalRule, RegionalRuleId);
