//! # shipcomply-core: Foundational Types for Shipment Compliance
//!
//! This crate is the leaf of the shipcomply workspace. It defines the record
//! types every other crate stores, validates, or reports on, and depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Typed identifiers.** `RuleId`, `CategoryId`, `ConstraintId`, … are
//!    distinct UUID newtypes. A constraint cannot be attached to a category id
//!    by accident.
//!
//! 2. **Drafts and factories.** Every entity is created from a `*Draft` whose
//!    fields are all optional. The factory supplies a fresh id, `is_active =
//!    true`, and current timestamps, and rejects drafts missing a mandatory
//!    reference.
//!
//! 3. **Closed vocabularies.** Field types, constraint types, validation
//!    levels, transforms and cross-border enums are exhaustive enums with
//!    camelCase wire names.
//!
//! 4. **UTC-only timestamps.** [`Timestamp`] is truncated to seconds and
//!    `updated_at` only ever moves forward.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `shipcomply-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod country;
pub mod error;
pub mod finding;
pub mod identity;
pub mod record;
pub mod reference;
pub mod rule;
pub mod shipment;
pub mod temporal;

pub use country::normalize_country;
pub use error::ModelError;
pub use finding::{
    ClassifierStatus, ComplianceFinding, ComplianceReport, ComplianceStatus, FindingKind,
    ReferenceSource, ValidationFinding,
};
pub use identity::{
    CategoryId, ConstraintId, DependencyId, FindingId, ReferenceId, RegionalRuleId, RuleId,
};
pub use record::Record;
pub use reference::{
    AppliesTo, CountryRequirement, CountryRequirementDraft, EnhancedDocumentation,
    EnhancedDocumentationDraft, FieldContext, ItemSeverity, ReferenceTables, RequiredField,
    RequiredFieldDraft, RestrictedDestination, RestrictedDestinationDraft, RestrictedItem,
    RestrictedItemDraft, RestrictionType,
};
pub use rule::{
    CategoryDraft, ComplianceRule, ConstraintDraft, ConstraintType, DependencyDraft,
    DependencyType, FieldType, RegionalRule, RegionalRuleDraft, RuleCategory, RuleDependency,
    RuleDraft, TransformKind, ValidationConstraint, ValidationLevel,
};
pub use shipment::Shipment;
pub use temporal::Timestamp;
