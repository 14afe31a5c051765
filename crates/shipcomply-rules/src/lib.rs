//! # shipcomply-rules: Field Validation
//!
//! Checks each shipment field against its stored rule definition.
//!
//! - **Transforms** (`transform.rs`): the closed set of named value
//!   normalizations a rule may select.
//! - **Compiled rule sets** (`compiled.rs`): patterns and numeric bounds
//!   compiled once per [`RuleSnapshot`](shipcomply_store::RuleSnapshot),
//!   with regional variants merged ahead of time.
//! - **Engine** (`engine.rs`): [`FieldValidator`] and host-registered
//!   [`CustomConstraint`] handlers.
//! - **Defaults and loader** (`defaults.rs`, `loader.rs`): the built-in
//!   catalog and the idempotent seed and reset operations.
//!
//! ## Crate Policy
//!
//! - Evaluation never touches the store; only the loader writes.
//! - Violations are findings, not errors.
//! - Stored data selects behavior by tag. Nothing stored is executed.

pub mod compiled;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod loader;
pub mod transform;

pub use compiled::{CompiledConstraint, CompiledRule, CompiledRuleSet, ConstraintCheck};
pub use defaults::{reference_tables, rule_catalog, DefaultCatalog};
pub use engine::{
    CustomConstraint, CustomConstraints, FieldOutcome, FieldValidator, ShipmentValidation,
    UnevaluatedConstraint,
};
pub use error::{LoaderError, RuleLoadIssue, TransformError};
pub use loader::{reset, seed_if_empty, SeedReport};
