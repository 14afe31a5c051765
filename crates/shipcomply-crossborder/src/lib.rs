//! # shipcomply-crossborder: Cross-Border Compliance
//!
//! Decides whether a shipment crosses a border and, if so, what it is
//! missing or must not carry.
//!
//! - **Indicators** (`indicators.rs`): keyword, carrier-phrase, customs
//!   field and field-variation tables.
//! - **Applicability** (`applicability.rs`): [`detect`] returns the first
//!   [`InternationalSignal`] found, or `None` for a domestic shipment.
//! - **Engine** (`engine.rs`): [`CrossBorderEngine`] with required-field,
//!   destination and restricted-content checks.
//! - **Context** (`context.rs`): [`ComplianceContext`], which combines field
//!   validation and cross-border checks over shared snapshots.
//!
//! ## Crate Policy
//!
//! - A shipment-level evaluation never returns an error. Store and
//!   classifier trouble shows up on the report (`referenceSource`,
//!   `classifier`).
//! - No process-wide state. Hosts build one context and pass it around.

pub mod applicability;
pub mod context;
pub mod engine;
pub mod error;
pub mod indicators;

pub use applicability::{detect, InternationalSignal};
pub use context::{ComplianceContext, ShipmentReport, DEFAULT_MAX_CONCURRENT_EVALUATIONS};
pub use engine::{CrossBorderEngine, EngineOptions, ReferenceData, DEFAULT_CLASSIFIER_DEADLINE};
pub use error::ContextError;
