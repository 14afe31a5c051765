//! # shipcomply-store: Rule Store Contract and Admin Surface
//!
//! Everything the compliance engines read comes through [`RuleStore`], an
//! async CRUD and indexed-lookup contract scoped per entity kind. This crate
//! provides:
//!
//! - **Contract** (`store.rs`): [`RuleStore`] and the [`TimedStore`] deadline
//!   wrapper.
//! - **Kinds** (`kind.rs`): [`EntityKind`], [`IndexName`] and the
//!   [`StoreRecord`] trait every persisted type implements.
//! - **In-memory store** (`memory.rs`): [`MemoryStore`], optionally backed by
//!   a JSON file.
//! - **Admin catalog** (`catalog.rs`): [`RuleCatalog`] with referential
//!   guards and `NotFound` semantics.
//! - **Bulk import** (`import.rs`): per-kind all-or-nothing reference import.
//! - **Snapshots** (`snapshot.rs`): immutable rule and reference-table views
//!   shared by concurrent evaluations.
//!
//! ## Crate Policy
//!
//! - Depends only on `shipcomply-core` internally.
//! - No synchronous lock is held across an `.await`.
//! - Store failures always propagate; nothing here substitutes data.

pub mod catalog;
pub mod error;
pub mod import;
pub mod kind;
pub mod memory;
pub mod snapshot;
pub mod store;

pub use catalog::RuleCatalog;
pub use error::StoreError;
pub use import::{import_reference_data, ImportOutcome, ImportReport, ReferenceImport};
pub use kind::{EntityKind, IndexName, ParentRef, StoreRecord};
pub use memory::MemoryStore;
pub use snapshot::{load_reference_tables, RuleSnapshot, SnapshotHandle};
pub use store::{RuleStore, TimedStore, DEFAULT_STORE_TIMEOUT};
