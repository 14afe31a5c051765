//! # Record Lifecycle
//!
//! Behaviour shared by every persisted entity: a typed id, an active flag,
//! and creation/update timestamps. Updates are whole-record replacements;
//! [`Record::supersede`] carries the identity and creation time of the stored
//! record over to its replacement.

use crate::temporal::Timestamp;

/// A persisted entity with lifecycle metadata.
pub trait Record {
    /// Typed identifier of this record kind.
    type Id: Copy + Eq + std::hash::Hash + std::fmt::Display + Send + Sync + 'static;

    /// The record's identifier.
    fn id(&self) -> Self::Id;

    /// Whether the record participates in evaluation.
    fn is_active(&self) -> bool;

    /// When the record was first created.
    fn created_at(&self) -> Timestamp;

    /// When the record was last replaced.
    fn updated_at(&self) -> Timestamp;

    /// Prepare `self` to replace `previous`: keep its id and creation time
    /// and move `updated_at` strictly past the previous value.
    fn supersede(&mut self, previous: &Self);
}

macro_rules! impl_record {
    ($ty:ty, $id:ty) => {
        impl $crate::record::Record for $ty {
            type Id = $id;

            fn id(&self) -> $id {
                self.id
            }

            fn is_active(&self) -> bool {
                self.is_active
            }

            fn created_at(&self) -> $crate::temporal::Timestamp {
                self.created_at
            }

            fn updated_at(&self) -> $crate::temporal::Timestamp {
                self.updated_at
            }

            fn supersede(&mut self, previous: &Self) {
                self.id = previous.id;
                self.created_at = previous.created_at;
                self.updated_at = $crate::temporal::Timestamp::advance_from(previous.updated_at);
            }
        }
    };
}

pub(crate) use impl_record;
