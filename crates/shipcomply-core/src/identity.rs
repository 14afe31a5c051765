//! # Identifier Newtypes
//!
//! One UUID newtype per record namespace, so a `ConstraintId` can never be
//! passed where a `RuleId` is expected.
//!
//! All cross-border reference tables share [`ReferenceId`]; their records are
//! never cross-referenced by id, only by country code or field key.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Parse from the bare hyphenated UUID form.
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a [`RuleCategory`](crate::RuleCategory).
    CategoryId,
    "category"
);
uuid_id!(
    /// Identifier of a [`ComplianceRule`](crate::ComplianceRule).
    RuleId,
    "rule"
);
uuid_id!(
    /// Identifier of a [`ValidationConstraint`](crate::ValidationConstraint).
    ConstraintId,
    "constraint"
);
uuid_id!(
    /// Identifier of a [`RuleDependency`](crate::RuleDependency).
    DependencyId,
    "dependency"
);
uuid_id!(
    /// Identifier of a [`RegionalRule`](crate::RegionalRule).
    RegionalRuleId,
    "regional"
);
uuid_id!(
    /// Identifier shared by the cross-border reference tables.
    ReferenceId,
    "reference"
);
uuid_id!(
    /// Identifier stamped on every compliance finding.
    FindingId,
    "finding"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(RuleId::new(), RuleId::new());
    }

    #[test]
    fn display_carries_namespace() {
        let id = CategoryId::new();
        assert!(id.to_string().starts_with("category:"));
    }

    #[test]
    fn serde_is_transparent() {
        let id = RuleId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
        let back: RuleId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn parse_roundtrips_bare_uuid() {
        let id = ConstraintId::new();
        let parsed = ConstraintId::parse(&id.as_uuid().to_string()).unwrap();
        assert_eq!(parsed, id);
        assert!(ConstraintId::parse("not-a-uuid").is_err());
    }
}
