//! # Entity Kinds and Indexes
//!
//! Every persisted record type names its [`EntityKind`] and reports the
//! secondary index values the store keeps for it.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shipcomply_core::{
    CategoryId, ComplianceRule, CountryRequirement, EnhancedDocumentation, Record, RegionalRule,
    RequiredField, RestrictedDestination, RestrictedItem, RuleCategory, RuleDependency, RuleId,
    ValidationConstraint,
};

/// Storage namespace of one record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Rules,
    Categories,
    Constraints,
    Dependencies,
    RegionalRules,
    RequiredFields,
    CountryRequirements,
    RestrictedItems,
    RestrictedDestinations,
    EnhancedDocumentation,
}

impl EntityKind {
    /// All kinds, in the order the store persists them.
    pub const ALL: [EntityKind; 10] = [
        Self::Categories,
        Self::Rules,
        Self::Constraints,
        Self::Dependencies,
        Self::RegionalRules,
        Self::RequiredFields,
        Self::CountryRequirements,
        Self::RestrictedItems,
        Self::RestrictedDestinations,
        Self::EnhancedDocumentation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rules => "rules",
            Self::Categories => "categories",
            Self::Constraints => "constraints",
            Self::Dependencies => "dependencies",
            Self::RegionalRules => "regionalRules",
            Self::RequiredFields => "requiredFields",
            Self::CountryRequirements => "countryRequirements",
            Self::RestrictedItems => "restrictedItems",
            Self::RestrictedDestinations => "restrictedDestinations",
            Self::EnhancedDocumentation => "enhancedDocumentation",
        }
    }

    /// Inverse of [`as_str`](Self::as_str).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secondary index name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IndexName {
    /// `"true"` / `"false"`; kept for every kind.
    Active,
    CategoryId,
    FieldKey,
    RuleId,
    PrimaryRuleId,
    BaseRuleId,
    Region,
    CountryCode,
    Category,
}

impl IndexName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::CategoryId => "categoryId",
            Self::FieldKey => "fieldKey",
            Self::RuleId => "ruleId",
            Self::PrimaryRuleId => "primaryRuleId",
            Self::BaseRuleId => "baseRuleId",
            Self::Region => "region",
            Self::CountryCode => "countryCode",
            Self::Category => "category",
        }
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index value for the `active` index.
pub fn active_key(active: bool) -> &'static str {
    if active {
        "true"
    } else {
        "false"
    }
}

/// A record another record points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRef {
    Category(CategoryId),
    Rule(RuleId),
}

/// A record type the rule store can hold.
///
/// Id-valued index entries use the id's `Display` form (`category:<uuid>`),
/// so lookups pass `id.to_string()`.
pub trait StoreRecord:
    Record + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Namespace this type is stored under.
    const KIND: EntityKind;

    /// Secondary index values, excluding [`IndexName::Active`] which the
    /// store derives from [`Record::is_active`].
    fn index_values(&self) -> Vec<(IndexName, String)>;

    /// Records that must exist before this one may be written through the
    /// admin catalog.
    fn parents(&self) -> Vec<ParentRef> {
        Vec::new()
    }
}

impl StoreRecord for RuleCategory {
    const KIND: EntityKind = EntityKind::Categories;

    fn index_values(&self) -> Vec<(IndexName, String)> {
        Vec::new()
    }
}

impl StoreRecord for ComplianceRule {
    const KIND: EntityKind = EntityKind::Rules;

    fn index_values(&self) -> Vec<(IndexName, String)> {
        vec![
            (IndexName::CategoryId, self.category_id.to_string()),
            (IndexName::FieldKey, self.field_key.clone()),
        ]
    }

    fn parents(&self) -> Vec<ParentRef> {
        vec![ParentRef::Category(self.category_id)]
    }
}

impl StoreRecord for ValidationConstraint {
    const KIND: EntityKind = EntityKind::Constraints;

    fn index_values(&self) -> Vec<(IndexName, String)> {
        vec![(IndexName::RuleId, self.rule_id.to_string())]
    }

    fn parents(&self) -> Vec<ParentRef> {
        vec![ParentRef::Rule(self.rule_id)]
    }
}

impl StoreRecord for RuleDependency {
    const KIND: EntityKind = EntityKind::Dependencies;

    fn index_values(&self) -> Vec<(IndexName, String)> {
        vec![(IndexName::PrimaryRuleId, self.primary_rule_id.to_string())]
    }

    fn parents(&self) -> Vec<ParentRef> {
        vec![
            ParentRef::Rule(self.primary_rule_id),
            ParentRef::Rule(self.depends_on_rule_id),
        ]
    }
}

impl StoreRecord for RegionalRule {
    const KIND: EntityKind = EntityKind::RegionalRules;

    fn index_values(&self) -> Vec<(IndexName, String)> {
        vec![
            (IndexName::BaseRuleId, self.base_rule_id.to_string()),
            (IndexName::Region, self.region.clone()),
        ]
    }

    fn parents(&self) -> Vec<ParentRef> {
        vec![ParentRef::Rule(self.base_rule_id)]
    }
}

impl StoreRecord for RequiredField {
    const KIND: EntityKind = EntityKind::RequiredFields;

    fn index_values(&self) -> Vec<(IndexName, String)> {
        vec![(IndexName::FieldKey, self.field_key.clone())]
    }
}

impl StoreRecord for CountryRequirement {
    const KIND: EntityKind = EntityKind::CountryRequirements;

    fn index_values(&self) -> Vec<(IndexName, String)> {
        vec![(IndexName::CountryCode, self.country_code.clone())]
    }
}

/// Restricted items are indexed by lowercased category label.
impl StoreRecord for RestrictedItem {
    const KIND: EntityKind = EntityKind::RestrictedItems;

    fn index_values(&self) -> Vec<(IndexName, String)> {
        vec![(IndexName::Category, self.category.to_lowercase())]
    }
}

impl StoreRecord for RestrictedDestination {
    const KIND: EntityKind = EntityKind::RestrictedDestinations;

    fn index_values(&self) -> Vec<(IndexName, String)> {
        vec![(IndexName::CountryCode, self.country_code.clone())]
    }
}

impl StoreRecord for EnhancedDocumentation {
    const KIND: EntityKind = EntityKind::EnhancedDocumentation;

    fn index_values(&self) -> Vec<(IndexName, String)> {
        vec![(IndexName::CountryCode, self.country_code.clone())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(EntityKind::from_name("widgets"), None);
    }

    #[test]
    fn kind_serializes_like_its_name() {
        let json = serde_json::to_string(&EntityKind::RegionalRules).unwrap();
        assert_eq!(json, "\"regionalRules\"");
    }
}
