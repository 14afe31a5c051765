//! # Cross-Border Reference Tables
//!
//! Reference data consulted by the cross-border compliance engine: which
//! fields an international shipment needs, what individual destination
//! countries additionally require, which goods are restricted, which
//! destinations are embargoed or sanctioned, and which countries expect
//! extra paperwork.
//!
//! Country codes are stored uppercased. Restricted item scope is either
//! [`AppliesTo::All`] (serialized as the string `"ALL"`) or a set of country
//! codes (serialized as an array).

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::identity::ReferenceId;
use crate::record::impl_record;
use crate::shipment::humanize_field_key;
use crate::temporal::Timestamp;

// ─── Vocabularies ────────────────────────────────────────────────────

/// Shipment context a required field applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldContext {
    Domestic,
    #[default]
    International,
    All,
}

impl FieldContext {
    /// Whether a field with this context is required on international shipments.
    pub fn applies_internationally(&self) -> bool {
        matches!(self, Self::International | Self::All)
    }
}

/// How strictly a restricted item is controlled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemSeverity {
    #[default]
    Prohibited,
    Restricted,
    Controlled,
}

/// Kind of restriction placed on a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestrictionType {
    #[default]
    Embargoed,
    Sanctions,
    Limited,
}

impl fmt::Display for RestrictionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Embargoed => "embargoed",
            Self::Sanctions => "under sanctions",
            Self::Limited => "subject to limited service",
        };
        f.write_str(label)
    }
}

/// Scope of a restricted item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "AppliesToRepr", into = "AppliesToRepr")]
pub enum AppliesTo {
    /// Restricted for every destination.
    #[default]
    All,
    /// Restricted only for the listed country codes.
    Countries(BTreeSet<String>),
}

impl AppliesTo {
    /// Scope covering the given country codes (uppercased).
    pub fn countries<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Countries(
            codes
                .into_iter()
                .map(|c| c.as_ref().trim().to_uppercase())
                .filter(|c| !c.is_empty())
                .collect(),
        )
    }

    /// Whether the scope explicitly names `code`. `All` names no country.
    pub fn names_country(&self, code: &str) -> bool {
        match self {
            Self::All => false,
            Self::Countries(codes) => codes.contains(code),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AppliesToRepr {
    Scope(String),
    Countries(Vec<String>),
}

impl TryFrom<AppliesToRepr> for AppliesTo {
    type Error = ModelError;

    fn try_from(repr: AppliesToRepr) -> Result<Self, Self::Error> {
        match repr {
            AppliesToRepr::Scope(s) if s.trim().eq_ignore_ascii_case("all") => Ok(Self::All),
            AppliesToRepr::Scope(s) if s.trim().len() == 2 => Ok(Self::countries([s])),
            AppliesToRepr::Scope(s) => Err(ModelError::UnknownVariant {
                vocabulary: "appliesTo scope",
                value: s,
            }),
            AppliesToRepr::Countries(codes) => Ok(Self::countries(codes)),
        }
    }
}

impl From<AppliesTo> for AppliesToRepr {
    fn from(scope: AppliesTo) -> Self {
        match scope {
            AppliesTo::All => Self::Scope("ALL".to_string()),
            AppliesTo::Countries(codes) => Self::Countries(codes.into_iter().collect()),
        }
    }
}

fn country_code(
    code: Option<String>,
    entity: &'static str,
) -> Result<String, ModelError> {
    code.map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .ok_or(ModelError::MissingField {
            entity,
            field: "countryCode",
        })
}

// ─── RequiredField ───────────────────────────────────────────────────

/// A field every shipment of the given context must carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredField {
    pub id: ReferenceId,
    pub field_key: String,
    pub display_name: String,
    pub description: String,
    pub context: FieldContext,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Partial [`RequiredField`]; `fieldKey` is mandatory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequiredFieldDraft {
    pub id: Option<ReferenceId>,
    pub field_key: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub context: Option<FieldContext>,
    pub is_active: Option<bool>,
}

impl RequiredField {
    /// Build a required field from a draft.
    pub fn create(draft: RequiredFieldDraft) -> Result<Self, ModelError> {
        let field_key = draft
            .field_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(ModelError::MissingField {
                entity: "RequiredField",
                field: "fieldKey",
            })?;
        let now = Timestamp::now();
        Ok(Self {
            id: draft.id.unwrap_or_default(),
            display_name: draft
                .display_name
                .unwrap_or_else(|| humanize_field_key(&field_key)),
            field_key,
            description: draft.description.unwrap_or_default(),
            context: draft.context.unwrap_or_default(),
            is_active: draft.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        })
    }
}

// ─── CountryRequirement ──────────────────────────────────────────────

/// Extra fields a destination country requires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryRequirement {
    pub id: ReferenceId,
    pub country_code: String,
    pub country_name: String,
    /// Field keys, in display order.
    pub required_fields: Vec<String>,
    pub description: String,
    pub documentation_notes: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Partial [`CountryRequirement`]; `countryCode` is mandatory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CountryRequirementDraft {
    pub id: Option<ReferenceId>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub required_fields: Option<Vec<String>>,
    pub description: Option<String>,
    pub documentation_notes: Option<String>,
    pub is_active: Option<bool>,
}

impl CountryRequirement {
    /// Build a country requirement from a draft.
    pub fn create(draft: CountryRequirementDraft) -> Result<Self, ModelError> {
        let country_code = country_code(draft.country_code, "CountryRequirement")?;
        let now = Timestamp::now();
        Ok(Self {
            id: draft.id.unwrap_or_default(),
            country_name: draft.country_name.unwrap_or_else(|| country_code.clone()),
            country_code,
            required_fields: draft.required_fields.unwrap_or_default(),
            description: draft.description.unwrap_or_default(),
            documentation_notes: draft.documentation_notes.unwrap_or_default(),
            is_active: draft.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        })
    }
}

// ─── RestrictedItem ──────────────────────────────────────────────────

/// A category of goods that is prohibited or controlled somewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestrictedItem {
    pub id: ReferenceId,
    /// Free-text label matched against package contents, e.g. `firearms`.
    pub category: String,
    pub description: String,
    pub applies_to: AppliesTo,
    pub restrictions: String,
    pub severity: ItemSeverity,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Partial [`RestrictedItem`]; `category` is mandatory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RestrictedItemDraft {
    pub id: Option<ReferenceId>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub applies_to: Option<AppliesTo>,
    pub restrictions: Option<String>,
    pub severity: Option<ItemSeverity>,
    pub is_active: Option<bool>,
}

impl RestrictedItem {
    /// Build a restricted item from a draft.
    pub fn create(draft: RestrictedItemDraft) -> Result<Self, ModelError> {
        let category = draft
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(ModelError::MissingField {
                entity: "RestrictedItem",
                field: "category",
            })?;
        let now = Timestamp::now();
        Ok(Self {
            id: draft.id.unwrap_or_default(),
            category,
            description: draft.description.unwrap_or_default(),
            applies_to: draft.applies_to.unwrap_or_default(),
            restrictions: draft.restrictions.unwrap_or_default(),
            severity: draft.severity.unwrap_or_default(),
            is_active: draft.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        })
    }
}

// ─── RestrictedDestination ───────────────────────────────────────────

/// A destination country shipments may not (or only conditionally) go to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestrictedDestination {
    pub id: ReferenceId,
    pub country_code: String,
    pub country_name: String,
    pub restriction_type: RestrictionType,
    pub details: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Partial [`RestrictedDestination`]; `countryCode` is mandatory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RestrictedDestinationDraft {
    pub id: Option<ReferenceId>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub restriction_type: Option<RestrictionType>,
    pub details: Option<String>,
    pub is_active: Option<bool>,
}

impl RestrictedDestination {
    /// Build a restricted destination from a draft.
    pub fn create(draft: RestrictedDestinationDraft) -> Result<Self, ModelError> {
        let country_code = country_code(draft.country_code, "RestrictedDestination")?;
        let now = Timestamp::now();
        Ok(Self {
            id: draft.id.unwrap_or_default(),
            country_name: draft.country_name.unwrap_or_else(|| country_code.clone()),
            country_code,
            restriction_type: draft.restriction_type.unwrap_or_default(),
            details: draft.details.unwrap_or_default(),
            is_active: draft.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        })
    }
}

// ─── EnhancedDocumentation ───────────────────────────────────────────

/// A destination that expects paperwork beyond the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedDocumentation {
    pub id: ReferenceId,
    pub country_code: String,
    pub country_name: String,
    pub requirements: Vec<String>,
    pub notes: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Partial [`EnhancedDocumentation`]; `countryCode` is mandatory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnhancedDocumentationDraft {
    pub id: Option<ReferenceId>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

impl EnhancedDocumentation {
    /// Build an enhanced-documentation entry from a draft.
    pub fn create(draft: EnhancedDocumentationDraft) -> Result<Self, ModelError> {
        let country_code = country_code(draft.country_code, "EnhancedDocumentation")?;
        let now = Timestamp::now();
        Ok(Self {
            id: draft.id.unwrap_or_default(),
            country_name: draft.country_name.unwrap_or_else(|| country_code.clone()),
            country_code,
            requirements: draft.requirements.unwrap_or_default(),
            notes: draft.notes.unwrap_or_default(),
            is_active: draft.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        })
    }
}

impl_record!(RequiredField, ReferenceId);
impl_record!(CountryRequirement, ReferenceId);
impl_record!(RestrictedItem, ReferenceId);
impl_record!(RestrictedDestination, ReferenceId);
impl_record!(EnhancedDocumentation, ReferenceId);

// ─── ReferenceTables ─────────────────────────────────────────────────

/// Immutable bundle of the cross-border reference tables.
///
/// Lookups only ever see active records; inactive rows are kept so a
/// snapshot can be written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceTables {
    pub required_fields: Vec<RequiredField>,
    pub country_requirements: Vec<CountryRequirement>,
    pub restricted_items: Vec<RestrictedItem>,
    pub restricted_destinations: Vec<RestrictedDestination>,
    pub enhanced_documentation: Vec<EnhancedDocumentation>,
}

impl ReferenceTables {
    /// Active required fields whose context covers international shipments.
    pub fn international_required_fields(&self) -> impl Iterator<Item = &RequiredField> {
        self.required_fields
            .iter()
            .filter(|f| f.is_active && f.context.applies_internationally())
    }

    /// Active restriction for a normalized country code.
    pub fn restricted_destination(&self, code: &str) -> Option<&RestrictedDestination> {
        self.restricted_destinations
            .iter()
            .find(|d| d.is_active && d.country_code == code)
    }

    /// Active extra field requirements for a normalized country code.
    pub fn country_requirement(&self, code: &str) -> Option<&CountryRequirement> {
        self.country_requirements
            .iter()
            .find(|r| r.is_active && r.country_code == code)
    }

    /// Active enhanced-documentation entry for a normalized country code.
    pub fn enhanced_documentation(&self, code: &str) -> Option<&EnhancedDocumentation> {
        self.enhanced_documentation
            .iter()
            .find(|d| d.is_active && d.country_code == code)
    }

    /// Active restricted items that apply to every destination.
    pub fn global_restricted_items(&self) -> impl Iterator<Item = &RestrictedItem> {
        self.restricted_items
            .iter()
            .filter(|i| i.is_active && i.applies_to == AppliesTo::All)
    }

    /// Active restricted items that explicitly name `code`.
    pub fn country_restricted_items<'a>(
        &'a self,
        code: &'a str,
    ) -> impl Iterator<Item = &'a RestrictedItem> + 'a {
        self.restricted_items
            .iter()
            .filter(move |i| i.is_active && i.applies_to.names_country(code))
    }
}
