//! # Default Catalog
//!
//! Built-in categories, field rules, constraints and cross-border reference
//! tables. The loader writes these into an empty store; the cross-border
//! engine falls back to [`reference_tables`] when the store cannot be read.

use shipcomply_core::{
    AppliesTo, CategoryDraft, ComplianceRule, ConstraintDraft, ConstraintType,
    CountryRequirement, CountryRequirementDraft, EnhancedDocumentation,
    EnhancedDocumentationDraft, FieldContext, FieldType, ItemSeverity, ModelError,
    ReferenceTables, RequiredField, RequiredFieldDraft, RestrictedDestination,
    RestrictedDestinationDraft, RestrictedItem, RestrictedItemDraft, RestrictionType, RuleCategory,
    RuleDraft, TransformKind, ValidationConstraint, ValidationLevel,
};

use FieldType::{Date, Number, Regex, Select, Text};
use TransformKind as T;

pub const SHIPPING_INFORMATION: &str = "Shipping Information";
pub const PACKAGE_DETAILS: &str = "Package Details";
pub const ADDRESS_INFORMATION: &str = "Address Information";
pub const CUSTOMS_INTERNATIONAL: &str = "Customs & International";

const CATEGORIES: &[(&str, &str)] = &[
    (SHIPPING_INFORMATION, "Carrier, service and tracking details"),
    (PACKAGE_DETAILS, "Physical description of the package"),
    (ADDRESS_INFORMATION, "Shipper and recipient parties"),
    (CUSTOMS_INTERNATIONAL, "Customs declaration and cross-border data"),
];

struct RuleSeed {
    category: &'static str,
    field_key: &'static str,
    field_type: FieldType,
    required: bool,
    pattern: &'static str,
    message: &'static str,
    example: &'static str,
    transform: Option<TransformKind>,
}

#[allow(clippy::too_many_arguments)]
const fn seed(
    category: &'static str,
    field_key: &'static str,
    field_type: FieldType,
    required: bool,
    pattern: &'static str,
    message: &'static str,
    example: &'static str,
    transform: Option<TransformKind>,
) -> RuleSeed {
    RuleSeed {
        category,
        field_key,
        field_type,
        required,
        pattern,
        message,
        example,
        transform,
    }
}

#[rustfmt::skip]
const RULES: &[RuleSeed] = &[
    seed(SHIPPING_INFORMATION, "trackingNumber", Regex, true,
        r"^[A-Za-z0-9][A-Za-z0-9 \-]{6,38}[A-Za-z0-9]$",
        "Tracking number must be 8-40 letters or digits", "1Z999AA10123456784", Some(T::Trim)),
    seed(SHIPPING_INFORMATION, "orderNumber", Text, false,
        r"^[A-Za-z0-9#_\-]{1,50}$",
        "Order number may contain letters, digits, #, _ and -", "ORD-2024-0001", Some(T::Trim)),
    seed(SHIPPING_INFORMATION, "shipDate", Date, true,
        r"^\d{4}-\d{2}-\d{2}$",
        "Ship date must be a valid date (YYYY-MM-DD)", "2024-03-15", Some(T::NormalizeDateIso)),
    seed(SHIPPING_INFORMATION, "carrier", Text, true,
        r"^[A-Za-z0-9][A-Za-z0-9 &.\-]{1,49}$",
        "Carrier name is invalid", "DHL Express", Some(T::Trim)),
    seed(SHIPPING_INFORMATION, "serviceType", Text, false,
        r"^[A-Za-z0-9][A-Za-z0-9 _\-]{1,49}$",
        "Service type is invalid", "International Priority", None),
    seed(PACKAGE_DETAILS, "weight", Number, true,
        r"(?i)^\d+(\.\d+)?\s*(kg|g|lb|lbs|oz)$",
        "Weight must be a number followed by kg, g, lb, lbs or oz", "2.5 kg", Some(T::NormalizeWeight)),
    seed(PACKAGE_DETAILS, "dimensions", Text, false,
        r"(?i)^\d+(\.\d+)?\s*x\s*\d+(\.\d+)?\s*x\s*\d+(\.\d+)?\s*(cm|mm|m|in)?$",
        "Dimensions must look like L x W x H unit", "30 x 20 x 10 cm", Some(T::NormalizeDimensions)),
    seed(PACKAGE_DETAILS, "packageType", Select, false,
        r"(?i)^(box|envelope|pak|tube|pallet|crate|bag|other)$",
        "Package type must be one of box, envelope, pak, tube, pallet, crate, bag, other", "box", Some(T::Lowercase)),
    seed(PACKAGE_DETAILS, "packageCount", Number, false,
        r"^\d{1,4}$",
        "Package count must be a whole number", "1", Some(T::Trim)),
    seed(PACKAGE_DETAILS, "packageContents", Text, false,
        r"^.{2,500}$",
        "Package contents must be 2-500 characters", "Cotton t-shirts", Some(T::Trim)),
    seed(ADDRESS_INFORMATION, "shipperName", Text, true,
        r"^.{2,100}$",
        "Shipper name must be 2-100 characters", "Acme Exports Ltd", Some(T::Trim)),
    seed(ADDRESS_INFORMATION, "shipperAddress", Text, true,
        r"^.{5,250}$",
        "Shipper address must be 5-250 characters", "12 Harbour Road, Leeds LS1 4AP", Some(T::Trim)),
    seed(ADDRESS_INFORMATION, "shipperCountry", Regex, true,
        r"^[A-Z]{2}$",
        "Shipper country must be a 2-letter country code", "UK", Some(T::Uppercase2LetterCode)),
    seed(ADDRESS_INFORMATION, "recipientName", Text, true,
        r"^.{2,100}$",
        "Recipient name must be 2-100 characters", "Jane Smith", Some(T::Trim)),
    seed(ADDRESS_INFORMATION, "recipientAddress", Text, true,
        r"^.{5,250}$",
        "Recipient address must be 5-250 characters", "350 Fifth Avenue, New York, NY 10118", Some(T::Trim)),
    seed(ADDRESS_INFORMATION, "recipientCountry", Regex, true,
        r"^[A-Z]{2}$",
        "Recipient country must be a 2-letter country code", "US", Some(T::Uppercase2LetterCode)),
    seed(ADDRESS_INFORMATION, "recipientPhone", Text, false,
        r"^\+?[0-9][0-9 ().\-]{6,19}$",
        "Recipient phone must be 7-20 digits, optionally starting with +", "+1 212 555 0100", Some(T::Trim)),
    seed(CUSTOMS_INTERNATIONAL, "declaredValue", Number, false,
        r"^\d+(\.\d{1,2})?$",
        "Declared value must be an amount with up to 2 decimals", "125.00", Some(T::Trim)),
    seed(CUSTOMS_INTERNATIONAL, "currency", Regex, false,
        r"^[A-Z]{3}$",
        "Currency must be a 3-letter ISO 4217 code", "USD", Some(T::Uppercase)),
    seed(CUSTOMS_INTERNATIONAL, "commodityCode", Regex, false,
        r"^\d{6,10}$",
        "Commodity code must be a 6-10 digit HS code", "847130", Some(T::DigitsOnly)),
    seed(CUSTOMS_INTERNATIONAL, "countryOfOrigin", Regex, false,
        r"^[A-Z]{2}$",
        "Country of origin must be a 2-letter country code", "CN", Some(T::Uppercase2LetterCode)),
    seed(CUSTOMS_INTERNATIONAL, "eoriNumber", Regex, false,
        r"^[A-Z]{2}[A-Z0-9]{1,15}$",
        "EORI number must be a 2-letter country prefix followed by up to 15 characters", "GB123456789000", Some(T::Uppercase)),
];

/// (field key, type, value, level, message).
#[rustfmt::skip]
const CONSTRAINTS: &[(&str, ConstraintType, &str, ValidationLevel, &str)] = &[
    ("weight", ConstraintType::Min, "0.1", ValidationLevel::Error, "Weight must be at least 0.1"),
    ("weight", ConstraintType::Max, "1000", ValidationLevel::Warning, "Weight above 1000 may require freight service"),
    ("declaredValue", ConstraintType::Min, "0", ValidationLevel::Error, "Declared value cannot be negative"),
    ("packageCount", ConstraintType::Min, "1", ValidationLevel::Error, "Package count must be at least 1"),
];

/// Categories, rules and constraints of the default catalog.
#[derive(Debug, Clone)]
pub struct DefaultCatalog {
    pub categories: Vec<RuleCategory>,
    pub rules: Vec<ComplianceRule>,
    pub constraints: Vec<ValidationConstraint>,
}

/// Build the default rule catalog with fresh ids.
pub fn rule_catalog() -> Result<DefaultCatalog, ModelError> {
    let categories = CATEGORIES
        .iter()
        .zip(1..)
        .map(|(&(name, description), priority)| {
            RuleCategory::create(CategoryDraft {
                name: Some(name.to_string()),
                description: Some(description.to_string()),
                priority: Some(priority),
                ..Default::default()
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut rules = Vec::with_capacity(RULES.len());
    for (seed, priority) in RULES.iter().zip(1..) {
        let category = categories
            .iter()
            .find(|c| c.name == seed.category)
            .ok_or(ModelError::MissingField {
                entity: "ComplianceRule",
                field: "categoryId",
            })?;
        rules.push(ComplianceRule::create(RuleDraft {
            category_id: Some(category.id),
            field_key: Some(seed.field_key.to_string()),
            field_type: Some(seed.field_type),
            is_required: Some(seed.required),
            validation_pattern: Some(seed.pattern.to_string()),
            validation_message: Some(seed.message.to_string()),
            example_value: Some(seed.example.to_string()),
            transform_function: seed.transform,
            priority: Some(priority),
            ..Default::default()
        })?);
    }

    let mut constraints = Vec::with_capacity(CONSTRAINTS.len());
    for &(field_key, constraint_type, value, level, message) in CONSTRAINTS {
        let rule = rules
            .iter()
            .find(|r| r.field_key == field_key)
            .ok_or(ModelError::MissingField {
                entity: "ValidationConstraint",
                field: "ruleId",
            })?;
        constraints.push(ValidationConstraint::create(ConstraintDraft {
            rule_id: Some(rule.id),
            constraint_type: Some(constraint_type),
            constraint_value: Some(value.to_string()),
            validation_level: Some(level),
            error_message: Some(message.to_string()),
            ..Default::default()
        })?);
    }

    Ok(DefaultCatalog {
        categories,
        rules,
        constraints,
    })
}

// ─── Cross-border reference data ─────────────────────────────────────

const INTERNATIONAL_FIELDS: &[(&str, &str)] = &[
    ("declaredValue", "Value of the goods for customs assessment"),
    ("currency", "Currency of the declared value"),
    ("packageContents", "Description of the goods"),
    ("commodityCode", "Harmonized System tariff code"),
    ("countryOfOrigin", "Country where the goods were produced"),
    ("weight", "Gross weight of the shipment"),
];

/// (code, name, required field keys, description, notes). Country names
/// normalize to `UK`; the ISO `GB` is listed as well.
#[rustfmt::skip]
const COUNTRY_REQUIREMENTS: &[(&str, &str, &[&str], &str, &str)] = &[
    ("BR", "Brazil", &["recipientTaxId"], "Recipient CPF or CNPJ is mandatory", "Shipments without a tax id are returned"),
    ("CN", "China", &["recipientPhone", "recipientTaxId"], "Recipient phone and resident id for customs clearance", ""),
    ("IN", "India", &["recipientTaxId", "commodityCode"], "GSTIN or PAN for commercial shipments", "Personal imports need KYC documents"),
    ("UK", "United Kingdom", &["eoriNumber"], "EORI number for commercial imports", ""),
    ("GB", "United Kingdom", &["eoriNumber"], "EORI number for commercial imports", ""),
    ("CA", "Canada", &["commodityCode"], "HS code on the commercial invoice", ""),
    ("AU", "Australia", &["recipientPhone"], "Recipient contact for biosecurity enquiries", ""),
];

#[rustfmt::skip]
const RESTRICTED_DESTINATIONS: &[(&str, &str, RestrictionType, &str)] = &[
    ("CU", "Cuba", RestrictionType::Embargoed, "Comprehensive trade embargo"),
    ("IR", "Iran", RestrictionType::Embargoed, "Comprehensive trade embargo"),
    ("KP", "North Korea", RestrictionType::Embargoed, "Comprehensive trade embargo"),
    ("SY", "Syria", RestrictionType::Embargoed, "Comprehensive trade embargo"),
    ("RU", "Russia", RestrictionType::Sanctions, "Sectoral sanctions and export controls"),
    ("BY", "Belarus", RestrictionType::Sanctions, "Sectoral sanctions and export controls"),
    ("VE", "Venezuela", RestrictionType::Sanctions, "Targeted sanctions; screen parties"),
];

/// (category, countries or empty for all, severity, description).
#[rustfmt::skip]
const RESTRICTED_ITEMS: &[(&str, &[&str], ItemSeverity, &str)] = &[
    ("firearms", &[], ItemSeverity::Prohibited, "Guns, rifles and their major components"),
    ("ammunition", &[], ItemSeverity::Prohibited, "Cartridges, shells and propellant"),
    ("explosives", &[], ItemSeverity::Prohibited, "Fireworks, detonators and blasting agents"),
    ("narcotics", &[], ItemSeverity::Prohibited, "Controlled drugs and precursors"),
    ("radioactive materials", &[], ItemSeverity::Prohibited, "Radioactive sources and waste"),
    ("counterfeit goods", &[], ItemSeverity::Prohibited, "Items infringing trademarks"),
    ("hazardous chemicals", &[], ItemSeverity::Restricted, "Corrosive, toxic or flammable chemicals"),
    ("ivory", &[], ItemSeverity::Prohibited, "Elephant ivory and products"),
    ("live animals", &[], ItemSeverity::Restricted, "Live animals of any kind"),
    ("chewing gum", &["SG"], ItemSeverity::Prohibited, "Import of chewing gum is banned"),
    ("e-cigarettes", &["SG", "TH", "IN", "BR"], ItemSeverity::Prohibited, "Vaping devices and refills"),
    ("alcohol", &["SA", "KW"], ItemSeverity::Prohibited, "Alcoholic beverages"),
    ("pork products", &["SA"], ItemSeverity::Prohibited, "Pork and pork derivatives"),
    ("drones", &["IN", "MA"], ItemSeverity::Restricted, "Unmanned aircraft need an import licence"),
    ("seeds", &["AU", "NZ"], ItemSeverity::Controlled, "Plant material needs a phytosanitary certificate"),
];

#[rustfmt::skip]
const ENHANCED_DOCUMENTATION: &[(&str, &str, &[&str], &str)] = &[
    ("BR", "Brazil", &["Commercial invoice in Portuguese", "Recipient CPF/CNPJ"], "Customs inspections are frequent"),
    ("IN", "India", &["Commercial invoice", "Import export code for businesses"], ""),
    ("CN", "China", &["Commercial invoice", "Packing list"], "Some goods need CCC certification"),
    ("RU", "Russia", &["Commercial invoice", "Passport data of recipient"], "Subject to sanctions screening"),
    ("SA", "Saudi Arabia", &["Certificate of origin", "Commercial invoice"], "Invoice must be certified"),
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Build the default cross-border reference tables with fresh ids.
pub fn reference_tables() -> Result<ReferenceTables, ModelError> {
    let required_fields = INTERNATIONAL_FIELDS
        .iter()
        .map(|&(key, description)| {
            RequiredField::create(RequiredFieldDraft {
                field_key: Some(key.to_string()),
                description: Some(description.to_string()),
                context: Some(FieldContext::International),
                ..Default::default()
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let country_requirements = COUNTRY_REQUIREMENTS
        .iter()
        .map(|&(code, name, fields, description, notes)| {
            CountryRequirement::create(CountryRequirementDraft {
                country_code: Some(code.to_string()),
                country_name: Some(name.to_string()),
                required_fields: Some(strings(fields)),
                description: Some(description.to_string()),
                documentation_notes: Some(notes.to_string()),
                ..Default::default()
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let restricted_items = RESTRICTED_ITEMS
        .iter()
        .map(|&(category, countries, severity, description)| {
            let applies_to = if countries.is_empty() {
                AppliesTo::All
            } else {
                AppliesTo::countries(countries)
            };
            RestrictedItem::create(RestrictedItemDraft {
                category: Some(category.to_string()),
                description: Some(description.to_string()),
                applies_to: Some(applies_to),
                severity: Some(severity),
                ..Default::default()
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let restricted_destinations = RESTRICTED_DESTINATIONS
        .iter()
        .map(|&(code, name, restriction_type, details)| {
            RestrictedDestination::create(RestrictedDestinationDraft {
                country_code: Some(code.to_string()),
                country_name: Some(name.to_string()),
                restriction_type: Some(restriction_type),
                details: Some(details.to_string()),
                ..Default::default()
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let enhanced_documentation = ENHANCED_DOCUMENTATION
        .iter()
        .map(|&(code, name, requirements, notes)| {
            EnhancedDocumentation::create(EnhancedDocumentationDraft {
                country_code: Some(code.to_string()),
                country_name: Some(name.to_string()),
                requirements: Some(strings(requirements)),
                notes: Some(notes.to_string()),
                ..Default::default()
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ReferenceTables {
        required_fields,
        country_requirements,
        restricted_items,
        restricted_destinations,
        enhanced_documentation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_shape() {
        let catalog = rule_catalog().unwrap();
        assert_eq!(catalog.categories.len(), 4);
        assert_eq!(catalog.rules.len(), 22);
        assert_eq!(catalog.constraints.len(), 4);

        let keys: HashSet<_> = catalog.rules.iter().map(|r| r.field_key.as_str()).collect();
        assert_eq!(keys.len(), catalog.rules.len(), "field keys are unique");
        for key in ["trackingNumber", "weight", "recipientCountry", "eoriNumber"] {
            assert!(keys.contains(key), "missing {key}");
        }
    }

    #[test]
    fn test_every_default_pattern_compiles_and_matches_its_example() {
        let catalog = rule_catalog().unwrap();
        for rule in &catalog.rules {
            let re = regex::Regex::new(&rule.validation_pattern).unwrap();
            assert!(
                re.is_match(&rule.example_value),
                "{} example {:?} fails its pattern",
                rule.field_key,
                rule.example_value
            );
        }
    }

    #[test]
    fn test_reference_tables_contents() {
        let tables = reference_tables().unwrap();
        assert!(tables.restricted_destination("CU").is_some());
        assert!(tables.restricted_destination("KP").is_some());
        assert!(tables.enhanced_documentation("BR").is_some());
        assert_eq!(tables.international_required_fields().count(), 6);
        let global: Vec<_> = tables
            .global_restricted_items()
            .map(|i| i.category.as_str())
            .collect();
        assert!(global.contains(&"firearms"));
        assert!(!global.contains(&"chewing gum"));
        assert_eq!(tables.country_restricted_items("SG").count(), 2);
    }
}
