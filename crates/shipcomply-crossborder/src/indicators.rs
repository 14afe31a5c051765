//! # International Indicators and Field Lookup
//!
//! Fixed vocabularies used to decide whether a shipment crosses a border,
//! and the field-name variation table used when checking required
//! international fields.
//!
//! Text indicators are matched on word boundaries, so "import" does not
//! fire on "Importance Street". Restricted-item keywords use plain
//! substring matching after [`normalize_text`].

use std::sync::OnceLock;

use regex::Regex;
use shipcomply_core::country::{code_for_name, COUNTRY_NAMES, MIN_SUBSTRING_KEY_LEN};
use shipcomply_core::Shipment;

/// Words in address or service text that mark a shipment international.
pub const INTERNATIONAL_KEYWORDS: &[&str] = &[
    "international",
    "intl",
    "customs",
    "duty",
    "duties",
    "overseas",
    "abroad",
    "export",
    "import",
    "cross-border",
    "worldwide",
];

/// Carrier service names that only exist for international shipping.
pub const CARRIER_PHRASES: &[&str] = &[
    "express worldwide",
    "worldwide express",
    "worldwide saver",
    "international priority",
    "international economy",
    "international first",
    "priority mail international",
    "first-class package international",
    "global express guaranteed",
    "parcelforce global",
    "international tracked",
];

/// Fields whose mere presence implies a customs declaration.
pub const CUSTOMS_FIELDS: &[&str] = &[
    "customsInfo",
    "customsDeclaration",
    "customsValue",
    "tariffNumber",
    "tariffCode",
    "hsCode",
    "hsTariffNumber",
    "eoriNumber",
    "declaredValue",
];

/// Free-text fields scanned for indicators and foreign country names.
pub const TEXT_FIELDS: &[&str] = &[
    "shipperAddress",
    "recipientAddress",
    "serviceType",
    "shippingService",
    "service",
    "carrier",
];

/// Fields that may hold the package contents description, in lookup order.
pub const CONTENTS_FIELDS: &[&str] = &[
    "packageContents",
    "contents",
    "itemDescription",
    "goodsDescription",
    "commodityDescription",
    "description",
];

pub const SHIPPER_COUNTRY: &str = "shipperCountry";
pub const RECIPIENT_COUNTRY: &str = "recipientCountry";

/// Known alternative names per canonical field key.
#[rustfmt::skip]
pub const FIELD_VARIATIONS: &[(&str, &[&str])] = &[
    ("weight", &["gross_weight", "grossWeight", "shippingweight", "shipping_weight", "packageWeight", "wt"]),
    ("declaredValue", &["declared_value", "customsValue", "customs_value", "invoiceValue", "value"]),
    ("currency", &["currencyCode", "currency_code", "curr"]),
    ("packageContents", &["contents", "package_contents", "itemDescription", "goodsDescription", "description"]),
    ("commodityCode", &["hsCode", "hs_code", "tariffNumber", "tariffCode", "harmonizedCode"]),
    ("countryOfOrigin", &["originCountry", "origin_country", "country_of_origin", "origin"]),
    ("recipientPhone", &["phone", "phoneNumber", "recipient_phone", "contactPhone"]),
    ("eoriNumber", &["eori", "eori_number"]),
    ("recipientCountry", &["destinationCountry", "toCountry", "recipient_country"]),
    ("shipperCountry", &["senderCountry", "fromCountry", "shipper_country"]),
];

/// Alternative names for `key`; empty when it has none.
pub fn variations(key: &str) -> &'static [&'static str] {
    FIELD_VARIATIONS
        .iter()
        .find(|(canonical, _)| *canonical == key)
        .map(|(_, names)| *names)
        .unwrap_or(&[])
}

/// Non-blank value of `key` by exact name, then ignoring case, then through
/// the variation table.
pub fn lookup<'a>(shipment: &'a Shipment, key: &str) -> Option<&'a str> {
    shipment.get_ignore_case(key).or_else(|| {
        variations(key)
            .iter()
            .find_map(|alt| shipment.get_ignore_case(alt))
    })
}

/// Presence by exact key, case-insensitive key, then known variations.
pub fn has_field(shipment: &Shipment, key: &str) -> bool {
    lookup(shipment, key).is_some()
}

/// First present contents field and its value.
pub fn contents(shipment: &Shipment) -> Option<(&'static str, &str)> {
    CONTENTS_FIELDS
        .iter()
        .find_map(|key| shipment.get_ignore_case(key).map(|v| (*key, v)))
}

fn keyword_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| word_alternation(INTERNATIONAL_KEYWORDS.iter().copied()))
        .as_ref()
}

fn country_name_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        word_alternation(
            COUNTRY_NAMES
                .iter()
                .map(|(name, _)| *name)
                .filter(|name| name.len() >= MIN_SUBSTRING_KEY_LEN),
        )
    })
    .as_ref()
}

/// Case-insensitive, word-bounded alternation. Longer words are tried
/// first so "united states of america" wins over "united states".
fn word_alternation<'a>(words: impl Iterator<Item = &'a str>) -> Option<Regex> {
    let mut words: Vec<&str> = words.collect();
    words.sort_by(|a, b| b.len().cmp(&a.len()));
    let body = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{body})\b")).ok()
}

/// First international keyword in `text`, lowercased.
pub fn find_keyword(text: &str) -> Option<String> {
    keyword_re()?
        .find(text)
        .map(|m| m.as_str().to_lowercase())
}

/// First international carrier phrase contained in `text`.
pub fn find_carrier_phrase(text: &str) -> Option<&'static str> {
    let normalized = normalize_text(text);
    CARRIER_PHRASES
        .iter()
        .copied()
        .find(|phrase| normalized.contains(&normalize_text(phrase)))
}

/// Codes of every country named in `text`, in order of appearance.
pub fn country_codes_in(text: &str) -> Vec<&'static str> {
    let Some(re) = country_name_re() else {
        return Vec::new();
    };
    re.find_iter(text)
        .filter_map(|m| code_for_name(m.as_str()))
        .collect()
}

/// Lowercase, punctuation to spaces, whitespace collapsed.
pub fn normalize_text(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Categories from `categories` that occur in `text`, after normalizing
/// both sides. Keeps the input order and drops repeats.
pub fn keyword_hits<'a>(text: &str, categories: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let haystack = normalize_text(text);
    let mut hits: Vec<String> = Vec::new();
    for category in categories {
        let needle = normalize_text(category);
        if needle.is_empty() || !haystack.contains(&needle) {
            continue;
        }
        if !hits.iter().any(|h| h.eq_ignore_ascii_case(category)) {
            hits.push(category.to_string());
        }
    }
    hits
}

/// Keyword hits first, then classifier labels not already present
/// (ignoring case).
pub fn union_hits(keyword: Vec<String>, classifier: Vec<String>) -> Vec<String> {
    let mut merged = keyword;
    for label in classifier {
        if !merged.iter().any(|h| h.eq_ignore_ascii_case(&label)) {
            merged.push(label);
        }
    }
    merged
}
