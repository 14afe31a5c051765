//! # Shipment Field Map
//!
//! A shipment is an open map from field key to string value. Keys are not
//! constrained to the rule catalog: hosts send whatever their extraction
//! produced, and the engines look fields up by exact key, by
//! case-insensitive key, or through a variation table.
//!
//! JSON input may carry numbers and booleans; they are stored in their
//! JSON text form (`2.5`, `true`). `null` is stored as an empty value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field key → value map for one shipment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, FieldValue>", into = "BTreeMap<String, String>")]
pub struct Shipment {
    fields: BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldValue {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
    Null(()),
}

impl From<FieldValue> for String {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Text(s) => s,
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Flag(b) => b.to_string(),
            FieldValue::Null(()) => String::new(),
        }
    }
}

impl From<BTreeMap<String, FieldValue>> for Shipment {
    fn from(raw: BTreeMap<String, FieldValue>) -> Self {
        Self {
            fields: raw.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }
}

impl From<Shipment> for BTreeMap<String, String> {
    fn from(shipment: Shipment) -> Self {
        shipment.fields
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Shipment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Shipment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Value stored under exactly `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Value under `key`, or the empty string.
    pub fn value(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    /// First non-blank value whose key equals `key` ignoring ASCII case.
    /// An exact key match wins over a case-folded one.
    pub fn get_ignore_case(&self, key: &str) -> Option<&str> {
        if let Some(v) = self.get(key).filter(|v| !v.trim().is_empty()) {
            return Some(v);
        }
        self.fields
            .iter()
            .find(|(k, v)| k.eq_ignore_ascii_case(key) && !v.trim().is_empty())
            .map(|(_, v)| v.as_str())
    }

    /// Whether `key` exists with a non-blank value. Exact key only.
    pub fn is_present(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.trim().is_empty())
    }

    /// Whether `key` exists with a non-blank value, ignoring ASCII case.
    pub fn is_present_ignore_case(&self, key: &str) -> bool {
        self.get_ignore_case(key).is_some()
    }

    /// All fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Turn a field key into a display label.
///
/// `recipientCountry` → `Recipient Country`, `hs_code` → `Hs Code`.
/// A new word starts at an uppercase letter that follows a lowercase letter
/// or digit, and at every `_`, `-` or space.
pub fn humanize_field_key(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in key.trim().chars() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(ch);
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humanizes_camel_case() {
        assert_eq!(humanize_field_key("recipientCountry"), "Recipient Country");
        assert_eq!(humanize_field_key("declaredValue"), "Declared Value");
        assert_eq!(humanize_field_key("weight"), "Weight");
        assert_eq!(humanize_field_key("hs_code"), "Hs Code");
        assert_eq!(humanize_field_key("EORI"), "EORI");
    }

    #[test]
    fn json_scalars_become_strings() {
        let shipment: Shipment =
            serde_json::from_str(r#"{"weight": 2.5, "insured": true, "notes": null, "carrier": "DHL"}"#)
                .unwrap();
        assert_eq!(shipment.value("weight"), "2.5");
        assert_eq!(shipment.value("insured"), "true");
        assert_eq!(shipment.value("notes"), "");
        assert_eq!(shipment.value("carrier"), "DHL");
    }

    #[test]
    fn presence_ignores_blank_values() {
        let shipment = Shipment::new().with("weight", "  ").with("Carrier", "UPS");
        assert!(!shipment.is_present("weight"));
        assert!(!shipment.is_present("carrier"));
        assert!(shipment.is_present_ignore_case("carrier"));
        assert_eq!(shipment.get_ignore_case("CARRIER"), Some("UPS"));
    }

    #[test]
    fn serializes_as_plain_map() {
        let shipment: Shipment = [("a", "1")].into_iter().collect();
        assert_eq!(serde_json::to_string(&shipment).unwrap(), r#"{"a":"1"}"#);
    }
}
