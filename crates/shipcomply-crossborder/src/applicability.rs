//! # International Applicability
//!
//! A shipment is international when any of these holds, checked in order:
//!
//! 1. Shipper and recipient countries are both present and normalize to
//!    different codes.
//! 2. A customs-indicative field is present.
//! 3. Address or service text contains an international keyword or a
//!    recognized international carrier phrase.
//! 4. Address text names a country whose code differs from every known
//!    shipper or recipient country. With no country known, names in
//!    addresses are not evidence.

use serde::Serialize;
use shipcomply_core::{normalize_country, Shipment};

use crate::indicators::{
    country_codes_in, find_carrier_phrase, find_keyword, lookup, CUSTOMS_FIELDS,
    RECIPIENT_COUNTRY, SHIPPER_COUNTRY, TEXT_FIELDS,
};

/// Why a shipment was judged international.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "signal", rename_all = "camelCase")]
pub enum InternationalSignal {
    DifferentCountries { shipper: String, recipient: String },
    CustomsField { field: String },
    Keyword { field: String, keyword: String },
    CarrierPhrase { field: String, phrase: String },
    ForeignCountry { field: String, country: String },
}

/// Normalized shipper and recipient codes, when present.
pub fn party_countries(shipment: &Shipment) -> (Option<String>, Option<String>) {
    let code = |key| {
        lookup(shipment, key)
            .map(normalize_country)
            .filter(|c| !c.is_empty())
    };
    (code(SHIPPER_COUNTRY), code(RECIPIENT_COUNTRY))
}

/// The first signal that makes `shipment` international, if any.
pub fn detect(shipment: &Shipment) -> Option<InternationalSignal> {
    let (shipper, recipient) = party_countries(shipment);

    if let (Some(s), Some(r)) = (&shipper, &recipient) {
        if s != r {
            return Some(InternationalSignal::DifferentCountries {
                shipper: s.clone(),
                recipient: r.clone(),
            });
        }
    }

    if let Some(field) = CUSTOMS_FIELDS
        .iter()
        .find(|key| shipment.is_present_ignore_case(key))
    {
        return Some(InternationalSignal::CustomsField {
            field: field.to_string(),
        });
    }

    let texts: Vec<(&str, &str)> = TEXT_FIELDS
        .iter()
        .filter_map(|key| shipment.get_ignore_case(key).map(|v| (*key, v)))
        .collect();

    for &(field, text) in &texts {
        if let Some(keyword) = find_keyword(text) {
            return Some(InternationalSignal::Keyword {
                field: field.to_string(),
                keyword,
            });
        }
        if let Some(phrase) = find_carrier_phrase(text) {
            return Some(InternationalSignal::CarrierPhrase {
                field: field.to_string(),
                phrase: phrase.to_string(),
            });
        }
    }

    let known: Vec<&str> = shipper.iter().chain(recipient.iter()).map(String::as_str).collect();
    if known.is_empty() {
        return None;
    }
    for &(field, text) in &texts {
        if let Some(code) = country_codes_in(text)
            .into_iter()
            .find(|code| !known.contains(code))
        {
            return Some(InternationalSignal::ForeignCountry {
                field: field.to_string(),
                country: code.to_string(),
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domestic() -> Shipment {
        Shipment::new()
            .with("shipperCountry", "US")
            .with("recipientCountry", "United States")
            .with("shipperAddress", "1 Infinite Loop, Cupertino, CA")
            .with("recipientAddress", "350 Fifth Avenue, New York, NY")
            .with("serviceType", "Ground")
    }

    #[test]
    fn same_country_without_indicators_is_domestic() {
        assert_eq!(detect(&domestic()), None);
    }

    #[test]
    fn different_countries_after_normalization() {
        let s = domestic().with("recipientCountry", "Germany");
        assert_eq!(
            detect(&s),
            Some(InternationalSignal::DifferentCountries {
                shipper: "US".into(),
                recipient: "DE".into()
            })
        );
    }

    #[test]
    fn customs_field_is_enough() {
        let s = domestic().with("hsCode", "847130");
        assert!(matches!(
            detect(&s),
            Some(InternationalSignal::CustomsField { .. })
        ));
        let blank = domestic().with("hsCode", "  ");
        assert_eq!(detect(&blank), None);
    }

    #[test]
    fn service_text_keyword_or_phrase() {
        let s = domestic().with("serviceType", "Duties paid");
        assert!(matches!(detect(&s), Some(InternationalSignal::Keyword { .. })));
        let s = domestic().with("serviceType", "Express Worldwide");
        assert!(matches!(detect(&s), Some(InternationalSignal::Keyword { .. })));
        let s = domestic().with("serviceType", "Parcelforce Global Priority");
        assert!(matches!(
            detect(&s),
            Some(InternationalSignal::CarrierPhrase { .. })
        ));
    }

    #[test]
    fn foreign_country_in_address() {
        let s = domestic().with("recipientAddress", "10 Downing Street, London, England");
        assert_eq!(
            detect(&s),
            Some(InternationalSignal::ForeignCountry {
                field: "recipientAddress".into(),
                country: "UK".into()
            })
        );
        let same = domestic().with("recipientAddress", "Springfield, United States");
        assert_eq!(detect(&same), None);
    }

    #[test]
    fn country_names_need_a_known_party_country() {
        let s = Shipment::new().with("recipientAddress", "Berlin, Germany");
        assert_eq!(detect(&s), None);
    }
}
