//! # Country Normalization
//!
//! Maps free-text country names and codes to two-letter codes.
//!
//! Resolution order:
//!
//! 1. Input (trimmed, uppercased) of exactly two characters → returned as-is.
//! 2. Exact lookup of the case-folded input in [`COUNTRY_NAMES`].
//! 3. Longest table key (at least [`MIN_SUBSTRING_KEY_LEN`] characters)
//!    occurring inside the case-folded input; ties go to the earlier entry.
//! 4. Otherwise the uppercased input, unchanged (best effort).
//!
//! Case folding is uppercase-then-lowercase, so the key looked up for an
//! input is the key looked up for its own uppercased output.
//!
//! The United Kingdom normalizes to `UK`, not `GB`: names resolve to `UK`,
//! while a literal two-letter `GB` passes through rule 1 untouched. Reference
//! tables carry both codes where it matters.
//!
//! The function is pure and idempotent.

/// Name → code table. Keys are lowercase.
pub const COUNTRY_NAMES: &[(&str, &str)] = &[
    ("united states", "US"),
    ("united states of america", "US"),
    ("usa", "US"),
    ("u.s.a.", "US"),
    ("america", "US"),
    ("canada", "CA"),
    ("mexico", "MX"),
    ("united kingdom", "UK"),
    ("great britain", "UK"),
    ("britain", "UK"),
    ("england", "UK"),
    ("scotland", "UK"),
    ("wales", "UK"),
    ("germany", "DE"),
    ("deutschland", "DE"),
    ("france", "FR"),
    ("italy", "IT"),
    ("spain", "ES"),
    ("portugal", "PT"),
    ("netherlands", "NL"),
    ("holland", "NL"),
    ("belgium", "BE"),
    ("switzerland", "CH"),
    ("austria", "AT"),
    ("ireland", "IE"),
    ("sweden", "SE"),
    ("norway", "NO"),
    ("denmark", "DK"),
    ("finland", "FI"),
    ("poland", "PL"),
    ("greece", "GR"),
    ("czech republic", "CZ"),
    ("czechia", "CZ"),
    ("hungary", "HU"),
    ("romania", "RO"),
    ("ukraine", "UA"),
    ("belarus", "BY"),
    ("russia", "RU"),
    ("russian federation", "RU"),
    ("turkey", "TR"),
    ("china", "CN"),
    ("people's republic of china", "CN"),
    ("hong kong", "HK"),
    ("taiwan", "TW"),
    ("japan", "JP"),
    ("south korea", "KR"),
    ("republic of korea", "KR"),
    ("korea", "KR"),
    ("north korea", "KP"),
    ("democratic people's republic of korea", "KP"),
    ("india", "IN"),
    ("pakistan", "PK"),
    ("bangladesh", "BD"),
    ("indonesia", "ID"),
    ("malaysia", "MY"),
    ("singapore", "SG"),
    ("thailand", "TH"),
    ("vietnam", "VN"),
    ("viet nam", "VN"),
    ("philippines", "PH"),
    ("australia", "AU"),
    ("new zealand", "NZ"),
    ("brazil", "BR"),
    ("argentina", "AR"),
    ("chile", "CL"),
    ("colombia", "CO"),
    ("peru", "PE"),
    ("venezuela", "VE"),
    ("cuba", "CU"),
    ("iran", "IR"),
    ("islamic republic of iran", "IR"),
    ("iraq", "IQ"),
    ("syria", "SY"),
    ("syrian arab republic", "SY"),
    ("saudi arabia", "SA"),
    ("united arab emirates", "AE"),
    ("uae", "AE"),
    ("israel", "IL"),
    ("egypt", "EG"),
    ("nigeria", "NG"),
    ("niger", "NE"),
    ("south africa", "ZA"),
    ("kenya", "KE"),
    ("morocco", "MA"),
];

/// Keys shorter than this are only matched exactly, never as substrings
/// ("usa" would otherwise match "Jerusalem").
pub const MIN_SUBSTRING_KEY_LEN: usize = 4;

/// Normalize a free-text country name or code to a two-letter code.
///
/// ```
/// use shipcomply_core::normalize_country;
///
/// assert_eq!(normalize_country("us"), "US");
/// assert_eq!(normalize_country("United States"), "US");
/// assert_eq!(normalize_country("Great Britain"), "UK");
/// assert_eq!(normalize_country("Shipping to Germany"), "DE");
/// assert_eq!(normalize_country("Atlantis"), "ATLANTIS");
/// ```
pub fn normalize_country(input: &str) -> String {
    let upper = input.trim().to_uppercase();
    if upper.chars().count() == 2 {
        return upper;
    }

    let key = upper.to_lowercase();
    if let Some((_, code)) = COUNTRY_NAMES.iter().find(|(name, _)| *name == key) {
        return (*code).to_string();
    }

    let mut best: Option<(&str, &str)> = None;
    for (name, code) in COUNTRY_NAMES {
        if name.len() < MIN_SUBSTRING_KEY_LEN || !key.contains(name) {
            continue;
        }
        if best.map_or(true, |(current, _)| name.len() > current.len()) {
            best = Some((name, code));
        }
    }
    if let Some((_, code)) = best {
        return code.to_string();
    }

    upper
}

/// Two-letter code for a table name, if `name` is exactly a table key.
pub fn code_for_name(name: &str) -> Option<&'static str> {
    let key = fold(name.trim());
    COUNTRY_NAMES
        .iter()
        .find(|(table_key, _)| *table_key == key)
        .map(|(_, code)| *code)
}

fn fold(text: &str) -> String {
    text.to_uppercase().to_lowercase()
}
