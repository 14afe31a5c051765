//! # Prompt Construction
//!
//! The question asked of the model is fixed here. Callers only supply the
//! package text, an optional destination hint and the category labels they
//! already screen for by keyword.

use crate::ClassificationRequest;

const INSTRUCTIONS: &str = "\
You screen parcel content descriptions for goods that are prohibited or \
restricted in international shipping.

Flag an item only if it is clearly one of:
- firearms, firearm parts, replicas or named weapon models
- ammunition, explosives, fireworks or detonators
- narcotics, controlled drugs or their precursors
- radioactive, toxic, corrosive or otherwise hazardous materials
- counterfeit branded goods
- protected wildlife products such as ivory, and live animals

Do NOT flag ordinary medicines, vitamins, consumer electronics, batteries \
inside devices, clothing, cosmetics, books or packaged food.

Reply with a JSON array of short lowercase labels naming each restricted \
item you found, for example [\"firearms\", \"ammunition\"]. Reply with [] \
when nothing is restricted. Reply with the array only.";

/// System message sent with every request.
pub fn system_prompt() -> &'static str {
    INSTRUCTIONS
}

/// User message for one request.
pub fn user_prompt(request: &ClassificationRequest) -> String {
    let mut prompt = String::new();
    if let Some(country) = &request.country_hint {
        prompt.push_str(&format!(
            "Destination country: {country}. Also flag goods restricted specifically for import into {country}"
        ));
        if !request.category_hints.is_empty() {
            prompt.push_str(&format!(", including: {}", request.category_hints.join(", ")));
        }
        prompt.push_str(".\n\n");
    } else if !request.category_hints.is_empty() {
        prompt.push_str(&format!(
            "Restricted categories already screened: {}.\n\n",
            request.category_hints.join(", ")
        ));
    }
    prompt.push_str("Package contents:\n");
    prompt.push_str(request.text.trim());
    prompt
}
