//! # Cross-Border Compliance Engine
//!
//! Runs over one shipment in a fixed order: applicability, required
//! international fields, destination checks, restricted content. A
//! domestic shipment yields an empty report. No sub-check can stop the
//! others; a failing classifier only narrows restricted-content screening
//! to keywords.
//!
//! Reference tables come from an immutable snapshot. When the store cannot
//! be read at construction the built-in defaults are used instead, which
//! is logged, counted in `shipcomply_reference_fallback_total` and visible
//! as `referenceSource: defaults` on every report.

use std::sync::Arc;
use std::time::Duration;

use shipcomply_classifier::{classify_or_degrade, ClassificationRequest, ContentClassifier};
use shipcomply_core::shipment::humanize_field_key;
use shipcomply_core::{
    ClassifierStatus, ComplianceFinding, ComplianceReport, ReferenceSource, ReferenceTables,
    Shipment,
};
use shipcomply_store::{load_reference_tables, RuleStore, SnapshotHandle, StoreError};

use crate::applicability::{detect, party_countries};
use crate::indicators::{contents, has_field, keyword_hits, union_hits};

/// Upper bound on one classifier call, on top of the client's own timeout.
pub const DEFAULT_CLASSIFIER_DEADLINE: Duration = Duration::from_secs(15);

/// Tunables for [`CrossBorderEngine`].
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub classifier_deadline: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            classifier_deadline: DEFAULT_CLASSIFIER_DEADLINE,
        }
    }
}

/// Reference tables plus where they came from.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub tables: ReferenceTables,
    pub source: ReferenceSource,
}

/// Cross-border compliance checks over a reference-table snapshot.
pub struct CrossBorderEngine<C> {
    reference: SnapshotHandle<ReferenceData>,
    classifier: C,
    options: EngineOptions,
}

impl<C: ContentClassifier> CrossBorderEngine<C> {
    pub fn new(reference: ReferenceData, classifier: C, options: EngineOptions) -> Self {
        Self {
            reference: SnapshotHandle::new(reference),
            classifier,
            options,
        }
    }

    /// Load reference tables from `store`, falling back to the built-in
    /// defaults when the store cannot be read.
    pub async fn from_store<S: RuleStore>(store: &S, classifier: C, options: EngineOptions) -> Self {
        let reference = match load_reference_tables(store).await {
            Ok(tables) => ReferenceData {
                tables,
                source: ReferenceSource::Store,
            },
            Err(e) => fallback_reference(&e),
        };
        Self::new(reference, classifier, options)
    }

    /// Reload reference tables from `store`. On failure the current tables
    /// stay in place and the error is returned.
    pub async fn refresh<S: RuleStore>(&self, store: &S) -> Result<(), StoreError> {
        let tables = load_reference_tables(store).await?;
        self.reference.replace(ReferenceData {
            tables,
            source: ReferenceSource::Store,
        });
        tracing::debug!("cross-border reference tables refreshed");
        Ok(())
    }

    pub fn reference(&self) -> Arc<ReferenceData> {
        self.reference.current()
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Run every cross-border check on `shipment`.
    pub async fn evaluate(&self, shipment: &Shipment) -> ComplianceReport {
        let reference = self.reference.current();
        let mut report = ComplianceReport {
            reference_source: reference.source,
            ..Default::default()
        };

        let Some(signal) = detect(shipment) else {
            return report;
        };
        tracing::debug!(signal = ?signal, "shipment is international");
        report.international = true;

        let tables = &reference.tables;
        let (_, destination) = party_countries(shipment);

        report.findings.extend(missing_international_fields(tables, shipment));
        if let Some(code) = &destination {
            report.findings.extend(destination_findings(tables, shipment, code));
        }

        let (content_findings, status) = self
            .restricted_content(tables, shipment, destination.as_deref())
            .await;
        report.findings.extend(content_findings);
        report.classifier = status;
        report.destination = destination;

        tracing::debug!(
            findings = report.findings.len(),
            destination = report.destination.as_deref().unwrap_or("-"),
            classifier = ?report.classifier,
            "cross-border evaluation finished"
        );
        report
    }

    async fn restricted_content(
        &self,
        tables: &ReferenceTables,
        shipment: &Shipment,
        destination: Option<&str>,
    ) -> (Vec<ComplianceFinding>, ClassifierStatus) {
        let Some((field, text)) = contents(shipment) else {
            return (Vec::new(), ClassifierStatus::NotRequired);
        };

        let global_categories: Vec<&str> = tables
            .global_restricted_items()
            .map(|i| i.category.as_str())
            .collect();
        let country_categories: Vec<&str> = destination
            .map(|code| {
                tables
                    .country_restricted_items(code)
                    .map(|i| i.category.as_str())
                    .collect()
            })
            .unwrap_or_default();

        let deadline = self.options.classifier_deadline;
        let global_request = ClassificationRequest::new(text);
        let country_request = match destination {
            Some(code) if !country_categories.is_empty() => Some(
                ClassificationRequest::new(text).with_country(
                    code,
                    country_categories.iter().map(|c| c.to_string()).collect(),
                ),
            ),
            _ => None,
        };

        let global = classify_or_degrade(&self.classifier, &global_request, deadline);
        let country = async {
            match &country_request {
                Some(request) => Some(classify_or_degrade(&self.classifier, request, deadline).await),
                None => None,
            }
        };
        let (global, country) = tokio::join!(global, country);

        let mut statuses = vec![global.status];
        let mut findings = Vec::new();

        let hits = union_hits(
            keyword_hits(text, global_categories.iter().copied()),
            global.labels,
        );
        if !hits.is_empty() {
            findings.push(ComplianceFinding::non_compliant(
                format!("{field}:global"),
                hits.join(", "),
                format!(
                    "Package contains items prohibited for all destinations: {}",
                    hits.join(", ")
                ),
            ));
        }

        if let Some(code) = destination {
            let labels = match country {
                Some(classification) => {
                    statuses.push(classification.status);
                    classification.labels
                }
                None => Vec::new(),
            };
            let hits = union_hits(
                keyword_hits(text, country_categories.iter().copied()),
                labels,
            );
            if !hits.is_empty() {
                findings.push(ComplianceFinding::non_compliant(
                    format!("{field}:{code}"),
                    hits.join(", "),
                    format!(
                        "Package contains items restricted for import into {code}: {}",
                        hits.join(", ")
                    ),
                ));
            }
        }

        (findings, combine(statuses))
    }
}

impl<C> std::fmt::Debug for CrossBorderEngine<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reference = self.reference.current();
        f.debug_struct("CrossBorderEngine")
            .field("source", &reference.source)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn fallback_reference(error: &StoreError) -> ReferenceData {
    metrics::counter!("shipcomply_reference_fallback_total").increment(1);
    tracing::warn!(
        error = %error,
        "reference tables unavailable; using built-in defaults"
    );
    let tables = shipcomply_rules::reference_tables().unwrap_or_else(|e| {
        tracing::error!(error = %e, "built-in reference tables are invalid");
        ReferenceTables::default()
    });
    ReferenceData {
        tables,
        source: ReferenceSource::Defaults,
    }
}

/// Degraded wins over disabled, which wins over available.
fn combine(statuses: Vec<ClassifierStatus>) -> ClassifierStatus {
    let mut combined = ClassifierStatus::NotRequired;
    for status in statuses {
        combined = match (&combined, status) {
            (ClassifierStatus::Degraded { .. }, _) => break,
            (_, degraded @ ClassifierStatus::Degraded { .. }) => degraded,
            (ClassifierStatus::Disabled, _) => ClassifierStatus::Disabled,
            (_, next) => next,
        };
    }
    combined
}

/// One finding listing every required international field that is absent.
fn missing_international_fields(
    tables: &ReferenceTables,
    shipment: &Shipment,
) -> Option<ComplianceFinding> {
    let missing: Vec<String> = tables
        .international_required_fields()
        .filter(|f| !has_field(shipment, &f.field_key))
        .map(|f| {
            if f.display_name.is_empty() {
                humanize_field_key(&f.field_key)
            } else {
                f.display_name.clone()
            }
        })
        .collect();
    if missing.is_empty() {
        return None;
    }
    let list = missing.join(", ");
    Some(ComplianceFinding::non_compliant(
        "internationalRequiredFields",
        list.clone(),
        format!("International shipment is missing required fields: {list}"),
    ))
}

/// Restricted destination, country-specific fields and enhanced
/// documentation for the normalized destination `code`. Country-specific
/// fields are matched by exact key only.
fn destination_findings(
    tables: &ReferenceTables,
    shipment: &Shipment,
    code: &str,
) -> Vec<ComplianceFinding> {
    let mut findings = Vec::new();

    if let Some(restricted) = tables.restricted_destination(code) {
        findings.push(ComplianceFinding::non_compliant(
            "recipientCountry",
            code,
            format!(
                "Shipments to {} ({code}) are not permitted: destination is {}. {}",
                display_country(&restricted.country_name, code),
                restricted.restriction_type,
                restricted.details
            )
            .trim_end()
            .to_string(),
        ));
    }

    if let Some(requirement) = tables.country_requirement(code) {
        let missing: Vec<String> = requirement
            .required_fields
            .iter()
            .filter(|key| !shipment.is_present(key))
            .map(|key| humanize_field_key(key))
            .collect();
        if !missing.is_empty() {
            let list = missing.join(", ");
            findings.push(ComplianceFinding::non_compliant(
                format!("countryRequirements:{code}"),
                list.clone(),
                format!(
                    "{} requires additional fields: {list}",
                    display_country(&requirement.country_name, code)
                ),
            ));
        }
    }

    if let Some(docs) = tables.enhanced_documentation(code) {
        let list = docs.requirements.join(", ");
        let mut message = format!(
            "{} expects additional documentation: {list}",
            display_country(&docs.country_name, code)
        );
        if !docs.notes.is_empty() {
            message.push_str(&format!(". {}", docs.notes));
        }
        findings.push(ComplianceFinding::warning(
            format!("enhancedDocumentation:{code}"),
            list,
            message,
        ));
    }

    findings
}

fn display_country(name: &str, code: &str) -> String {
    if name.is_empty() {
        code.to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_combination() {
        use ClassifierStatus::*;
        assert_eq!(combine(vec![Available, Available]), Available);
        assert_eq!(combine(vec![Disabled]), Disabled);
        assert_eq!(combine(vec![Available, Disabled]), Disabled);
        assert_eq!(combine(vec![Disabled, Available]), Disabled);
        let degraded = Degraded {
            reason: "timeout".into(),
        };
        assert_eq!(
            combine(vec![Available, degraded.clone(), Disabled]),
            degraded
        );
        assert_eq!(combine(Vec::new()), NotRequired);
    }

    #[test]
    fn destination_checks_are_additive() {
        let tables = shipcomply_rules::reference_tables().unwrap();
        let shipment = Shipment::new().with("recipientCountry", "BR");
        let findings = destination_findings(&tables, &shipment, "BR");
        let fields: Vec<_> = findings.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["countryRequirements:BR", "enhancedDocumentation:BR"]
        );
        assert!(findings[0].message.contains("Recipient Tax Id"));
    }

    #[test]
    fn country_requirement_is_exact_key_only() {
        let tables = shipcomply_rules::reference_tables().unwrap();
        let shipment = Shipment::new().with("RecipientTaxId", "123.456.789-00");
        let findings = destination_findings(&tables, &shipment, "BR");
        assert!(findings
            .iter()
            .any(|f| f.field == "countryRequirements:BR"));

        let exact = Shipment::new().with("recipientTaxId", "123.456.789-00");
        let findings = destination_findings(&tables, &exact, "BR");
        assert!(!findings
            .iter()
            .any(|f| f.field == "countryRequirements:BR"));
    }
}
