//! # Bulk Reference Import
//!
//! Loads cross-border reference data from a [`ReferenceImport`] document.
//! Each kind is all-or-nothing: its drafts are converted first and written
//! with a single `put_batch`, so one bad draft leaves that kind untouched.
//! Kinds are independent; a failure in one never affects another.

use serde::{Deserialize, Serialize};
use shipcomply_core::{
    CountryRequirement, CountryRequirementDraft, EnhancedDocumentation,
    EnhancedDocumentationDraft, ModelError, RequiredField, RequiredFieldDraft,
    RestrictedDestination, RestrictedDestinationDraft, RestrictedItem, RestrictedItemDraft,
};

use crate::kind::{EntityKind, StoreRecord};
use crate::store::RuleStore;

/// Partial reference records, grouped by kind. Absent kinds are skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReferenceImport {
    pub required_fields: Option<Vec<RequiredFieldDraft>>,
    pub country_requirements: Option<Vec<CountryRequirementDraft>>,
    pub restricted_items: Option<Vec<RestrictedItemDraft>>,
    pub restricted_destinations: Option<Vec<RestrictedDestinationDraft>>,
    pub enhanced_documentation: Option<Vec<EnhancedDocumentationDraft>>,
}

/// What happened to one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ImportOutcome {
    Imported { count: usize },
    Failed { error: String },
}

/// Per-kind result of an import, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub kinds: Vec<(EntityKind, ImportOutcome)>,
}

impl ImportReport {
    /// Whether every kind present in the document was imported.
    pub fn is_complete(&self) -> bool {
        self.kinds
            .iter()
            .all(|(_, o)| matches!(o, ImportOutcome::Imported { .. }))
    }

    /// Total records written.
    pub fn imported(&self) -> usize {
        self.kinds
            .iter()
            .map(|(_, o)| match o {
                ImportOutcome::Imported { count } => *count,
                ImportOutcome::Failed { .. } => 0,
            })
            .sum()
    }

    /// Outcome for `kind`, if the document carried it.
    pub fn outcome(&self, kind: EntityKind) -> Option<&ImportOutcome> {
        self.kinds.iter().find(|(k, _)| *k == kind).map(|(_, o)| o)
    }
}

/// Import every kind present in `doc` into `store`.
pub async fn import_reference_data<S: RuleStore>(store: &S, doc: ReferenceImport) -> ImportReport {
    let mut report = ImportReport::default();

    if let Some(drafts) = doc.required_fields {
        let outcome = import_kind(store, drafts, RequiredField::create).await;
        report.kinds.push((EntityKind::RequiredFields, outcome));
    }
    if let Some(drafts) = doc.country_requirements {
        let outcome = import_kind(store, drafts, CountryRequirement::create).await;
        report.kinds.push((EntityKind::CountryRequirements, outcome));
    }
    if let Some(drafts) = doc.restricted_items {
        let outcome = import_kind(store, drafts, RestrictedItem::create).await;
        report.kinds.push((EntityKind::RestrictedItems, outcome));
    }
    if let Some(drafts) = doc.restricted_destinations {
        let outcome = import_kind(store, drafts, RestrictedDestination::create).await;
        report.kinds.push((EntityKind::RestrictedDestinations, outcome));
    }
    if let Some(drafts) = doc.enhanced_documentation {
        let outcome = import_kind(store, drafts, EnhancedDocumentation::create).await;
        report.kinds.push((EntityKind::EnhancedDocumentation, outcome));
    }

    tracing::info!(
        kinds = report.kinds.len(),
        imported = report.imported(),
        complete = report.is_complete(),
        "reference import finished"
    );
    report
}

async fn import_kind<S, D, R>(
    store: &S,
    drafts: Vec<D>,
    create: fn(D) -> Result<R, ModelError>,
) -> ImportOutcome
where
    S: RuleStore,
    R: StoreRecord,
{
    let mut records = Vec::with_capacity(drafts.len());
    for (position, draft) in drafts.into_iter().enumerate() {
        match create(draft) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(kind = %R::KIND, position, error = %e, "rejecting import batch");
                return ImportOutcome::Failed {
                    error: format!("entry {position}: {e}"),
                };
            }
        }
    }

    let count = records.len();
    match store.put_batch(records).await {
        Ok(()) => ImportOutcome::Imported { count },
        Err(e) => {
            tracing::warn!(kind = %R::KIND, error = %e, "import batch write failed");
            ImportOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[tokio::test]
    async fn bad_entry_rejects_only_its_kind() {
        let store = MemoryStore::new();
        let doc: ReferenceImport = serde_json::from_value(serde_json::json!({
            "restrictedDestinations": [
                { "countryCode": "CU", "restrictionType": "embargoed" },
                { "countryName": "Nowhere" }
            ],
            "restrictedItems": [
                { "category": "firearms", "appliesTo": "ALL" },
                { "category": "chewing gum", "appliesTo": ["SG"] }
            ]
        }))
        .unwrap();

        let report = import_reference_data(&store, doc).await;

        assert!(!report.is_complete());
        assert!(matches!(
            report.outcome(EntityKind::RestrictedDestinations),
            Some(ImportOutcome::Failed { .. })
        ));
        assert_eq!(
            report.outcome(EntityKind::RestrictedItems),
            Some(&ImportOutcome::Imported { count: 2 })
        );
        assert_eq!(store.count::<RestrictedDestination>().await.unwrap(), 0);
        assert_eq!(store.count::<RestrictedItem>().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn absent_kinds_are_skipped() {
        let store = MemoryStore::new();
        let report = import_reference_data(&store, ReferenceImport::default()).await;
        assert!(report.kinds.is_empty());
        assert!(report.is_complete());
    }
}
