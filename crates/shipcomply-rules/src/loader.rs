//! # Default Catalog Loader
//!
//! One-time bootstrap of an empty store. The rule catalog is written only
//! when no rule exists; each cross-border reference table is written only
//! when that table is empty. Running the loader again is a no-op.
//!
//! Categories are matched by name before writing, so a run that failed after
//! its category batch does not leave a second copy behind on retry.

use serde::Serialize;
use shipcomply_core::{ComplianceRule, RuleCategory};
use shipcomply_store::{EntityKind, RuleStore, StoreError, StoreRecord};

use crate::defaults::{self, DefaultCatalog};
use crate::error::LoaderError;

/// Records written by one loader run, per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub seeded: Vec<(EntityKind, usize)>,
}

impl SeedReport {
    /// Nothing was written.
    pub fn is_noop(&self) -> bool {
        self.seeded.is_empty()
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.seeded
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(0, |(_, n)| *n)
    }

    pub fn total(&self) -> usize {
        self.seeded.iter().map(|(_, n)| n).sum()
    }
}

/// Seed the default catalog into `store` where it is empty.
pub async fn seed_if_empty<S: RuleStore>(store: &S) -> Result<SeedReport, LoaderError> {
    let mut report = SeedReport::default();

    if store.count::<ComplianceRule>().await? == 0 {
        let mut catalog = defaults::rule_catalog()?;
        adopt_stored_categories(store, &mut catalog).await?;
        write(store, catalog.categories, &mut report).await?;
        write(store, catalog.rules, &mut report).await?;
        write(store, catalog.constraints, &mut report).await?;
    } else {
        tracing::debug!("rule catalog present; skipping default rules");
    }

    let tables = defaults::reference_tables()?;
    write_if_empty(store, tables.required_fields, &mut report).await?;
    write_if_empty(store, tables.country_requirements, &mut report).await?;
    write_if_empty(store, tables.restricted_items, &mut report).await?;
    write_if_empty(store, tables.restricted_destinations, &mut report).await?;
    write_if_empty(store, tables.enhanced_documentation, &mut report).await?;

    if report.is_noop() {
        tracing::debug!("store already seeded");
    } else {
        tracing::info!(records = report.total(), "seeded default compliance catalog");
    }
    Ok(report)
}

/// Clear every kind and seed the defaults again.
pub async fn reset<S: RuleStore>(store: &S) -> Result<SeedReport, LoaderError> {
    store.clear_all().await?;
    tracing::info!("rule store cleared");
    seed_if_empty(store).await
}

/// Drop default categories whose name is already stored and point the
/// default rules at the stored ids instead.
async fn adopt_stored_categories<S: RuleStore>(
    store: &S,
    catalog: &mut DefaultCatalog,
) -> Result<(), StoreError> {
    let stored: Vec<RuleCategory> = store.get_all().await?;
    let mut adopted = Vec::new();
    catalog.categories.retain(|category| {
        match stored.iter().find(|existing| existing.name == category.name) {
            Some(existing) => {
                adopted.push((category.id, existing.id));
                false
            }
            None => true,
        }
    });
    for rule in &mut catalog.rules {
        if let Some(&(_, stored_id)) = adopted.iter().find(|(fresh, _)| *fresh == rule.category_id) {
            rule.category_id = stored_id;
        }
    }
    if !adopted.is_empty() {
        tracing::info!(categories = adopted.len(), "reusing stored categories for default rules");
    }
    Ok(())
}

async fn write<S: RuleStore, R: StoreRecord>(
    store: &S,
    records: Vec<R>,
    report: &mut SeedReport,
) -> Result<(), StoreError> {
    if records.is_empty() {
        return Ok(());
    }
    let n = records.len();
    store.put_batch(records).await?;
    report.seeded.push((R::KIND, n));
    Ok(())
}

async fn write_if_empty<S: RuleStore, R: StoreRecord>(
    store: &S,
    records: Vec<R>,
    report: &mut SeedReport,
) -> Result<(), StoreError> {
    if store.count::<R>().await? > 0 {
        return Ok(());
    }
    write(store, records, report).await
}
