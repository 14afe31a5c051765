//! # Read Snapshots
//!
//! Evaluations read rules and reference tables from immutable snapshots
//! loaded once and shared through `Arc`. A snapshot changes only when its
//! holder calls `refresh`; there is no background reload.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use shipcomply_core::{
    ComplianceRule, CountryRequirement, EnhancedDocumentation, RegionalRule, ReferenceTables,
    RequiredField, RestrictedDestination, RestrictedItem, RuleCategory, RuleId, Timestamp,
    ValidationConstraint,
};

use crate::error::StoreError;
use crate::kind::StoreRecord;
use crate::store::RuleStore;

/// Active rule model at one point in time.
#[derive(Debug, Clone, Default)]
pub struct RuleSnapshot {
    /// Active categories, by priority.
    pub categories: Vec<RuleCategory>,
    /// Active rules of active categories, ordered by category priority then
    /// rule priority. At most one rule per field key.
    pub rules: Vec<ComplianceRule>,
    /// Active constraints keyed by rule id.
    pub constraints: HashMap<RuleId, Vec<ValidationConstraint>>,
    /// Active regional overrides keyed by base rule id.
    pub regional_rules: HashMap<RuleId, Vec<RegionalRule>>,
    pub loaded_at: Option<Timestamp>,
}

impl RuleSnapshot {
    /// Load the active rule model from `store`.
    ///
    /// Rules under an inactive category are left out. Rules whose category
    /// is missing sort last. When several active rules share a field key the
    /// one with the lowest priority value is kept and the rest are logged.
    pub async fn load<S: RuleStore>(store: &S) -> Result<Self, StoreError> {
        let mut categories: Vec<RuleCategory> = active(store).await?;
        categories.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.name.cmp(&b.name)));
        let all_categories: Vec<RuleCategory> = store.get_all().await?;

        let category_rank: HashMap<_, _> = categories
            .iter()
            .enumerate()
            .map(|(rank, c)| (c.id, rank))
            .collect();
        let inactive: HashSet<_> = all_categories
            .iter()
            .filter(|c| !c.is_active)
            .map(|c| c.id)
            .collect();

        let mut rules: Vec<ComplianceRule> = active::<S, ComplianceRule>(store)
            .await?
            .into_iter()
            .filter(|r| !inactive.contains(&r.category_id))
            .collect();
        for rule in rules.iter().filter(|r| !category_rank.contains_key(&r.category_id)) {
            tracing::warn!(
                rule_id = %rule.id,
                field_key = %rule.field_key,
                category_id = %rule.category_id,
                "rule references a missing category"
            );
        }

        // Lowest priority value wins a field key.
        rules.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id)));
        let mut seen = HashSet::new();
        rules.retain(|rule| {
            let first = seen.insert(rule.field_key.clone());
            if !first {
                tracing::warn!(
                    rule_id = %rule.id,
                    field_key = %rule.field_key,
                    "duplicate active rule for field key; keeping the higher-priority rule"
                );
            }
            first
        });
        rules.sort_by_key(|r| {
            (
                category_rank.get(&r.category_id).copied().unwrap_or(usize::MAX),
                r.priority,
            )
        });

        let mut constraints: HashMap<RuleId, Vec<ValidationConstraint>> = HashMap::new();
        for constraint in active::<S, ValidationConstraint>(store).await? {
            constraints.entry(constraint.rule_id).or_default().push(constraint);
        }
        let mut regional_rules: HashMap<RuleId, Vec<RegionalRule>> = HashMap::new();
        for regional in active::<S, RegionalRule>(store).await? {
            regional_rules
                .entry(regional.base_rule_id)
                .or_default()
                .push(regional);
        }

        tracing::debug!(
            categories = categories.len(),
            rules = rules.len(),
            "rule snapshot loaded"
        );
        Ok(Self {
            categories,
            rules,
            constraints,
            regional_rules,
            loaded_at: Some(Timestamp::now()),
        })
    }

    /// Active constraints of `rule_id`.
    pub fn constraints_for(&self, rule_id: RuleId) -> &[ValidationConstraint] {
        self.constraints.get(&rule_id).map_or(&[], Vec::as_slice)
    }

    /// Active override of `rule_id` for `region`, if any.
    pub fn regional_override(&self, rule_id: RuleId, region: &str) -> Option<&RegionalRule> {
        self.regional_rules
            .get(&rule_id)?
            .iter()
            .find(|r| r.region.eq_ignore_ascii_case(region))
    }
}

async fn active<S: RuleStore, R: StoreRecord>(store: &S) -> Result<Vec<R>, StoreError> {
    let all: Vec<R> = store.get_all().await?;
    Ok(all.into_iter().filter(|r| r.is_active()).collect())
}

/// Load the active cross-border reference tables from `store`.
pub async fn load_reference_tables<S: RuleStore>(store: &S) -> Result<ReferenceTables, StoreError> {
    let tables = ReferenceTables {
        required_fields: active::<S, RequiredField>(store).await?,
        country_requirements: active::<S, CountryRequirement>(store).await?,
        restricted_items: active::<S, RestrictedItem>(store).await?,
        restricted_destinations: active::<S, RestrictedDestination>(store).await?,
        enhanced_documentation: active::<S, EnhancedDocumentation>(store).await?,
    };
    tracing::debug!(
        required_fields = tables.required_fields.len(),
        restricted_items = tables.restricted_items.len(),
        restricted_destinations = tables.restricted_destinations.len(),
        "reference tables loaded"
    );
    Ok(tables)
}

/// Shared, swappable handle to an immutable snapshot.
///
/// Readers take an `Arc` clone and keep using it even if the handle is
/// swapped mid-evaluation.
#[derive(Debug)]
pub struct SnapshotHandle<T> {
    current: RwLock<Arc<T>>,
}

impl<T> SnapshotHandle<T> {
    pub fn new(value: T) -> Self {
        Self {
            current: RwLock::new(Arc::new(value)),
        }
    }

    /// The snapshot in effect now.
    pub fn current(&self) -> Arc<T> {
        Arc::clone(&self.current.read())
    }

    /// Install a new snapshot, returning the one it replaced.
    pub fn replace(&self, value: T) -> Arc<T> {
        std::mem::replace(&mut *self.current.write(), Arc::new(value))
    }
}

impl SnapshotHandle<RuleSnapshot> {
    /// Load a rule snapshot from `store` into a new handle.
    pub async fn load<S: RuleStore>(store: &S) -> Result<Self, StoreError> {
        Ok(Self::new(RuleSnapshot::load(store).await?))
    }

    /// Reload from `store`. On failure the previous snapshot stays in place.
    pub async fn refresh<S: RuleStore>(&self, store: &S) -> Result<Arc<RuleSnapshot>, StoreError> {
        let fresh = RuleSnapshot::load(store).await?;
        self.replace(fresh);
        Ok(self.current())
    }
}
