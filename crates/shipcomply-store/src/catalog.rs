//! # Rule Catalog
//!
//! Admin operations over any [`RuleStore`]: create from drafts, replace,
//! and delete, with the referential guards the raw store does not enforce.
//!
//! - Updates and deletes of a missing record fail with
//!   [`StoreError::NotFound`]; an update never upserts.
//! - A category cannot be deleted while any rule references it.
//! - A record cannot be written while a record it points at is missing
//!   (rule → category; constraint, dependency, regional override → rule).
//! - Deleting a rule removes its constraints and regional overrides only
//!   through [`RuleCatalog::delete_rule_cascade`].
//!
//! Every check-then-write sequence runs under one write lock shared by all
//! clones of a catalog, so a parent check and the write it guards cannot
//! interleave with another writer's check. Writers that bypass the catalog
//! are not covered.

use std::sync::Arc;

use shipcomply_core::{
    CategoryDraft, CategoryId, ComplianceRule, ConstraintDraft, CountryRequirement,
    CountryRequirementDraft, DependencyDraft, EnhancedDocumentation, EnhancedDocumentationDraft,
    RegionalRule, RegionalRuleDraft, RequiredField, RequiredFieldDraft,
    RestrictedDestination, RestrictedDestinationDraft, RestrictedItem, RestrictedItemDraft,
    RuleCategory, RuleDependency, RuleDraft, RuleId, ValidationConstraint,
};
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::kind::{EntityKind, IndexName, ParentRef, StoreRecord};
use crate::store::RuleStore;

/// Admin surface over a rule store.
#[derive(Debug, Clone)]
pub struct RuleCatalog<S> {
    store: S,
    writes: Arc<Mutex<()>>,
}

impl<S: RuleStore> RuleCatalog<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            writes: Arc::new(Mutex::new(())),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Generic create / replace / delete ───────────────────────────

    /// Store a freshly created record after checking its parents exist.
    pub async fn create<R: StoreRecord>(&self, record: R) -> Result<R, StoreError> {
        let _write = self.writes.lock().await;
        self.require_parents(&record).await?;
        self.store.put(record.clone()).await?;
        tracing::info!(kind = %R::KIND, id = %record.id(), "record created");
        Ok(record)
    }

    /// Replace a stored record. Keeps the stored id and `createdAt` and
    /// advances `updatedAt`.
    pub async fn update<R: StoreRecord>(&self, mut record: R) -> Result<R, StoreError> {
        let _write = self.writes.lock().await;
        let Some(previous) = self.store.get_by_id::<R>(record.id()).await? else {
            return Err(StoreError::NotFound {
                kind: R::KIND,
                id: record.id().to_string(),
            });
        };
        self.require_parents(&record).await?;
        record.supersede(&previous);
        self.store.put(record.clone()).await?;
        tracing::info!(kind = %R::KIND, id = %record.id(), "record updated");
        Ok(record)
    }

    /// Hard-delete a record. A category still referenced by rules is
    /// refused with [`StoreError::CategoryInUse`].
    pub async fn delete<R: StoreRecord>(&self, id: R::Id) -> Result<(), StoreError> {
        let _write = self.writes.lock().await;
        let Some(existing) = self.store.get_by_id::<R>(id).await? else {
            return Err(StoreError::NotFound {
                kind: R::KIND,
                id: id.to_string(),
            });
        };
        if R::KIND == EntityKind::Categories {
            let rules: Vec<ComplianceRule> = self
                .store
                .get_by_index(IndexName::CategoryId, &existing.id().to_string())
                .await?;
            if let Some(first) = rules.first() {
                tracing::warn!(
                    category_id = %first.category_id,
                    rules = rules.len(),
                    "refusing to delete referenced category"
                );
                return Err(StoreError::CategoryInUse {
                    id: first.category_id,
                    rules: rules.len(),
                });
            }
        }
        self.store.delete::<R>(id).await?;
        tracing::info!(kind = %R::KIND, id = %id, "record deleted");
        Ok(())
    }

    async fn require_parents<R: StoreRecord>(&self, record: &R) -> Result<(), StoreError> {
        for parent in record.parents() {
            match parent {
                ParentRef::Category(id) => self.require_category(id).await?,
                ParentRef::Rule(id) => self.require_rule(id).await?,
            }
        }
        Ok(())
    }

    async fn require_category(&self, id: CategoryId) -> Result<(), StoreError> {
        match self.store.get_by_id::<RuleCategory>(id).await? {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound {
                kind: EntityKind::Categories,
                id: id.to_string(),
            }),
        }
    }

    async fn require_rule(&self, id: RuleId) -> Result<(), StoreError> {
        match self.store.get_by_id::<ComplianceRule>(id).await? {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound {
                kind: EntityKind::Rules,
                id: id.to_string(),
            }),
        }
    }

    // ── Rule model ──────────────────────────────────────────────────

    pub async fn create_category(&self, draft: CategoryDraft) -> Result<RuleCategory, StoreError> {
        self.create(RuleCategory::create(draft)?).await
    }

    /// Create a rule under an existing category.
    pub async fn create_rule(&self, draft: RuleDraft) -> Result<ComplianceRule, StoreError> {
        self.create(ComplianceRule::create(draft)?).await
    }

    pub async fn create_constraint(
        &self,
        draft: ConstraintDraft,
    ) -> Result<ValidationConstraint, StoreError> {
        self.create(ValidationConstraint::create(draft)?).await
    }

    pub async fn create_dependency(
        &self,
        draft: DependencyDraft,
    ) -> Result<RuleDependency, StoreError> {
        self.create(RuleDependency::create(draft)?).await
    }

    pub async fn create_regional_rule(
        &self,
        draft: RegionalRuleDraft,
    ) -> Result<RegionalRule, StoreError> {
        self.create(RegionalRule::create(draft)?).await
    }

    /// Delete a category that no rule references.
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), StoreError> {
        self.delete::<RuleCategory>(id).await
    }

    /// Delete a rule only. Its constraints and overrides stay behind.
    pub async fn delete_rule(&self, id: RuleId) -> Result<(), StoreError> {
        self.delete::<ComplianceRule>(id).await
    }

    /// Delete a rule together with its constraints and regional overrides.
    /// Children go first so an interrupted cascade leaves no orphans.
    pub async fn delete_rule_cascade(&self, id: RuleId) -> Result<(), StoreError> {
        let _write = self.writes.lock().await;
        self.require_rule(id).await?;
        let key = id.to_string();

        let constraints: Vec<ValidationConstraint> =
            self.store.get_by_index(IndexName::RuleId, &key).await?;
        for constraint in &constraints {
            self.store.delete::<ValidationConstraint>(constraint.id).await?;
        }
        let overrides: Vec<RegionalRule> =
            self.store.get_by_index(IndexName::BaseRuleId, &key).await?;
        for regional in &overrides {
            self.store.delete::<RegionalRule>(regional.id).await?;
        }
        self.store.delete::<ComplianceRule>(id).await?;
        tracing::info!(
            rule_id = %id,
            constraints = constraints.len(),
            regional_rules = overrides.len(),
            "rule deleted with dependents"
        );
        Ok(())
    }

    /// Active constraints of a rule.
    pub async fn constraints_for(
        &self,
        rule_id: RuleId,
    ) -> Result<Vec<ValidationConstraint>, StoreError> {
        let all: Vec<ValidationConstraint> = self
            .store
            .get_by_index(IndexName::RuleId, &rule_id.to_string())
            .await?;
        Ok(all.into_iter().filter(|c| c.is_active).collect())
    }

    /// Active rules, ordered by priority then field key.
    pub async fn active_rules(&self) -> Result<Vec<ComplianceRule>, StoreError> {
        let mut rules: Vec<ComplianceRule> =
            self.store.get_by_index(IndexName::Active, "true").await?;
        rules.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.field_key.cmp(&b.field_key))
        });
        Ok(rules)
    }

    // ── Cross-border reference data ─────────────────────────────────

    pub async fn create_required_field(
        &self,
        draft: RequiredFieldDraft,
    ) -> Result<RequiredField, StoreError> {
        self.create(RequiredField::create(draft)?).await
    }

    pub async fn create_country_requirement(
        &self,
        draft: CountryRequirementDraft,
    ) -> Result<CountryRequirement, StoreError> {
        self.create(CountryRequirement::create(draft)?).await
    }

    pub async fn create_restricted_item(
        &self,
        draft: RestrictedItemDraft,
    ) -> Result<RestrictedItem, StoreError> {
        self.create(RestrictedItem::create(draft)?).await
    }

    pub async fn create_restricted_destination(
        &self,
        draft: RestrictedDestinationDraft,
    ) -> Result<RestrictedDestination, StoreError> {
        self.create(RestrictedDestination::create(draft)?).await
    }

    pub async fn create_enhanced_documentation(
        &self,
        draft: EnhancedDocumentationDraft,
    ) -> Result<EnhancedDocumentation, StoreError> {
        self.create(EnhancedDocumentation::create(draft)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    /// Memory store that yields after every indexed read, the way a store
    /// behind a network round-trip would.
    #[derive(Debug, Default)]
    struct YieldingStore(MemoryStore);

    impl RuleStore for YieldingStore {
        async fn get_all<R: StoreRecord>(&self) -> Result<Vec<R>, StoreError> {
            self.0.get_all().await
        }

        async fn get_by_id<R: StoreRecord>(&self, id: R::Id) -> Result<Option<R>, StoreError> {
            self.0.get_by_id(id).await
        }

        async fn get_by_index<R: StoreRecord>(
            &self,
            index: IndexName,
            value: &str,
        ) -> Result<Vec<R>, StoreError> {
            let records = self.0.get_by_index(index, value).await;
            tokio::task::yield_now().await;
            records
        }

        async fn put<R: StoreRecord>(&self, record: R) -> Result<(), StoreError> {
            self.0.put(record).await
        }

        async fn put_batch<R: StoreRecord>(&self, records: Vec<R>) -> Result<(), StoreError> {
            self.0.put_batch(records).await
        }

        async fn delete<R: StoreRecord>(&self, id: R::Id) -> Result<(), StoreError> {
            self.0.delete::<R>(id).await
        }

        async fn count<R: StoreRecord>(&self) -> Result<usize, StoreError> {
            self.0.count::<R>().await
        }

        async fn clear_all(&self) -> Result<(), StoreError> {
            self.0.clear_all().await
        }
    }

    async fn catalog_with_category() -> (RuleCatalog<MemoryStore>, RuleCategory) {
        let catalog = RuleCatalog::new(MemoryStore::new());
        let category = catalog
            .create_category(CategoryDraft {
                name: Some("Package Details".into()),
                priority: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        (catalog, category)
    }

    fn weight_rule(category_id: CategoryId) -> RuleDraft {
        RuleDraft {
            category_id: Some(category_id),
            field_key: Some("weight".into()),
            is_required: Some(true),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn rule_creation_requires_existing_category() {
        let catalog = RuleCatalog::new(MemoryStore::new());
        let err = catalog
            .create_rule(weight_rule(CategoryId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: EntityKind::Categories, .. }));
    }

    #[tokio::test]
    async fn referenced_category_cannot_be_deleted() {
        let (catalog, category) = catalog_with_category().await;
        catalog.create_rule(weight_rule(category.id)).await.unwrap();
        let err = catalog.delete_category(category.id).await.unwrap_err();
        assert!(matches!(err, StoreError::CategoryInUse { rules: 1, .. }));
    }

    #[tokio::test]
    async fn concurrent_rule_creation_never_orphans_a_deleted_category() {
        let catalog = RuleCatalog::new(YieldingStore::default());
        let category = catalog
            .create_category(CategoryDraft {
                name: Some("Package Details".into()),
                priority: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();

        let (deleted, created) = tokio::join!(
            catalog.delete_category(category.id),
            catalog.create_rule(weight_rule(category.id)),
        );

        let categories = catalog.store().count::<RuleCategory>().await.unwrap();
        let rules: Vec<ComplianceRule> = catalog.store().get_all().await.unwrap();
        match (deleted, created) {
            (Ok(()), Err(StoreError::NotFound { kind: EntityKind::Categories, .. })) => {
                assert_eq!(categories, 0);
                assert!(rules.is_empty());
            }
            (Err(StoreError::CategoryInUse { .. }), Ok(rule)) => {
                assert_eq!(categories, 1);
                assert_eq!(rules, vec![rule]);
            }
            other => panic!("inconsistent outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreferenced_category_is_deleted() {
        let (catalog, category) = catalog_with_category().await;
        catalog.delete_category(category.id).await.unwrap();
        assert_eq!(catalog.store().count::<RuleCategory>().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_of_missing_record_never_upserts() {
        let (catalog, category) = catalog_with_category().await;
        let orphan = ComplianceRule::create(weight_rule(category.id)).unwrap();
        let err = catalog.update(orphan).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: EntityKind::Rules, .. }));
        assert_eq!(catalog.store().count::<ComplianceRule>().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_preserves_identity() {
        let (catalog, category) = catalog_with_category().await;
        let rule = catalog.create_rule(weight_rule(category.id)).await.unwrap();

        let mut edited = rule.clone();
        edited.validation_message = "Weight must include a unit".into();
        let updated = catalog.update(edited).await.unwrap();

        assert_eq!(updated.id, rule.id);
        assert_eq!(updated.created_at, rule.created_at);
        assert!(updated.updated_at > rule.updated_at);
        let stored = catalog
            .store()
            .get_by_id::<ComplianceRule>(rule.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.validation_message, "Weight must include a unit");
    }

    #[tokio::test]
    async fn plain_delete_leaves_constraints_cascade_removes_them() {
        let (catalog, category) = catalog_with_category().await;
        let first = catalog.create_rule(weight_rule(category.id)).await.unwrap();
        let second = catalog.create_rule(weight_rule(category.id)).await.unwrap();
        for rule_id in [first.id, second.id] {
            catalog
                .create_constraint(ConstraintDraft {
                    rule_id: Some(rule_id),
                    constraint_type: Some(shipcomply_core::ConstraintType::Min),
                    constraint_value: Some("0.1".into()),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        catalog.delete_rule(first.id).await.unwrap();
        catalog.delete_rule_cascade(second.id).await.unwrap();

        let remaining: Vec<ValidationConstraint> =
            catalog.store().get_all().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].rule_id, first.id);
    }

    #[tokio::test]
    async fn constraint_for_missing_rule_is_rejected() {
        let catalog = RuleCatalog::new(MemoryStore::new());
        let err = catalog
            .create_constraint(ConstraintDraft {
                rule_id: Some(RuleId::new()),
                constraint_type: Some(shipcomply_core::ConstraintType::Equal),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: EntityKind::Rules, .. }));
    }

    #[tokio::test]
    async fn draft_errors_surface_as_model_errors() {
        let catalog = RuleCatalog::new(MemoryStore::new());
        let err = catalog
            .create_category(CategoryDraft::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Model(_)));
    }
}
