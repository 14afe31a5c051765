//! # Compliance Context
//!
//! The one object a host builds at startup and shares across requests. It
//! owns the store, the compiled rule set, the field validator and the
//! cross-border engine. Evaluations read `Arc` snapshots and never write;
//! only [`ComplianceContext::refresh`] swaps them.

use std::sync::Arc;

use serde::Serialize;
use shipcomply_classifier::ContentClassifier;
use shipcomply_core::{ComplianceReport, Shipment};
use shipcomply_rules::{seed_if_empty, CompiledRuleSet, FieldValidator, ShipmentValidation};
use shipcomply_store::{RuleSnapshot, RuleStore, SnapshotHandle, StoreError};
use tokio::task::JoinSet;

use crate::engine::{CrossBorderEngine, EngineOptions};
use crate::error::ContextError;

/// Field validation and cross-border results for one shipment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentReport {
    pub validation: ShipmentValidation,
    pub compliance: ComplianceReport,
}

impl ShipmentReport {
    /// No field errors and no non-compliant cross-border findings.
    pub fn is_compliant(&self) -> bool {
        self.validation.is_valid && !self.compliance.has_violations()
    }
}

/// Default number of shipments [`ComplianceContext::evaluate_many`] keeps in
/// flight at once.
pub const DEFAULT_MAX_CONCURRENT_EVALUATIONS: usize = 8;

/// Shared evaluation state over store `S` and classifier `C`.
pub struct ComplianceContext<S, C> {
    store: S,
    rules: SnapshotHandle<CompiledRuleSet>,
    validator: FieldValidator,
    engine: CrossBorderEngine<C>,
    max_concurrent: usize,
}

impl<S: RuleStore, C: ContentClassifier> ComplianceContext<S, C> {
    /// Seed the default catalog if the store is empty, then load rules and
    /// reference tables.
    ///
    /// Loader and rule-loading failures are fatal. Reference-table failures
    /// fall back to the built-in defaults.
    pub async fn bootstrap(store: S, classifier: C, options: EngineOptions) -> Result<Self, ContextError> {
        let seeded = seed_if_empty(&store).await?;
        if !seeded.is_noop() {
            tracing::info!(records = seeded.total(), "default catalog installed");
        }
        let rules = compile(&store).await?;
        let engine = CrossBorderEngine::from_store(&store, classifier, options).await;
        Ok(Self {
            store,
            rules: SnapshotHandle::new(rules),
            validator: FieldValidator::new(),
            engine,
            max_concurrent: DEFAULT_MAX_CONCURRENT_EVALUATIONS,
        })
    }

    /// Replace the field validator, e.g. to register custom constraints.
    pub fn with_validator(mut self, validator: FieldValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Cap on shipments evaluated at once by `evaluate_many`. Zero is
    /// treated as one.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Reload rules and reference tables. On failure the previous snapshots
    /// stay in effect.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        let rules = compile(&self.store).await?;
        self.engine.refresh(&self.store).await?;
        self.rules.replace(rules);
        tracing::info!("compliance snapshots refreshed");
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn rules(&self) -> Arc<CompiledRuleSet> {
        self.rules.current()
    }

    pub fn engine(&self) -> &CrossBorderEngine<C> {
        &self.engine
    }

    /// Validate fields and run cross-border checks. `region` selects
    /// regional rule overrides.
    pub async fn evaluate(&self, shipment: &Shipment, region: Option<&str>) -> ShipmentReport {
        let rules = self.rules.current();
        let validation = self.validator.validate_shipment(shipment, &rules, region);
        let compliance = self.engine.evaluate(shipment).await;
        ShipmentReport {
            validation,
            compliance,
        }
    }
}

impl<S, C> ComplianceContext<S, C>
where
    S: RuleStore + 'static,
    C: ContentClassifier + 'static,
{
    /// Evaluate independent shipments concurrently, at most
    /// `max_concurrent` at a time. Reports come back in input order.
    pub async fn evaluate_many(
        self: &Arc<Self>,
        shipments: Vec<Shipment>,
        region: Option<String>,
    ) -> Result<Vec<ShipmentReport>, ContextError> {
        let mut reports = Vec::with_capacity(shipments.len());
        let mut tasks = JoinSet::new();
        for (index, shipment) in shipments.into_iter().enumerate() {
            if tasks.len() >= self.max_concurrent {
                if let Some(joined) = tasks.join_next().await {
                    reports.push(joined?);
                }
            }
            let context = Arc::clone(self);
            let region = region.clone();
            tasks.spawn(async move {
                let report = context.evaluate(&shipment, region.as_deref()).await;
                (index, report)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            reports.push(joined?);
        }
        reports.sort_by_key(|(index, _)| *index);
        Ok(reports.into_iter().map(|(_, report)| report).collect())
    }
}

async fn compile<S: RuleStore>(store: &S) -> Result<CompiledRuleSet, StoreError> {
    let snapshot = RuleSnapshot::load(store).await?;
    Ok(CompiledRuleSet::from_snapshot(&snapshot))
}
