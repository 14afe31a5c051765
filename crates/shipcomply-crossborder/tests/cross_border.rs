//! End-to-end cross-border evaluation over the bundled store and fake
//! classifiers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use shipcomply_classifier::{ClassificationRequest, ClassifierError, ContentClassifier, DisabledClassifier};
use shipcomply_core::{
    ClassifierStatus, ComplianceStatus, ReferenceSource, RestrictedDestination,
    RestrictedDestinationDraft, RestrictionType, Shipment,
};
use shipcomply_crossborder::{
    ComplianceContext, CrossBorderEngine, EngineOptions, ReferenceData,
};
use shipcomply_store::{IndexName, MemoryStore, RuleStore, StoreError, StoreRecord};

/// Returns fixed labels for global and country-scoped requests.
#[derive(Default)]
struct ScriptedClassifier {
    global: Vec<String>,
    country: Vec<String>,
    calls: AtomicUsize,
}

impl ContentClassifier for ScriptedClassifier {
    async fn classify(&self, request: &ClassificationRequest) -> Result<Vec<String>, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(match request.country_hint {
            Some(_) => self.country.clone(),
            None => self.global.clone(),
        })
    }
}

struct FailingClassifier;

impl ContentClassifier for FailingClassifier {
    async fn classify(&self, _request: &ClassificationRequest) -> Result<Vec<String>, ClassifierError> {
        Err(ClassifierError::Status {
            status: 503,
            body: "overloaded".into(),
        })
    }
}

struct SlowClassifier;

impl ContentClassifier for SlowClassifier {
    async fn classify(&self, _request: &ClassificationRequest) -> Result<Vec<String>, ClassifierError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(vec!["firearms".into()])
    }
}

/// Records how many classifications overlap.
#[derive(Default)]
struct InFlightClassifier {
    current: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl ContentClassifier for InFlightClassifier {
    async fn classify(&self, _request: &ClassificationRequest) -> Result<Vec<String>, ClassifierError> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(Vec::new())
    }
}

/// Every operation fails as if the backend were down.
struct OfflineStore;

fn offline() -> StoreError {
    StoreError::Unavailable {
        reason: "connection refused".into(),
    }
}

impl RuleStore for OfflineStore {
    async fn get_all<R: StoreRecord>(&self) -> Result<Vec<R>, StoreError> {
        Err(offline())
    }

    async fn get_by_id<R: StoreRecord>(&self, _id: R::Id) -> Result<Option<R>, StoreError> {
        Err(offline())
    }

    async fn get_by_index<R: StoreRecord>(
        &self,
        _index: IndexName,
        _value: &str,
    ) -> Result<Vec<R>, StoreError> {
        Err(offline())
    }

    async fn put<R: StoreRecord>(&self, _record: R) -> Result<(), StoreError> {
        Err(offline())
    }

    async fn put_batch<R: StoreRecord>(&self, _records: Vec<R>) -> Result<(), StoreError> {
        Err(offline())
    }

    async fn delete<R: StoreRecord>(&self, _id: R::Id) -> Result<(), StoreError> {
        Err(offline())
    }

    async fn count<R: StoreRecord>(&self) -> Result<usize, StoreError> {
        Err(offline())
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        Err(offline())
    }
}

fn engine<C: ContentClassifier>(classifier: C) -> CrossBorderEngine<C> {
    let reference = ReferenceData {
        tables: shipcomply_rules::reference_tables().unwrap(),
        source: ReferenceSource::Store,
    };
    CrossBorderEngine::new(reference, classifier, EngineOptions::default())
}

/// International shipment carrying every globally required field.
fn export_to(recipient_country: &str, contents: &str) -> Shipment {
    Shipment::new()
        .with("shipperCountry", "US")
        .with("recipientCountry", recipient_country)
        .with("declaredValue", "120.00")
        .with("currency", "USD")
        .with("packageContents", contents)
        .with("commodityCode", "847130")
        .with("countryOfOrigin", "US")
        .with("weight", "2.5 kg")
}

#[tokio::test]
async fn domestic_shipment_yields_an_empty_report() {
    let classifier = ScriptedClassifier {
        global: vec!["firearms".into()],
        ..Default::default()
    };
    let engine = engine(classifier);
    let shipment = Shipment::new()
        .with("shipperCountry", "US")
        .with("recipientCountry", "usa")
        .with("packageContents", "Books");

    let report = engine.evaluate(&shipment).await;
    assert!(!report.international);
    assert!(report.findings.is_empty());
    assert_eq!(report.classifier, ClassifierStatus::NotRequired);
    assert_eq!(engine.classifier().calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn embargoed_destination_is_reported_once() {
    let engine = engine(DisabledClassifier);
    let report = engine.evaluate(&export_to("Cuba", "Books")).await;

    assert!(report.international);
    assert_eq!(report.destination.as_deref(), Some("CU"));
    let destination: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.field == "recipientCountry")
        .collect();
    assert_eq!(destination.len(), 1);
    assert_eq!(destination[0].status, ComplianceStatus::NonCompliant);
    assert!(destination[0].message.contains("embargoed"));
    assert_eq!(report.classifier, ClassifierStatus::Disabled);
}

#[tokio::test]
async fn missing_international_fields_are_listed_in_one_finding() {
    let engine = engine(DisabledClassifier);
    let shipment = Shipment::new()
        .with("shipperCountry", "US")
        .with("recipientCountry", "DE")
        .with("gross_weight", "3 kg");

    let report = engine.evaluate(&shipment).await;
    let missing: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.field == "internationalRequiredFields")
        .collect();
    assert_eq!(missing.len(), 1);
    assert!(missing[0].value.contains("Declared Value"));
    assert!(missing[0].value.contains("Package Contents"));
    assert!(!missing[0].value.contains("Weight"), "found through a variation");
}

#[tokio::test]
async fn unavailable_classifier_degrades_instead_of_failing() {
    let engine = engine(FailingClassifier);
    let report = engine.evaluate(&export_to("Germany", "AK-47 parts")).await;

    assert!(report.international);
    assert!(report.classifier.is_degraded());
    assert!(!report
        .findings
        .iter()
        .any(|f| f.field.starts_with("packageContents")));
}

#[tokio::test]
async fn keyword_hits_survive_a_degraded_classifier() {
    let engine = engine(FailingClassifier);
    let report = engine
        .evaluate(&export_to("Germany", "Antique firearms, decommissioned"))
        .await;

    assert!(report.classifier.is_degraded());
    let finding = report
        .findings
        .iter()
        .find(|f| f.field == "packageContents:global")
        .unwrap();
    assert_eq!(finding.value, "firearms");
}

#[tokio::test]
async fn slow_classifier_is_cut_off_at_the_deadline() {
    let reference = ReferenceData {
        tables: shipcomply_rules::reference_tables().unwrap(),
        source: ReferenceSource::Store,
    };
    let options = EngineOptions {
        classifier_deadline: Duration::from_millis(50),
    };
    let engine = CrossBorderEngine::new(reference, SlowClassifier, options);

    let report = engine.evaluate(&export_to("Germany", "AK-47 parts")).await;
    assert!(report.classifier.is_degraded());
    assert!(!report
        .findings
        .iter()
        .any(|f| f.field.starts_with("packageContents")));
}

#[tokio::test]
async fn classifier_labels_are_merged_with_keyword_hits() {
    let classifier = ScriptedClassifier {
        global: vec!["Firearms".into(), "weapon parts".into()],
        country: vec!["chewing gum".into()],
        ..Default::default()
    };
    let engine = engine(classifier);
    let report = engine
        .evaluate(&export_to("Singapore", "firearms cleaning kit and Wrigley's"))
        .await;

    assert_eq!(report.classifier, ClassifierStatus::Available);
    let global = report
        .findings
        .iter()
        .find(|f| f.field == "packageContents:global")
        .unwrap();
    assert_eq!(global.value, "firearms, weapon parts");
    let local = report
        .findings
        .iter()
        .find(|f| f.field == "packageContents:SG")
        .unwrap();
    assert_eq!(local.value, "chewing gum");
    assert_eq!(engine.classifier().calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn destination_without_local_items_skips_the_country_call() {
    let engine = engine(ScriptedClassifier::default());
    let report = engine.evaluate(&export_to("Germany", "Books")).await;

    assert_eq!(report.classifier, ClassifierStatus::Available);
    assert_eq!(engine.classifier().calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn country_requirement_needs_the_exact_key() {
    let engine = engine(DisabledClassifier);
    let shipment = export_to("Brazil", "Books").with("RecipientTaxId", "123.456.789-00");
    let report = engine.evaluate(&shipment).await;
    assert!(report
        .findings
        .iter()
        .any(|f| f.field == "countryRequirements:BR"));

    let shipment = export_to("Brazil", "Books").with("recipientTaxId", "123.456.789-00");
    let report = engine.evaluate(&shipment).await;
    assert!(!report
        .findings
        .iter()
        .any(|f| f.field == "countryRequirements:BR"));
    assert!(report
        .findings
        .iter()
        .any(|f| f.field == "enhancedDocumentation:BR" && f.status == ComplianceStatus::Warning));
}

#[tokio::test]
async fn offline_store_falls_back_to_built_in_tables() {
    let engine = CrossBorderEngine::from_store(&OfflineStore, DisabledClassifier, EngineOptions::default()).await;
    assert_eq!(engine.reference().source, ReferenceSource::Defaults);

    let report = engine.evaluate(&export_to("Iran", "Books")).await;
    assert_eq!(report.reference_source, ReferenceSource::Defaults);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["referenceSource"], "defaults");
    assert!(report.findings.iter().any(|f| f.field == "recipientCountry"));

    assert!(engine.refresh(&OfflineStore).await.is_err());
    assert_eq!(engine.reference().source, ReferenceSource::Defaults);
}

#[tokio::test]
async fn bootstrap_seeds_an_empty_store_and_validates() {
    let context = ComplianceContext::bootstrap(MemoryStore::new(), DisabledClassifier, EngineOptions::default())
        .await
        .unwrap();
    assert!(!context.rules().is_empty());

    let report = context.evaluate(&export_to("Canada", "Books"), None).await;
    assert_eq!(report.compliance.reference_source, ReferenceSource::Store);
    assert!(report.compliance.international);
    assert_eq!(report.validation.normalized.get("recipientCountry").map(String::as_str), Some("CA"));
}

#[tokio::test]
async fn refresh_picks_up_new_reference_data() {
    let context = ComplianceContext::bootstrap(MemoryStore::new(), DisabledClassifier, EngineOptions::default())
        .await
        .unwrap();
    let before = context.evaluate(&export_to("Mexico", "Books"), None).await;
    assert!(!before.compliance.findings.iter().any(|f| f.field == "recipientCountry"));

    let destination = RestrictedDestination::create(RestrictedDestinationDraft {
        country_code: Some("MX".into()),
        country_name: Some("Mexico".into()),
        restriction_type: Some(RestrictionType::Limited),
        ..Default::default()
    })
    .unwrap();
    context.store().put(destination).await.unwrap();
    context.refresh().await.unwrap();

    let after = context.evaluate(&export_to("Mexico", "Books"), None).await;
    assert!(after.compliance.findings.iter().any(|f| f.field == "recipientCountry"));
    assert!(!after.is_compliant());
}

#[tokio::test]
async fn batch_evaluation_keeps_input_order() {
    let context = Arc::new(
        ComplianceContext::bootstrap(MemoryStore::new(), DisabledClassifier, EngineOptions::default())
            .await
            .unwrap(),
    );
    let shipments = vec![
        export_to("Cuba", "Books"),
        export_to("Germany", "Books"),
        export_to("Japan", "Books"),
    ];

    let reports = context.evaluate_many(shipments, None).await.unwrap();
    let destinations: Vec<_> = reports
        .iter()
        .map(|r| r.compliance.destination.clone().unwrap_or_default())
        .collect();
    assert_eq!(destinations, vec!["CU", "DE", "JP"]);
    assert!(!reports[0].is_compliant());
}

#[tokio::test]
async fn batch_evaluation_is_bounded() {
    let context = Arc::new(
        ComplianceContext::bootstrap(
            MemoryStore::new(),
            InFlightClassifier::default(),
            EngineOptions::default(),
        )
        .await
        .unwrap()
        .with_max_concurrent(2),
    );
    let shipments = (0..10).map(|_| export_to("Germany", "Books")).collect();

    let reports = context.evaluate_many(shipments, None).await.unwrap();
    assert_eq!(reports.len(), 10);

    let classifier = context.engine().classifier();
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 10);
    assert!(classifier.peak.load(Ordering::SeqCst) <= 2);
}
