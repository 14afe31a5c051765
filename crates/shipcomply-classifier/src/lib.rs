//! # shipcomply-classifier: Semantic Restricted-Content Classifier
//!
//! Keyword lists miss restricted goods described by model name or slang
//! ("AK-47 parts"). A text classifier adds recall on top of keyword
//! matching; it never replaces it.
//!
//! - [`ContentClassifier`]: the async classifier contract.
//! - [`HttpClassifier`]: chat-completions adapter over `reqwest`.
//! - [`classify_or_degrade`]: the only entry point the compliance engine
//!   uses. Every failure and every timeout becomes an empty label list plus
//!   [`ClassifierStatus::Degraded`].
//!
//! ## Crate Policy
//!
//! - The prompt is fixed by this crate; callers supply text and hints only.
//! - Classifier errors never propagate past [`classify_or_degrade`].

pub mod error;
pub mod http;
pub mod parse;
pub mod prompt;
mod retry;

use std::future::Future;
use std::time::Duration;

use shipcomply_core::ClassifierStatus;

pub use error::ClassifierError;
pub use http::{HttpClassifier, HttpClassifierConfig};
pub use parse::parse_labels;

/// What to classify.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationRequest {
    /// Package contents text.
    pub text: String,
    /// Destination code for country-specific screening.
    pub country_hint: Option<String>,
    /// Restricted categories relevant to this request.
    pub category_hints: Vec<String>,
}

impl ClassificationRequest {
    /// Global screening of `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Screening for `country`, naming its restricted categories.
    pub fn with_country(mut self, country: impl Into<String>, categories: Vec<String>) -> Self {
        self.country_hint = Some(country.into());
        self.category_hints = categories;
        self
    }
}

/// Restricted-content classifier.
pub trait ContentClassifier: Send + Sync {
    /// Labels of restricted items found in the request text.
    fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> impl Future<Output = Result<Vec<String>, ClassifierError>> + Send;

    /// `false` when classification is switched off and callers should not
    /// expect any labels.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Classifier used when none is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledClassifier;

impl ContentClassifier for DisabledClassifier {
    async fn classify(&self, _request: &ClassificationRequest) -> Result<Vec<String>, ClassifierError> {
        Err(ClassifierError::NotConfigured {
            reason: "classifier disabled".into(),
        })
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

impl<C: ContentClassifier> ContentClassifier for std::sync::Arc<C> {
    fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> impl Future<Output = Result<Vec<String>, ClassifierError>> + Send {
        (**self).classify(request)
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }
}

/// `None` behaves as [`DisabledClassifier`].
impl<C: ContentClassifier> ContentClassifier for Option<C> {
    async fn classify(&self, request: &ClassificationRequest) -> Result<Vec<String>, ClassifierError> {
        match self {
            Some(classifier) => classifier.classify(request).await,
            None => DisabledClassifier.classify(request).await,
        }
    }

    fn is_enabled(&self) -> bool {
        self.as_ref().is_some_and(ContentClassifier::is_enabled)
    }
}

/// Labels plus how the classifier took part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub labels: Vec<String>,
    pub status: ClassifierStatus,
}

/// Classify within `deadline`. Never fails: errors and timeouts yield no
/// labels and a degraded status, counted in
/// `shipcomply_classifier_degraded_total`.
pub async fn classify_or_degrade<C: ContentClassifier>(
    classifier: &C,
    request: &ClassificationRequest,
    deadline: Duration,
) -> Classification {
    if !classifier.is_enabled() {
        return Classification {
            labels: Vec::new(),
            status: ClassifierStatus::Disabled,
        };
    }

    let error = match tokio::time::timeout(deadline, classifier.classify(request)).await {
        Ok(Ok(labels)) => {
            return Classification {
                labels,
                status: ClassifierStatus::Available,
            }
        }
        Ok(Err(e)) => e,
        Err(_) => ClassifierError::Timeout {
            after_ms: deadline.as_millis() as u64,
        },
    };

    metrics::counter!("shipcomply_classifier_degraded_total", "reason" => error.kind())
        .increment(1);
    tracing::warn!(
        error = %error,
        country = request.country_hint.as_deref().unwrap_or("-"),
        "classifier unavailable; restricted-content check is keyword-only"
    );
    Classification {
        labels: Vec::new(),
        status: ClassifierStatus::Degraded {
            reason: error.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<&'static str>);

    impl ContentClassifier for Fixed {
        async fn classify(
            &self,
            _request: &ClassificationRequest,
        ) -> Result<Vec<String>, ClassifierError> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct Slow;

    impl ContentClassifier for Slow {
        async fn classify(
            &self,
            _request: &ClassificationRequest,
        ) -> Result<Vec<String>, ClassifierError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(vec!["late".into()])
        }
    }

    struct Broken;

    impl ContentClassifier for Broken {
        async fn classify(
            &self,
            _request: &ClassificationRequest,
        ) -> Result<Vec<String>, ClassifierError> {
            Err(ClassifierError::MalformedResponse {
                excerpt: "nope".into(),
            })
        }
    }

    fn request() -> ClassificationRequest {
        ClassificationRequest::new("AK-47 parts")
    }

    #[tokio::test]
    async fn answer_is_available() {
        let c = classify_or_degrade(&Fixed(vec!["firearms"]), &request(), Duration::from_secs(1))
            .await;
        assert_eq!(c.labels, vec!["firearms"]);
        assert_eq!(c.status, ClassifierStatus::Available);
    }

    #[tokio::test]
    async fn timeout_degrades() {
        let c = classify_or_degrade(&Slow, &request(), Duration::from_millis(20)).await;
        assert!(c.labels.is_empty());
        assert!(c.status.is_degraded());
    }

    #[tokio::test]
    async fn error_degrades_with_reason() {
        let c = classify_or_degrade(&Broken, &request(), Duration::from_secs(1)).await;
        assert!(c.labels.is_empty());
        match c.status {
            ClassifierStatus::Degraded { reason } => assert!(reason.contains("nope")),
            other => panic!("unexpected status {other:?}"),
        }
    }

    #[tokio::test]
    async fn disabled_classifier_is_not_called() {
        let c = classify_or_degrade(&DisabledClassifier, &request(), Duration::from_secs(1)).await;
        assert!(c.labels.is_empty());
        assert_eq!(c.status, ClassifierStatus::Disabled);
    }

    #[tokio::test]
    async fn optional_classifier() {
        let none: Option<Fixed> = None;
        let c = classify_or_degrade(&none, &request(), Duration::from_secs(1)).await;
        assert_eq!(c.status, ClassifierStatus::Disabled);

        let some = Some(Fixed(vec!["firearms"]));
        let c = classify_or_degrade(&some, &request(), Duration::from_secs(1)).await;
        assert_eq!(c.labels, vec!["firearms"]);
    }
}
