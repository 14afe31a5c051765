//! HttpClassifier against a mock chat-completions server.

use std::time::Duration;

use shipcomply_classifier::{
    classify_or_degrade, ClassificationRequest, ClassifierError, ContentClassifier,
    HttpClassifier, HttpClassifierConfig,
};
use shipcomply_core::ClassifierStatus;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn classifier(server: &MockServer) -> HttpClassifier {
    let mut config = HttpClassifierConfig::new(format!("{}/v1", server.uri()), "test-key");
    config.model = "screening-model".into();
    config.timeout = Duration::from_millis(500);
    config.max_retries = 1;
    HttpClassifier::new(config)
        .unwrap()
        .with_base_delay(Duration::from_millis(1))
}

fn reply(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    })
}

#[tokio::test]
async fn labels_are_parsed_from_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({ "model": "screening-model" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply(r#"["firearm parts"]"#)))
        .expect(1)
        .mount(&server)
        .await;

    let labels = classifier(&server)
        .classify(&ClassificationRequest::new("AK-47 parts"))
        .await
        .unwrap();
    assert_eq!(labels, vec!["firearm parts"]);
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let err = classifier(&server)
        .classify(&ClassificationRequest::new("books"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClassifierError::Status { status: 503, .. }));
}

#[tokio::test]
async fn long_error_body_is_cut_to_an_excerpt() {
    let server = MockServer::start().await;
    let page = format!("<html>{}</html>", "upstream gateway failure ".repeat(200));
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(502).set_body_string(page))
        .mount(&server)
        .await;

    let err = classifier(&server)
        .classify(&ClassificationRequest::new("books"))
        .await
        .unwrap_err();
    match err {
        ClassifierError::Status { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body.chars().count(), 120);
            assert!(body.starts_with("<html>upstream"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn prose_reply_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(reply("Nothing restricted here.")),
        )
        .mount(&server)
        .await;

    let err = classifier(&server)
        .classify(&ClassificationRequest::new("books"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClassifierError::MalformedResponse { .. }));
}

#[tokio::test]
async fn slow_server_degrades_to_no_labels() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(reply(r#"["firearms"]"#))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let result = classify_or_degrade(
        &classifier(&server),
        &ClassificationRequest::new("AK-47 parts"),
        Duration::from_millis(200),
    )
    .await;
    assert!(result.labels.is_empty());
    assert!(matches!(result.status, ClassifierStatus::Degraded { .. }));
}
