//! # HTTP Classifier Adapter
//!
//! Talks to an OpenAI-style chat-completions endpoint:
//! `POST {base_url}/chat/completions` with bearer auth, a fixed system
//! prompt and the package text as the user message. The first choice's
//! message content is parsed as a label list.
//!
//! Each request carries its own timeout. Transport failures are retried
//! with exponential backoff up to `max_retries` times.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;
use crate::parse::{excerpt, parse_labels};
use crate::retry::{retry_send, BASE_DELAY};
use crate::{prompt, ClassificationRequest, ContentClassifier};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Connection settings for [`HttpClassifier`].
#[derive(Debug, Clone)]
pub struct HttpClassifierConfig {
    /// API root, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl HttpClassifierConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Classifier backed by a chat-completions HTTP API.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    timeout: Duration,
    max_retries: u32,
    base_delay: Duration,
}

impl HttpClassifier {
    pub fn new(config: HttpClassifierConfig) -> Result<Self, ClassifierError> {
        if config.base_url.trim().is_empty() {
            return Err(ClassifierError::NotConfigured {
                reason: "base URL is empty".into(),
            });
        }
        if config.api_key.trim().is_empty() {
            return Err(ClassifierError::NotConfigured {
                reason: "API key is empty".into(),
            });
        }

        let mut auth =
            reqwest::header::HeaderValue::from_str(&format!("Bearer {}", config.api_key))
                .map_err(|_| ClassifierError::NotConfigured {
                    reason: "invalid API key characters".into(),
                })?;
        auth.set_sensitive(true);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ClassifierError::NotConfigured {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        let endpoint = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );
        Ok(Self {
            client,
            endpoint,
            model: config.model,
            timeout: config.timeout,
            max_retries: config.max_retries,
            base_delay: BASE_DELAY,
        })
    }

    /// Override the first backoff delay.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_transport(&self, e: reqwest::Error) -> ClassifierError {
        if e.is_timeout() {
            ClassifierError::Timeout {
                after_ms: self.timeout.as_millis() as u64,
            }
        } else {
            ClassifierError::Transport {
                endpoint: self.endpoint.clone(),
                source: e,
            }
        }
    }
}

impl ContentClassifier for HttpClassifier {
    async fn classify(&self, request: &ClassificationRequest) -> Result<Vec<String>, ClassifierError> {
        let user = prompt::user_prompt(request);
        let body = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            messages: [
                ChatMessage {
                    role: "system",
                    content: prompt::system_prompt(),
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
        };

        let resp = retry_send(self.max_retries, self.base_delay, || {
            self.client.post(&self.endpoint).json(&body).send()
        })
        .await
        .map_err(|e| self.map_transport(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                body: excerpt(body.trim()),
            });
        }

        let reply: ChatResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                self.map_transport(e)
            } else {
                ClassifierError::MalformedResponse {
                    excerpt: format!("undecodable response body: {e}"),
                }
            }
        })?;

        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ClassifierError::MalformedResponse {
                excerpt: "response has no message content".into(),
            })?;

        let labels = parse_labels(&content)?;
        tracing::debug!(
            labels = labels.len(),
            country = request.country_hint.as_deref().unwrap_or("-"),
            "classifier answered"
        );
        Ok(labels)
    }
}
