//! Classifier client error types.
//!
//! None of these reach the shipment-level caller: [`classify_or_degrade`]
//! turns each into an empty label list plus a degraded status.
//!
//! [`classify_or_degrade`]: crate::classify_or_degrade

/// Errors from a classifier call.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// No endpoint or credentials configured.
    #[error("classifier not configured: {reason}")]
    NotConfigured { reason: String },

    /// Connection or protocol failure.
    #[error("classifier request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// No answer within the deadline.
    #[error("classifier did not answer within {after_ms}ms")]
    Timeout { after_ms: u64 },

    /// Non-2xx HTTP status.
    #[error("classifier returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The reply held no JSON array of strings.
    #[error("classifier response is not a label list: {excerpt}")]
    MalformedResponse { excerpt: String },
}

impl ClassifierError {
    /// Short label used as a metric dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotConfigured { .. } => "not_configured",
            Self::Transport { .. } => "transport",
            Self::Timeout { .. } => "timeout",
            Self::Status { .. } => "status",
            Self::MalformedResponse { .. } => "malformed_response",
        }
    }
}
