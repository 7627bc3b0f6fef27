use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::types::{FeedbackResult, RecommendationResult, SessionStats};
use crate::core::feedback::Verdict;
use crate::core::input::RequestPayload;

/// Errors that can occur while talking to the recommendation backend.
///
/// Everything except `Rejected` is a transport problem and is shown to the
/// user as a connection error. `Rejected` carries the backend's own message,
/// which is shown verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// Network-level failure (DNS, connection refused, reset).
    Network(String),
    /// The configured request timeout elapsed.
    Timeout,
    /// Non-success HTTP status without a usable error body.
    Api { status: u16, message: String },
    /// Body was not the JSON we expected.
    Parse(String),
    /// Backend answered `success: false` with an error string.
    Rejected(String),
}

impl ServiceError {
    /// Human-readable text for the bot error bubble.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Rejected(msg) => msg.clone(),
            other => format!("Connection error: {other}"),
        }
    }

    pub fn is_transport(&self) -> bool {
        !matches!(self, ServiceError::Rejected(_))
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Network(msg) => write!(f, "network error: {msg}"),
            ServiceError::Timeout => write!(f, "request timed out"),
            ServiceError::Api { status, message } => {
                write!(f, "HTTP {status}: {message}")
            }
            ServiceError::Parse(msg) => write!(f, "malformed response: {msg}"),
            ServiceError::Rejected(msg) => write!(f, "rejected: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {}

/// A verdict tied to the exact recommendation it judges.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackRequest {
    pub recommendation: Arc<RecommendationResult>,
    pub verdict: Verdict,
}

/// The three backend endpoints the widget depends on.
///
/// Implementations unwrap the `{success, ..}` envelope: a `success: false`
/// answer comes back as `ServiceError::Rejected`.
#[async_trait]
pub trait BookService: Send + Sync {
    /// Returns the name of the service (for logs).
    fn name(&self) -> &str;

    async fn recommend(
        &self,
        payload: &RequestPayload,
    ) -> Result<RecommendationResult, ServiceError>;

    async fn submit_feedback(
        &self,
        request: &FeedbackRequest,
    ) -> Result<FeedbackResult, ServiceError>;

    async fn fetch_stats(&self) -> Result<SessionStats, ServiceError>;
}
