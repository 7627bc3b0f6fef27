//! HTTP implementation of [`BookService`] against the BookMate backend.
//!
//! Endpoints (relative to the base URL):
//! - `POST /recomendar`          `{message}` or `{mood, genre}`
//! - `POST /api/feedback`        `{recommendation, feedback_type}`
//! - `GET  /api/feedback-stats`

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::provider::{BookService, FeedbackRequest, ServiceError};
use super::types::{
    ErrorBody, FeedbackEnvelope, FeedbackResult, RecommendEnvelope, RecommendationResult,
    SessionStats, StatsEnvelope,
};
use crate::core::feedback::Verdict;
use crate::core::input::RequestPayload;

pub const RECOMMEND_PATH: &str = "/recomendar";
pub const FEEDBACK_PATH: &str = "/api/feedback";
pub const STATS_PATH: &str = "/api/feedback-stats";

/// Longest error body excerpt shown to the user.
const MAX_ERROR_CHARS: usize = 120;

/// Feedback request body. Borrows the recommendation so it is serialized
/// from the same document that was rendered.
#[derive(Serialize)]
struct FeedbackBody<'a> {
    recommendation: &'a RecommendationResult,
    feedback_type: Verdict,
}

pub struct HttpBookService {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBookService {
    /// `timeout` of `None` means requests may wait forever.
    pub fn new(base_url: String, timeout: Option<Duration>) -> Result<Self, ServiceError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a prepared request and decodes the JSON body.
    ///
    /// Non-2xx responses whose body is an `{error}` envelope become
    /// `Rejected`, since that is how the backend reports bad input.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ServiceError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        debug!("Backend response status: {}", status);

        let body = response.text().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            warn!("Backend error: {} - {}", status.as_u16(), body);
            if let Ok(err) = serde_json::from_str::<ErrorBody>(&body) {
                return Err(ServiceError::Rejected(err.error));
            }
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message: error_summary(status, &body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!("Could not decode backend body: {}", e);
            ServiceError::Parse(e.to_string())
        })
    }
}

/// First line of a non-JSON error body, or the status reason for HTML pages
/// and empty bodies.
fn error_summary(status: reqwest::StatusCode, body: &str) -> String {
    let reason = || status.canonical_reason().unwrap_or("Unknown status").to_string();
    let Some(first) = body.lines().map(str::trim).find(|l| !l.is_empty()) else {
        return reason();
    };
    if first.starts_with('<') {
        return reason();
    }
    if first.chars().count() > MAX_ERROR_CHARS {
        let cut: String = first.chars().take(MAX_ERROR_CHARS).collect();
        format!("{cut}…")
    } else {
        first.to_string()
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ServiceError {
    if e.is_timeout() {
        ServiceError::Timeout
    } else if e.is_decode() {
        ServiceError::Parse(e.to_string())
    } else {
        ServiceError::Network(e.to_string())
    }
}

/// Unwraps `{success, payload?, error?}`.
fn unwrap_envelope<T>(
    success: bool,
    payload: Option<T>,
    error: Option<String>,
    what: &str,
) -> Result<T, ServiceError> {
    match (success, payload) {
        (true, Some(payload)) => Ok(payload),
        (true, None) => Err(ServiceError::Parse(format!("success without {what}"))),
        (false, _) => Err(ServiceError::Rejected(
            error.unwrap_or_else(|| "Unknown error".to_string()),
        )),
    }
}

#[async_trait]
impl BookService for HttpBookService {
    fn name(&self) -> &str {
        "http"
    }

    async fn recommend(
        &self,
        payload: &RequestPayload,
    ) -> Result<RecommendationResult, ServiceError> {
        info!("POST {} ({:?})", RECOMMEND_PATH, payload);
        let envelope: RecommendEnvelope = self
            .send(self.client.post(self.url(RECOMMEND_PATH)).json(payload))
            .await?;
        unwrap_envelope(
            envelope.success,
            envelope.recommendation,
            envelope.error,
            "recommendation",
        )
    }

    async fn submit_feedback(
        &self,
        request: &FeedbackRequest,
    ) -> Result<FeedbackResult, ServiceError> {
        info!(
            "POST {} verdict={:?} book={}",
            FEEDBACK_PATH, request.verdict, request.recommendation.book.title
        );
        let body = FeedbackBody {
            recommendation: &request.recommendation,
            feedback_type: request.verdict,
        };
        let envelope: FeedbackEnvelope = self
            .send(self.client.post(self.url(FEEDBACK_PATH)).json(&body))
            .await?;
        unwrap_envelope(envelope.success, envelope.result, envelope.error, "result")
    }

    async fn fetch_stats(&self) -> Result<SessionStats, ServiceError> {
        debug!("GET {}", STATS_PATH);
        let envelope: StatsEnvelope = self.send(self.client.get(self.url(STATS_PATH))).await?;
        unwrap_envelope(envelope.success, envelope.stats, envelope.error, "stats")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let service = HttpBookService::new("http://localhost:5000/".into(), None).unwrap();
        assert_eq!(service.url(STATS_PATH), "http://localhost:5000/api/feedback-stats");
    }

    #[test]
    fn test_error_summary_hides_html_pages() {
        let page = "<!DOCTYPE html>\n<html><body><h1>502 Bad Gateway</h1>\n</body></html>";
        assert_eq!(error_summary(StatusCode::BAD_GATEWAY, page), "Bad Gateway");
        assert_eq!(error_summary(StatusCode::SERVICE_UNAVAILABLE, "  \n"), "Service Unavailable");
    }

    #[test]
    fn test_error_summary_truncates_long_bodies() {
        let body = format!("{}\nsecond line", "x".repeat(500));
        let summary = error_summary(StatusCode::INTERNAL_SERVER_ERROR, &body);
        assert_eq!(summary.chars().count(), MAX_ERROR_CHARS + 1);
        assert!(summary.ends_with('…'));
        assert_eq!(
            error_summary(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error\n"),
            "Internal Server Error"
        );
    }

    #[test]
    fn test_envelope_without_payload_is_parse_error() {
        let result: Result<u8, _> = unwrap_envelope(true, None, None, "stats");
        assert!(matches!(result, Err(ServiceError::Parse(_))));
    }

    #[test]
    fn test_envelope_failure_without_message() {
        let result: Result<u8, _> = unwrap_envelope(false, Some(1), None, "stats");
        assert_eq!(result, Err(ServiceError::Rejected("Unknown error".into())));
    }
}
