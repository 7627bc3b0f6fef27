//! # Request Coordinator
//!
//! Owns the single in-flight recommendation request.
//!
//! ```text
//! Idle ──begin──▶ Pending ──resolve──▶ Succeeded | Failed ──ack──▶ Idle
//! ```
//!
//! `begin` is refused while `Pending`, so at most one request exists per
//! widget and responses can only ever arrive in submission order.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::core::error::WidgetError;
use crate::core::input::RequestPayload;
use crate::core::message_log::{Content, MessageId, MessageLog};
use crate::core::render::{self, RenderedRecommendation};
use crate::service::{RecommendationResult, ServiceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// What a resolved turn put on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// The recommendation card, if the request succeeded.
    pub card: Option<MessageId>,
    /// Follow-up analysis text to deliver later.
    pub analysis: Option<String>,
}

#[derive(Debug)]
pub struct RequestCoordinator {
    state: RequestState,
    submit_enabled: bool,
}

impl Default for RequestCoordinator {
    fn default() -> Self {
        Self {
            state: RequestState::Idle,
            submit_enabled: true,
        }
    }
}

impl RequestCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    /// Accepts a submission: user bubble, typing placeholder, submit disabled.
    pub fn begin(
        &mut self,
        log: &mut MessageLog,
        payload: &RequestPayload,
    ) -> Result<MessageId, WidgetError> {
        if self.state == RequestState::Pending {
            warn!("Submission rejected: request already pending");
            return Err(WidgetError::Busy);
        }

        let user = log.append_user(payload.display_text());
        log.show_typing();
        self.submit_enabled = false;
        self.transition(RequestState::Pending);
        Ok(user)
    }

    /// Applies the response of the pending request.
    ///
    /// Always clears the typing placeholder and re-enables submit before
    /// touching anything else, and always ends back in `Idle`.
    pub fn resolve(
        &mut self,
        log: &mut MessageLog,
        outcome: Result<RecommendationResult, ServiceError>,
    ) -> Option<TurnOutcome> {
        if self.state != RequestState::Pending {
            warn!("Ignoring response with no pending request ({:?})", self.state);
            return None;
        }

        log.remove_typing();
        self.submit_enabled = true;

        let turn = match outcome {
            Ok(result) => {
                self.transition(RequestState::Succeeded);
                info!("Recommendation received: {}", result.book.title);
                let RenderedRecommendation { card, analysis } = render::render(Arc::new(result));
                let id = log.append_bot(Content::Recommendation(card));
                TurnOutcome {
                    card: Some(id),
                    analysis,
                }
            }
            Err(e) => {
                self.transition(RequestState::Failed);
                if e.is_transport() {
                    warn!("Recommendation failed: {}", e);
                } else {
                    info!("Recommendation rejected by backend: {}", e);
                }
                log.append_bot(Content::Error(format!("❌ {}", e.user_message())));
                TurnOutcome {
                    card: None,
                    analysis: None,
                }
            }
        };

        self.transition(RequestState::Idle);
        Some(turn)
    }

    fn transition(&mut self, next: RequestState) {
        debug!("Request state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
