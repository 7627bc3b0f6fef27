//! # Actions
//!
//! Everything that can happen to a widget becomes an `Action`.
//! User presses Enter? That's `Action::Submit(input)`.
//! Backend answers? That's `Action::RecommendationResolved(result)`.
//!
//! `update()` applies an action to the widget and returns the effects the
//! runtime must perform. No I/O happens here.
//!
//! ```text
//! Widget + Action  →  update()  →  Widget' + [Effect]
//! ```

use log::{debug, info, warn};

use crate::core::error::WidgetError;
use crate::core::feedback::Verdict;
use crate::core::input::{RawInput, RequestPayload, prepare_request};
use crate::core::message_log::{Content, MessageId};
use crate::core::request::RequestState;
use crate::core::state::Widget;
use crate::service::{
    FeedbackRequest, FeedbackResult, RecommendationResult, ServiceError, SessionStats,
};

#[derive(Debug)]
pub enum Action {
    /// The page submitted free text or a mood/genre selection.
    Submit(RawInput),
    /// The recommend endpoint answered (or failed).
    RecommendationResolved(Result<RecommendationResult, ServiceError>),
    /// The delayed analysis continuation for this card fired.
    AnalysisDue(MessageId),
    /// A feedback button was pressed on a message.
    Feedback {
        message_id: MessageId,
        verdict: Verdict,
    },
    FeedbackResolved {
        message_id: MessageId,
        outcome: Result<FeedbackResult, ServiceError>,
    },
    /// Ask for a fresh stats snapshot.
    RefreshStats,
    StatsResolved {
        seq: u64,
        outcome: Result<SessionStats, ServiceError>,
    },
}

/// Side effects for the runtime to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Recommend(RequestPayload),
    /// Fire `AnalysisDue` for this card after the configured delay.
    ScheduleAnalysis(MessageId),
    SendFeedback {
        message_id: MessageId,
        request: FeedbackRequest,
    },
    FetchStats {
        seq: u64,
    },
}

pub fn update(widget: &mut Widget, action: Action) -> Result<Vec<Effect>, WidgetError> {
    match action {
        Action::Submit(raw) => {
            // Busy wins over validation so a pending turn never gains messages.
            if widget.request_state() == RequestState::Pending {
                warn!("Submission rejected: request already pending");
                return Err(WidgetError::Busy);
            }
            let payload = match prepare_request(&raw) {
                Ok(payload) => payload,
                Err(e) => {
                    debug!("Submission failed validation: {}", e);
                    widget.log.append_bot(Content::Warning(e.warning().to_string()));
                    return Err(e.into());
                }
            };
            // The previous turn's analysis belongs before the new question.
            flush_analysis(widget);
            widget.request.begin(&mut widget.log, &payload)?;
            widget.status_message = String::from("Looking for a book...");
            Ok(vec![Effect::Recommend(payload)])
        }

        Action::RecommendationResolved(outcome) => {
            let Some(turn) = widget.request.resolve(&mut widget.log, outcome) else {
                return Ok(Vec::new());
            };
            let mut effects = Vec::new();
            if let Some(card) = turn.card {
                widget.status_message = String::from("Recommendation ready");
                if let Some(text) = turn.analysis {
                    widget.pending_analysis = Some((card, text));
                    effects.push(Effect::ScheduleAnalysis(card));
                }
                effects.push(stats_effect(widget));
            } else {
                widget.status_message = String::from("Request failed");
            }
            Ok(effects)
        }

        Action::AnalysisDue(card) => {
            match widget.pending_analysis.take_if(|(pending, _)| *pending == card) {
                Some((_, text)) => {
                    widget.log.append_bot(Content::Text(text));
                }
                None => debug!("Analysis for {} already delivered", card),
            }
            Ok(Vec::new())
        }

        Action::Feedback {
            message_id,
            verdict,
        } => {
            let request = widget.feedback.open(&widget.log, message_id, verdict)?;
            widget.status_message = String::from("Sending feedback...");
            Ok(vec![Effect::SendFeedback {
                message_id,
                request,
            }])
        }

        Action::FeedbackResolved {
            message_id,
            outcome,
        } => {
            widget.feedback.finish(message_id);
            match outcome {
                Ok(result) => {
                    info!("Feedback for {} accepted", message_id);
                    widget
                        .log
                        .append_bot(Content::Text(format!("🧠 {}", result.explanation)));
                    widget.status_message = String::from("Thanks for the feedback!");
                    Ok(vec![stats_effect(widget)])
                }
                Err(ServiceError::Rejected(msg)) => {
                    warn!("Feedback for {} rejected: {}", message_id, msg);
                    widget.log.append_bot(Content::Error(format!("❌ {msg}")));
                    widget.status_message = String::from("Feedback failed");
                    Ok(Vec::new())
                }
                Err(e) => {
                    warn!("Feedback for {} failed: {}", message_id, e);
                    widget
                        .log
                        .append_bot(Content::Error("❌ Error processing your feedback".into()));
                    widget.status_message = String::from("Feedback failed");
                    Ok(Vec::new())
                }
            }
        }

        Action::RefreshStats => Ok(vec![stats_effect(widget)]),

        Action::StatsResolved { seq, outcome } => {
            match outcome {
                Ok(stats) if seq > widget.stats_applied => {
                    debug!("Stats snapshot #{} applied", seq);
                    widget.stats = Some(stats);
                    widget.stats_applied = seq;
                }
                Ok(_) => debug!(
                    "Dropping stale stats snapshot #{} (have #{})",
                    seq, widget.stats_applied
                ),
                Err(e) => warn!("Stats refresh #{} failed: {}", seq, e),
            }
            Ok(Vec::new())
        }
    }
}

fn flush_analysis(widget: &mut Widget) {
    if let Some((card, text)) = widget.pending_analysis.take() {
        debug!("Delivering analysis for {} early", card);
        widget.log.append_bot(Content::Text(text));
    }
}

fn stats_effect(widget: &mut Widget) -> Effect {
    widget.stats_requested += 1;
    Effect::FetchStats {
        seq: widget.stats_requested,
    }
}
