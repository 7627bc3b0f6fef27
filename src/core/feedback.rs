//! # Feedback Coordinator
//!
//! Feedback is one-shot per recommendation: the first attempt closes the
//! message's buttons for good, whatever the outcome. Different messages are
//! independent, so several submissions may be in flight at once.

use std::collections::HashSet;

use log::{error, info, warn};
use serde::Serialize;

use crate::core::error::WidgetError;
use crate::core::message_log::{MessageId, MessageLog};
use crate::service::FeedbackRequest;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Positive,
    Neutral,
    Negative,
    WrongEmotion,
}

impl Verdict {
    pub const ALL: [Verdict; 4] = [
        Verdict::Positive,
        Verdict::Neutral,
        Verdict::Negative,
        Verdict::WrongEmotion,
    ];

    /// Button label.
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Positive => "👍 Perfect",
            Verdict::Neutral => "😐 So-so",
            Verdict::Negative => "👎 Not this",
            Verdict::WrongEmotion => "🎭 Wrong emotion",
        }
    }
}

#[derive(Debug, Default)]
pub struct FeedbackCoordinator {
    /// Messages whose feedback affordance is disabled.
    closed: HashSet<MessageId>,
    /// Submissions sent but not yet answered.
    in_flight: HashSet<MessageId>,
}

impl FeedbackCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closes the affordance for `id` and builds the request to send.
    ///
    /// The recommendation in the request is the same `Arc` the card holds,
    /// never a rebuilt copy.
    pub fn open(
        &mut self,
        log: &MessageLog,
        id: MessageId,
        verdict: Verdict,
    ) -> Result<FeedbackRequest, WidgetError> {
        if self.closed.contains(&id) {
            warn!("Feedback for {} rejected: already submitted", id);
            return Err(WidgetError::FeedbackClosed(id));
        }

        let Some(recommendation) = log
            .get(id)
            .and_then(|m| m.content.recommendation())
            .cloned()
        else {
            error!("Invariant violation: feedback on {} without a recommendation", id);
            return Err(WidgetError::NoRecommendationAttached(id));
        };

        self.closed.insert(id);
        self.in_flight.insert(id);
        info!("Feedback {:?} for {} ({})", verdict, id, recommendation.book.title);
        Ok(FeedbackRequest {
            recommendation,
            verdict,
        })
    }

    /// Marks a submission as answered. The affordance stays closed.
    pub fn finish(&mut self, id: MessageId) {
        self.in_flight.remove(&id);
    }

    pub fn is_enabled(&self, log: &MessageLog, id: MessageId) -> bool {
        !self.closed.contains(&id)
            && log
                .get(id)
                .is_some_and(|m| m.content.recommendation().is_some())
    }

    pub fn is_in_flight(&self, id: MessageId) -> bool {
        self.in_flight.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message_log::Content;
    use crate::core::render;
    use crate::test_support::sample_result;
    use std::sync::Arc;

    fn log_with_card() -> (MessageLog, MessageId, Arc<crate::service::RecommendationResult>) {
        let mut log = MessageLog::new();
        log.append_user("quiero algo triste");
        let result = Arc::new(sample_result());
        let rendered = render::render(result.clone());
        let id = log.append_bot(Content::Recommendation(rendered.card));
        (log, id, result)
    }

    #[test]
    fn test_verdict_wire_names() {
        let names: Vec<String> = Verdict::ALL
            .iter()
            .map(|v| serde_json::to_string(v).unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                r#""positive""#,
                r#""neutral""#,
                r#""negative""#,
                r#""wrong_emotion""#
            ]
        );
    }

    #[test]
    fn test_open_uses_attached_result() {
        let (log, id, result) = log_with_card();
        let mut feedback = FeedbackCoordinator::new();
        let request = feedback.open(&log, id, Verdict::Positive).unwrap();
        assert!(Arc::ptr_eq(&request.recommendation, &result));
        assert_eq!(request.verdict, Verdict::Positive);
        assert!(!feedback.is_enabled(&log, id));
        assert!(feedback.is_in_flight(id));
    }

    #[test]
    fn test_second_attempt_is_rejected() {
        let (log, id, _) = log_with_card();
        let mut feedback = FeedbackCoordinator::new();
        feedback.open(&log, id, Verdict::Negative).unwrap();
        feedback.finish(id);
        assert_eq!(
            feedback.open(&log, id, Verdict::Positive),
            Err(WidgetError::FeedbackClosed(id))
        );
        assert!(!feedback.is_enabled(&log, id));
    }

    #[test]
    fn test_message_without_recommendation() {
        let mut log = MessageLog::new();
        let user = log.append_user("hola");
        let mut feedback = FeedbackCoordinator::new();
        assert_eq!(
            feedback.open(&log, user, Verdict::Neutral),
            Err(WidgetError::NoRecommendationAttached(user))
        );
        // A faulty attempt does not close anything.
        assert!(!feedback.is_in_flight(user));
    }

    #[test]
    fn test_messages_are_independent() {
        let (mut log, first, _) = log_with_card();
        let rendered = render::render(Arc::new(sample_result()));
        let second = log.append_bot(Content::Recommendation(rendered.card));
        let mut feedback = FeedbackCoordinator::new();
        feedback.open(&log, first, Verdict::Positive).unwrap();
        assert!(feedback.is_enabled(&log, second));
        assert!(feedback.open(&log, second, Verdict::Neutral).is_ok());
    }
}
