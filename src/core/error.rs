use std::fmt;

use crate::core::input::ValidationError;
use crate::core::message_log::MessageId;

/// Why the widget refused an action.
///
/// None of these leave the widget in a stuck state; they are reported so the
/// caller (and tests) can tell a rejected action from an accepted one.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetError {
    /// Bad input. An inline warning has been appended; no request was made.
    Validation(ValidationError),
    /// A recommendation request is already pending.
    Busy,
    /// Feedback for this message was already submitted.
    FeedbackClosed(MessageId),
    /// Feedback targeted a message without a recommendation. Should not
    /// happen; logged as an invariant violation.
    NoRecommendationAttached(MessageId),
}

impl fmt::Display for WidgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetError::Validation(e) => write!(f, "invalid input: {e}"),
            WidgetError::Busy => write!(f, "a recommendation request is already pending"),
            WidgetError::FeedbackClosed(id) => {
                write!(f, "feedback for message {id} was already submitted")
            }
            WidgetError::NoRecommendationAttached(id) => {
                write!(f, "message {id} has no recommendation attached")
            }
        }
    }
}

impl std::error::Error for WidgetError {}

impl From<ValidationError> for WidgetError {
    fn from(e: ValidationError) -> Self {
        WidgetError::Validation(e)
    }
}
