//! # Widget State
//!
//! Everything one widget instance knows, in one place. There is no global
//! state: two widgets are two `Widget` values.
//!
//! ```text
//! Widget
//! ├── log: MessageLog                 // conversation, append-only
//! ├── request: RequestCoordinator     // single in-flight request + submit flag
//! ├── feedback: FeedbackCoordinator   // per-message feedback affordances
//! ├── stats: Option<SessionStats>     // last full stats snapshot
//! ├── pending_analysis                // delayed follow-up for the latest card
//! └── status_message: String          // status bar text
//! ```
//!
//! State changes only happen through `update(widget, action)` in action.rs.

use crate::core::feedback::FeedbackCoordinator;
use crate::core::message_log::{MessageId, MessageLog};
use crate::core::request::{RequestCoordinator, RequestState};
use crate::service::SessionStats;

pub struct Widget {
    pub log: MessageLog,
    pub request: RequestCoordinator,
    pub feedback: FeedbackCoordinator,
    pub stats: Option<SessionStats>,
    pub status_message: String,
    /// Sequence number handed to the latest stats fetch.
    pub(crate) stats_requested: u64,
    /// Sequence number of the snapshot currently in `stats`.
    pub(crate) stats_applied: u64,
    /// Analysis text waiting for its delay, keyed by the card it follows.
    pub(crate) pending_analysis: Option<(MessageId, String)>,
}

impl Default for Widget {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget {
    pub fn new() -> Self {
        Self {
            log: MessageLog::new(),
            request: RequestCoordinator::new(),
            feedback: FeedbackCoordinator::new(),
            stats: None,
            status_message: String::from("Welcome to BookMate!"),
            stats_requested: 0,
            stats_applied: 0,
            pending_analysis: None,
        }
    }

    pub fn request_state(&self) -> RequestState {
        self.request.state()
    }

    pub fn submit_enabled(&self) -> bool {
        self.request.submit_enabled()
    }

    pub fn feedback_enabled(&self, id: MessageId) -> bool {
        self.feedback.is_enabled(&self.log, id)
    }

    /// Most recent recommendation whose feedback buttons are still enabled.
    pub fn latest_open_recommendation(&self) -> Option<MessageId> {
        self.log
            .iter()
            .rev()
            .filter(|m| m.content.recommendation().is_some())
            .map(|m| m.id)
            .find(|id| self.feedback_enabled(*id))
    }
}
