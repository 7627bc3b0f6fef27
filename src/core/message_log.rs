//! # Message Log
//!
//! Append-only record of the conversation. Messages never change once
//! appended; the typing placeholder is the only entry that can be removed.
//!
//! The page does not redraw history. It drains [`LogDelta`]s with
//! [`MessageLog::take_delta`] and applies them in order.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::core::render::RecommendationCard;
use crate::service::RecommendationResult;

/// Stable identifier for a message. Never reused within a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Plain text (may contain markdown).
    Text(String),
    /// Validation warning. Shown inline, not an error.
    Warning(String),
    /// Failure description for a request or feedback submission.
    Error(String),
    /// Transient "bot is typing" placeholder.
    Typing,
    /// A rendered recommendation with its attached result.
    Recommendation(RecommendationCard),
}

impl Content {
    pub fn is_typing(&self) -> bool {
        matches!(self, Content::Typing)
    }

    pub fn recommendation(&self) -> Option<&Arc<RecommendationResult>> {
        match self {
            Content::Recommendation(card) => Some(&card.result),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: Content,
    pub timestamp: DateTime<Local>,
}

/// Change to apply to the display since the last drain.
#[derive(Debug, Clone, PartialEq)]
pub enum LogDelta {
    Appended(Message),
    /// Only ever emitted for a typing placeholder.
    Removed(MessageId),
}

#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
    next_id: u64,
    pending: VecDeque<LogDelta>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns its id.
    pub fn append(&mut self, role: Role, content: Content) -> MessageId {
        self.next_id += 1;
        let message = Message {
            id: MessageId(self.next_id),
            role,
            content,
            timestamp: Local::now(),
        };
        let id = message.id;
        self.pending.push_back(LogDelta::Appended(message.clone()));
        self.messages.push(message);
        id
    }

    pub fn append_user(&mut self, text: impl Into<String>) -> MessageId {
        self.append(Role::User, Content::Text(text.into()))
    }

    pub fn append_bot(&mut self, content: Content) -> MessageId {
        self.append(Role::Bot, content)
    }

    /// Inserts the typing placeholder unless one is already showing.
    pub fn show_typing(&mut self) -> MessageId {
        if let Some(existing) = self.messages.iter().find(|m| m.content.is_typing()) {
            return existing.id;
        }
        self.append(Role::Bot, Content::Typing)
    }

    /// Removes the typing placeholder. No-op if none is present.
    pub fn remove_typing(&mut self) {
        let pending = &mut self.pending;
        self.messages.retain(|m| {
            if m.content.is_typing() {
                pending.push_back(LogDelta::Removed(m.id));
                false
            } else {
                true
            }
        });
    }

    pub fn has_typing(&self) -> bool {
        self.messages.iter().any(|m| m.content.is_typing())
    }

    /// Drains everything that changed since the previous call.
    pub fn take_delta(&mut self) -> Vec<LogDelta> {
        self.pending.drain(..).collect()
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        // Ids are assigned in increasing order, so the log is sorted by id.
        self.messages
            .binary_search_by_key(&id, |m| m.id)
            .ok()
            .map(|idx| &self.messages[idx])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_assigns_increasing_ids() {
        let mut log = MessageLog::new();
        let a = log.append_user("hola");
        let b = log.append_bot(Content::Text("¡hola!".into()));
        assert!(a < b);
        assert_eq!(log.len(), 2);
        assert_eq!(log.get(a).unwrap().role, Role::User);
        assert_eq!(log.get(b).unwrap().role, Role::Bot);
    }

    #[test]
    fn test_remove_typing_is_idempotent() {
        let mut log = MessageLog::new();
        log.append_user("hola");
        log.show_typing();
        assert!(log.has_typing());

        log.remove_typing();
        log.remove_typing();
        assert!(!log.has_typing());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_show_typing_does_not_duplicate() {
        let mut log = MessageLog::new();
        let first = log.show_typing();
        let second = log.show_typing();
        assert_eq!(first, second);
        assert_eq!(log.iter().filter(|m| m.content.is_typing()).count(), 1);
    }

    #[test]
    fn test_delta_reports_only_new_changes() {
        let mut log = MessageLog::new();
        let user = log.append_user("hola");
        let typing = log.show_typing();

        let first = log.take_delta();
        assert_eq!(first.len(), 2);
        assert!(matches!(&first[0], LogDelta::Appended(m) if m.id == user));
        assert!(matches!(&first[1], LogDelta::Appended(m) if m.id == typing));

        log.remove_typing();
        let bot = log.append_bot(Content::Error("❌ boom".into()));
        let second = log.take_delta();
        assert_eq!(second.len(), 2);
        assert_eq!(second[0], LogDelta::Removed(typing));
        assert!(matches!(&second[1], LogDelta::Appended(m) if m.id == bot));

        assert!(log.take_delta().is_empty());
    }

    #[test]
    fn test_get_after_removal() {
        let mut log = MessageLog::new();
        let user = log.append_user("a");
        let typing = log.show_typing();
        log.remove_typing();
        let bot = log.append_bot(Content::Text("b".into()));
        assert!(log.get(typing).is_none());
        assert_eq!(log.get(user).unwrap().content, Content::Text("a".into()));
        assert_eq!(log.get(bot).unwrap().content, Content::Text("b".into()));
    }

    #[test]
    fn test_order_is_append_order() {
        let mut log = MessageLog::new();
        log.append_user("1");
        log.append_bot(Content::Text("2".into()));
        log.append_user("3");
        let texts: Vec<_> = log
            .iter()
            .map(|m| match &m.content {
                Content::Text(t) => t.clone(),
                _ => String::new(),
            })
            .collect();
        assert_eq!(texts, vec!["1", "2", "3"]);
    }
}
