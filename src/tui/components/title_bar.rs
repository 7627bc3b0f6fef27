//! # TitleBar Component
//!
//! One-line status bar: app name, the widget's status message, a
//! "thinking" marker while a request is pending, and "↓ New" when the
//! conversation has content below the current scroll position.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::component::Component;

pub struct TitleBar<'a> {
    pub status_message: &'a str,
    pub pending: bool,
    pub has_unseen_content: bool,
}

impl<'a> TitleBar<'a> {
    pub fn new(status_message: &'a str, pending: bool, has_unseen_content: bool) -> Self {
        Self {
            status_message,
            pending,
            has_unseen_content,
        }
    }

    pub fn text(&self) -> String {
        let mut parts = vec!["📚 BookMate".to_string()];
        if !self.status_message.is_empty() {
            parts.push(self.status_message.to_string());
        }
        if self.pending {
            parts.push("⏳".to_string());
        }
        if self.has_unseen_content {
            parts.push("↓ New".to_string());
        }
        parts.join(" | ")
    }
}

impl<'a> Component for TitleBar<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let line = Line::from(Span::styled(
            self.text(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(line, area);
    }
}
