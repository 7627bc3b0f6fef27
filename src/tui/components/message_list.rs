//! # MessageList Component
//!
//! Scrollable view of the conversation.
//!
//! ## Responsibilities
//!
//! - Keep the page's copy of the conversation, built only from [`LogDelta`]s
//! - Cache message heights so scrolling doesn't re-measure history
//! - Stick to the bottom while new messages arrive, unless the user scrolled up
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the widget (props, used
//! to look up feedback state per card).

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::Widget;
use crate::core::message_log::{LogDelta, Message, MessageId};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::{FeedbackState, MessageView};
use crate::tui::event::TuiEvent;

/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    /// Messages on screen, in log order.
    pub entries: Vec<Message>,
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::default(),
            stick_to_bottom: true,
            viewport_height: 0,
        }
    }

    /// Applies one log change. Appends go to the end; removals drop the
    /// entry and invalidate cached heights from that point on.
    pub fn apply(&mut self, delta: LogDelta) {
        match delta {
            LogDelta::Appended(message) => self.entries.push(message),
            LogDelta::Removed(id) => {
                if let Some(idx) = self.position(id) {
                    self.entries.remove(idx);
                    self.layout.invalidate_from(idx);
                }
            }
        }
    }

    pub fn position(&self, id: MessageId) -> Option<usize> {
        self.entries.iter().position(|m| m.id == id)
    }

    /// True when content extends below the viewport.
    pub fn has_unseen_content(&self) -> bool {
        let total: u16 = self.layout.heights.iter().sum();
        let max_y = total.saturating_sub(self.viewport_height);
        !self.stick_to_bottom && self.scroll_state.offset().y < max_y
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let total_content_height: u16 = self.layout.heights.iter().sum();
        let max_y = total_content_height.saturating_sub(self.viewport_height);
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Re-engage auto-scroll once the user scrolls back to the end.
    pub fn repin_if_at_bottom(&mut self) {
        let total_content_height: u16 = self.layout.heights.iter().sum();
        let max_y = total_content_height.saturating_sub(self.viewport_height);
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }
}

fn feedback_state(widget: &Widget, message: &Message) -> FeedbackState {
    if widget.feedback.is_in_flight(message.id) {
        FeedbackState::Sending
    } else if widget.feedback_enabled(message.id) {
        FeedbackState::Open
    } else {
        FeedbackState::Closed
    }
}

pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub widget: &'a Widget,
    pub spinner_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(state: &'a mut MessageListState, widget: &'a Widget, spinner_frame: usize) -> Self {
        Self {
            state,
            widget,
            spinner_frame,
        }
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar
        let num_items = self.state.entries.len();

        // 1. Measure anything not yet in the cache
        let layout = &mut self.state.layout;
        let reusable = layout.reusable_count(num_items, content_width);
        layout.heights.truncate(reusable);
        for message in self.state.entries.iter().skip(reusable) {
            layout
                .heights
                .push(MessageView::calculate_height(message, content_width));
        }
        layout.rebuild_prefix_heights();
        layout.content_width = content_width;

        let total_height: u16 = layout.heights.iter().sum();

        // 2. Clamp unless pinned; scroll_to_bottom handles the pinned case
        self.state.viewport_height = area.height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let scroll_offset = self.state.scroll_state.offset().y;
        let visible_range = self.state.layout.visible_range(scroll_offset, area.height);

        // 3. Render visible messages into a ScrollView
        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset: u16 = if visible_range.start > 0 {
            self.state.layout.prefix_heights[visible_range.start - 1]
        } else {
            0
        };

        for i in visible_range {
            let message = &self.state.entries[i];
            let height = self.state.layout.heights[i];
            let view = MessageView::new(
                message,
                feedback_state(self.widget, message),
                self.spinner_frame,
            );
            scroll_view.render_widget(view, Rect::new(0, y_offset, content_width, height));
            y_offset += height;
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollToBottom => {
                self.stick_to_bottom = true;
            }
            _ => {}
        }
        None
    }
}

/// Cached layout measurements
#[derive(Default)]
pub struct LayoutCache {
    pub heights: Vec<u16>,
    /// Running totals: `prefix_heights[i]` is the bottom edge of message `i`.
    pub prefix_heights: Vec<u16>,
    content_width: u16,
}

impl LayoutCache {
    /// How many cached heights are still valid for `message_count`
    /// messages at `content_width`.
    pub fn reusable_count(&self, message_count: usize, content_width: u16) -> usize {
        if self.content_width != content_width {
            return 0;
        }
        self.heights.len().min(message_count)
    }

    pub fn invalidate_from(&mut self, idx: usize) {
        self.heights.truncate(idx);
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    /// Indices worth rendering for the viewport, with half a screen of
    /// slack on either side.
    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let slack = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(slack);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(slack);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}
