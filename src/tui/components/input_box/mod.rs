//! # InputBox Component
//!
//! The submit surface: free text or the mood/genre picker.
//!
//! ## Responsibilities
//!
//! - Capture and edit text (insert, paste, backspace, cursor left/right)
//! - Switch between text and picker mode (Ctrl+G)
//! - Fill the buffer from canned suggestions (Ctrl+S)
//! - Emit a [`RawInput`] on Enter
//!
//! The box does not validate and does not clear itself on submit. The event
//! loop clears it only once the widget has accepted the input, so a
//! rejected submit leaves the text in place.

mod picker;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::core::input::RawInput;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

pub use picker::{Picker, PickerField};

/// Bordered single-row box.
pub const HEIGHT: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Text,
    Picker,
}

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Submit(RawInput),
    ContentChanged,
}

pub struct InputBox {
    pub buffer: String,
    /// Byte offset into `buffer`, always on a char boundary.
    cursor: usize,
    pub mode: InputMode,
    pub picker: Picker,
    suggestions: Vec<String>,
    next_suggestion: usize,
    /// Prop: false while a request is pending.
    pub enabled: bool,
}

impl InputBox {
    pub fn new(moods: Vec<String>, genres: Vec<String>, suggestions: Vec<String>) -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            mode: InputMode::Text,
            picker: Picker::new(moods, genres),
            suggestions,
            next_suggestion: 0,
            enabled: true,
        }
    }

    /// Called by the event loop after the widget accepted a submit.
    pub fn clear_after_submit(&mut self) {
        match self.mode {
            InputMode::Text => {
                self.buffer.clear();
                self.cursor = 0;
            }
            InputMode::Picker => self.picker.reset(),
        }
    }

    fn set_buffer(&mut self, text: &str) {
        self.buffer = text.to_string();
        self.cursor = self.buffer.len();
    }

    fn title(&self) -> String {
        if !self.enabled {
            return "Waiting for BookMate...".to_string();
        }
        match self.mode {
            InputMode::Text => {
                "Message (Enter send · Ctrl+G mood/genre · Ctrl+S suggestion)".to_string()
            }
            InputMode::Picker => "Mood & genre (Tab field · ←/→ choose · Enter send)".to_string(),
        }
    }

    fn picker_line(&self) -> Line<'static> {
        let field = |label: &str, value: Option<&str>, active: bool| {
            let mut style = Style::default().fg(if value.is_some() {
                Color::Green
            } else {
                Color::DarkGray
            });
            if active {
                style = style.add_modifier(Modifier::REVERSED);
            }
            [
                Span::raw(format!("{label}: ")),
                Span::styled(format!("‹ {} ›", value.unwrap_or("choose")), style),
            ]
        };
        let mut spans = Vec::new();
        spans.extend(field(
            "Mood",
            self.picker.selected_mood(),
            self.picker.field == PickerField::Mood,
        ));
        spans.push(Span::raw("   "));
        spans.extend(field(
            "Genre",
            self.picker.selected_genre(),
            self.picker.field == PickerField::Genre,
        ));
        Line::from(spans)
    }
}

/// Slice of `buffer` that fits in `width` columns with the cursor visible,
/// and the cursor's column within it.
fn visible_window(buffer: &str, cursor: usize, width: u16) -> (&str, u16) {
    let width = width as usize;
    if width == 0 {
        return ("", 0);
    }
    let col_of = |s: &str| s.chars().map(|c| c.width().unwrap_or(0)).sum::<usize>();

    // Drop leading chars until the cursor fits on screen.
    let mut start = 0;
    while col_of(&buffer[start..cursor]) >= width {
        match buffer[start..].chars().next() {
            Some(c) => start += c.len_utf8(),
            None => break,
        }
    }

    let mut end = start;
    let mut used = 0;
    for c in buffer[start..].chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        end += c.len_utf8();
    }
    (&buffer[start..end], col_of(&buffer[start..cursor]) as u16)
}

fn prev_char_boundary(s: &str, pos: usize) -> usize {
    s[..pos].char_indices().next_back().map_or(0, |(i, _)| i)
}

fn next_char_boundary(s: &str, pos: usize) -> usize {
    s[pos..].chars().next().map_or(pos, |c| pos + c.len_utf8())
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border_style = if self.enabled {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(self.title());
        let inner = block.inner(area);

        match self.mode {
            InputMode::Text => {
                let (visible, cursor_col) = visible_window(&self.buffer, self.cursor, inner.width);
                let input = Paragraph::new(visible.to_string())
                    .block(block)
                    .style(Style::default().fg(Color::Green));
                frame.render_widget(input, area);
                if self.enabled {
                    frame.set_cursor_position((inner.x + cursor_col, inner.y));
                }
            }
            InputMode::Picker => {
                frame.render_widget(Paragraph::new(self.picker_line()).block(block), area);
            }
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if let TuiEvent::TogglePicker = event {
            self.mode = match self.mode {
                InputMode::Text => InputMode::Picker,
                InputMode::Picker => InputMode::Text,
            };
            return Some(InputEvent::ContentChanged);
        }

        match self.mode {
            InputMode::Text => match event {
                TuiEvent::InputChar(c) => {
                    self.buffer.insert(self.cursor, *c);
                    self.cursor += c.len_utf8();
                    Some(InputEvent::ContentChanged)
                }
                TuiEvent::Paste(text) => {
                    // Single-line box
                    let flat = text.replace(['\r', '\n'], " ");
                    self.buffer.insert_str(self.cursor, &flat);
                    self.cursor += flat.len();
                    Some(InputEvent::ContentChanged)
                }
                TuiEvent::Backspace if self.cursor > 0 => {
                    let prev = prev_char_boundary(&self.buffer, self.cursor);
                    self.buffer.drain(prev..self.cursor);
                    self.cursor = prev;
                    Some(InputEvent::ContentChanged)
                }
                TuiEvent::Left if self.cursor > 0 => {
                    self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                    Some(InputEvent::ContentChanged)
                }
                TuiEvent::Right if self.cursor < self.buffer.len() => {
                    self.cursor = next_char_boundary(&self.buffer, self.cursor);
                    Some(InputEvent::ContentChanged)
                }
                TuiEvent::NextSuggestion if !self.suggestions.is_empty() => {
                    let idx = self.next_suggestion % self.suggestions.len();
                    let text = self.suggestions[idx].clone();
                    self.set_buffer(&text);
                    self.next_suggestion = idx + 1;
                    Some(InputEvent::ContentChanged)
                }
                TuiEvent::Submit => Some(InputEvent::Submit(RawInput::Text(self.buffer.clone()))),
                _ => None,
            },
            InputMode::Picker => match event {
                TuiEvent::NextField => {
                    self.picker.toggle_field();
                    Some(InputEvent::ContentChanged)
                }
                TuiEvent::Left => {
                    self.picker.cycle(-1);
                    Some(InputEvent::ContentChanged)
                }
                TuiEvent::Right => {
                    self.picker.cycle(1);
                    Some(InputEvent::ContentChanged)
                }
                TuiEvent::Backspace => {
                    self.picker.clear_field();
                    Some(InputEvent::ContentChanged)
                }
                TuiEvent::Submit => Some(InputEvent::Submit(RawInput::Selection {
                    mood: self.picker.selected_mood().map(str::to_string),
                    genre: self.picker.selected_genre().map(str::to_string),
                })),
                _ => None,
            },
        }
    }
}
