use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::feedback::Verdict;
use crate::core::message_log::{Content, Message, Role};
use crate::core::render::{RATIONALE_HEADING, RecommendationCard, Tier};
use crate::tui::component::Component;
use crate::tui::markdown;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

const BOT_FG: Color = Color::Blue;
const USER_FG: Color = Color::Green;

/// Where a recommendation's feedback buttons stand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackState {
    Open,
    Sending,
    Closed,
}

/// One conversation bubble. Created fresh each frame by `MessageList`.
#[derive(Clone, Copy)]
pub struct MessageView<'a> {
    pub message: &'a Message,
    /// Only meaningful for recommendation cards.
    pub feedback: FeedbackState,
    /// Drives the typing dots.
    pub spinner_frame: usize,
}

impl<'a> MessageView<'a> {
    pub fn new(message: &'a Message, feedback: FeedbackState, spinner_frame: usize) -> Self {
        Self {
            message,
            feedback,
            spinner_frame,
        }
    }

    /// Rows needed at `width`, borders included.
    ///
    /// Measured with the feedback buttons showing, the widest variant of the
    /// card. Later feedback states only get shorter, so the cached height
    /// stays valid for the lifetime of the message.
    pub fn calculate_height(message: &Message, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return 1;
        }
        let body = body(message, FeedbackState::Open, 0);
        let lines = Paragraph::new(body)
            .wrap(Wrap { trim: false })
            .line_count(content_width);
        (lines as u16).max(1) + VERTICAL_OVERHEAD
    }
}

impl<'a> Widget for MessageView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (title, fg) = match self.message.role {
            Role::User => ("you", USER_FG),
            Role::Bot => ("bookmate", BOT_FG),
        };
        let border_style = match &self.message.content {
            Content::Warning(_) => Style::default().fg(Color::Yellow),
            Content::Error(_) => Style::default().fg(Color::Red),
            Content::Recommendation(_) if self.feedback == FeedbackState::Open => {
                Style::default().fg(Color::Magenta)
            }
            _ => Style::default().fg(fg).add_modifier(Modifier::DIM),
        };

        let block = Block::bordered()
            .title(title)
            .title_top(
                Line::from(self.message.timestamp.format("%H:%M").to_string()).right_aligned(),
            )
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner_area = block.inner(area);
        block.render(area, buf);

        Paragraph::new(body(self.message, self.feedback, self.spinner_frame))
            .wrap(Wrap { trim: false })
            .render(inner_area, buf);
    }
}

impl<'a> Component for MessageView<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}

fn body(message: &Message, feedback: FeedbackState, spinner_frame: usize) -> Text<'static> {
    match (&message.content, message.role) {
        (Content::Text(text), Role::User) => {
            Text::styled(text.trim().to_string(), Style::default().fg(USER_FG))
        }
        (Content::Text(text), Role::Bot) => markdown::render(text.trim(), BOT_FG),
        (Content::Warning(text), _) => {
            Text::styled(text.clone(), Style::default().fg(Color::Yellow))
        }
        (Content::Error(text), _) => Text::styled(text.clone(), Style::default().fg(Color::Red)),
        (Content::Typing, _) => {
            let dots = ".".repeat(spinner_frame % 3 + 1);
            Text::styled(
                format!("BookMate is thinking{dots:<3}"),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )
        }
        (Content::Recommendation(card), _) => card_text(card, feedback),
    }
}

fn card_text(card: &RecommendationCard, feedback: FeedbackState) -> Text<'static> {
    let book = &card.result.book;
    let accent = parse_color_token(&book.color_token).unwrap_or(Color::Magenta);
    let mut lines: Vec<Line<'static>> = Vec::new();

    lines.push(Line::styled(
        card.headline,
        Style::default().fg(BOT_FG).add_modifier(Modifier::BOLD),
    ));
    lines.push(Line::default());

    let emoji = if book.emoji.is_empty() { "📖" } else { book.emoji.as_str() };
    lines.push(Line::styled(
        format!("{emoji} {}", book.title),
        Style::default().fg(accent).add_modifier(Modifier::BOLD),
    ));
    if !book.author.is_empty() {
        lines.push(Line::styled(
            format!("by {}", book.author),
            Style::default().add_modifier(Modifier::ITALIC),
        ));
    }
    if !book.description.is_empty() {
        lines.push(Line::raw(book.description.clone()));
    }

    let badges: Vec<Span<'static>> = card
        .confidence
        .iter()
        .chain(card.learning.iter())
        .flat_map(|badge| {
            [
                Span::styled(format!("[{}]", badge.text), tier_style(badge.tier)),
                Span::raw(" "),
            ]
        })
        .collect();
    if !badges.is_empty() {
        lines.push(Line::from(badges));
    }

    if !card.result.rationale.trim().is_empty() {
        lines.push(Line::default());
        lines.push(Line::styled(
            RATIONALE_HEADING,
            Style::default().add_modifier(Modifier::BOLD),
        ));
        lines.extend(markdown::render(card.result.rationale.trim(), BOT_FG).lines);
    }

    if let Some(alternatives) = &card.alternatives {
        lines.push(Line::default());
        lines.push(Line::from(vec![
            Span::styled("📚 Also consider: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(alternatives.join(", ")),
        ]));
    }

    lines.push(Line::default());
    lines.push(feedback_line(feedback));
    Text::from(lines)
}

fn feedback_line(feedback: FeedbackState) -> Line<'static> {
    match feedback {
        FeedbackState::Open => {
            let mut spans = Vec::new();
            for (i, verdict) in Verdict::ALL.iter().enumerate() {
                spans.push(Span::styled(
                    format!("F{}", i + 1),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::raw(format!(" {}  ", verdict.label())));
            }
            Line::from(spans)
        }
        FeedbackState::Sending => Line::styled(
            "Sending your feedback...",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ),
        FeedbackState::Closed => Line::styled(
            "✓ Feedback received",
            Style::default().fg(Color::DarkGray),
        ),
    }
}

fn tier_style(tier: Tier) -> Style {
    let fg = match tier {
        Tier::High => Color::Green,
        Tier::Medium => Color::Yellow,
        Tier::Low => Color::Red,
    };
    Style::default().fg(fg).add_modifier(Modifier::BOLD)
}

/// `#RRGGBB` → `Color::Rgb`. Anything else is ignored.
fn parse_color_token(token: &str) -> Option<Color> {
    let hex = token.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}
