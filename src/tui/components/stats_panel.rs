//! # StatsPanel Component
//!
//! Side panel with what the recommender has learned so far. Stateless:
//! it renders whatever snapshot the widget holds, or a placeholder before
//! the first one arrives.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Wrap};

use crate::service::{BookRank, SessionStats};
use crate::tui::component::Component;

/// Books listed per ranking.
pub const MAX_BOOKS: usize = 3;

pub struct StatsPanel<'a> {
    pub stats: Option<&'a SessionStats>,
}

impl<'a> StatsPanel<'a> {
    pub fn new(stats: Option<&'a SessionStats>) -> Self {
        Self { stats }
    }
}

fn heading(text: &'static str) -> Line<'static> {
    Line::styled(text, Style::default().add_modifier(Modifier::BOLD))
}

fn muted(text: impl Into<String>) -> Line<'static> {
    Line::styled(
        text.into(),
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )
}

fn rank_line(position: usize, rank: &BookRank, fg: Color) -> Line<'static> {
    let mut detail = format!("score {:.1}", rank.score);
    if let (Some(pos), Some(neg)) = (rank.positive, rank.negative) {
        detail = format!("+{pos}/-{neg} · {detail}");
    }
    Line::from(vec![
        Span::raw(format!("{position}. ")),
        Span::styled(rank.book.clone(), Style::default().fg(fg)),
        Span::styled(format!(" ({detail})"), Style::default().fg(Color::DarkGray)),
    ])
}

pub fn stats_lines(stats: Option<&SessionStats>) -> Vec<Line<'static>> {
    let Some(stats) = stats else {
        return vec![muted("Loading stats...")];
    };

    let mut lines = vec![
        Line::from(vec![
            Span::raw("Total feedback: "),
            Span::styled(
                stats.total_interactions.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
    ];
    if stats.session_recommended > 0 {
        lines.push(muted(format!(
            "Books suggested this session: {}",
            stats.session_recommended
        )));
    }
    lines.push(Line::default());
    lines.push(heading("🏆 Favorites"));
    if stats.top_books.is_empty() {
        lines.push(muted("No favorites yet"));
    }
    for (i, rank) in stats.top_books.iter().take(MAX_BOOKS).enumerate() {
        lines.push(rank_line(i + 1, rank, Color::Green));
    }

    lines.push(Line::default());
    lines.push(heading("📉 Needs work"));
    if stats.worst_books.is_empty() {
        lines.push(muted("Nothing flagged yet"));
    }
    for (i, rank) in stats.worst_books.iter().take(MAX_BOOKS).enumerate() {
        lines.push(rank_line(i + 1, rank, Color::Red));
    }

    if !stats.top_emotions.is_empty() {
        lines.push(Line::default());
        lines.push(heading("🎭 Moods"));
        for emotion in stats.top_emotions.iter().take(MAX_BOOKS) {
            lines.push(Line::raw(format!("{} × {}", emotion.emotion, emotion.count)));
        }
    }
    lines
}

impl<'a> Component for StatsPanel<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .title("📊 Learning")
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::DIM))
            .padding(Padding::horizontal(1));
        let panel = Paragraph::new(stats_lines(self.stats))
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(panel, area);
    }
}
