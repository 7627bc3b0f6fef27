//! Markdown → ratatui `Text` for bot messages.
//!
//! The recommender writes short prose with `**bold**` names, the odd list,
//! and occasionally a quoted passage. Anything richer (tables, images, HTML)
//! is dropped.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

pub fn render(content: &str, base_fg: Color) -> Text<'static> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);

    let mut out = LineBuilder::new(base_fg);
    for event in Parser::new_ext(content, opts) {
        out.handle(event);
    }
    out.text
}

struct LineBuilder {
    text: Text<'static>,
    base_fg: Color,
    /// Nested inline styles; each entry is already patched onto its parent.
    styles: Vec<Style>,
    /// Prepended to every new line (blockquote bar).
    prefix: Option<Span<'static>>,
    /// None = bullet list, Some(n) = numbered list at n.
    lists: Vec<Option<u64>>,
    in_code: bool,
    needs_gap: bool,
}

impl LineBuilder {
    fn new(base_fg: Color) -> Self {
        Self {
            text: Text::default(),
            base_fg,
            styles: Vec::new(),
            prefix: None,
            lists: Vec::new(),
            in_code: false,
            needs_gap: false,
        }
    }

    fn style(&self) -> Style {
        self.styles
            .last()
            .copied()
            .unwrap_or_else(|| Style::default().fg(self.base_fg))
    }

    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.style().patch(overlay));
    }

    fn new_line(&mut self) {
        let mut line = Line::default();
        if let Some(prefix) = &self.prefix {
            line.spans.push(prefix.clone());
        }
        self.text.lines.push(line);
    }

    fn push_span(&mut self, span: Span<'static>) {
        if self.text.lines.is_empty() {
            self.new_line();
        }
        if let Some(line) = self.text.lines.last_mut() {
            line.push_span(span);
        }
    }

    fn start_block(&mut self) {
        if self.needs_gap {
            self.text.lines.push(Line::default());
            self.needs_gap = false;
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(t) => self.text(t),
            Event::Code(c) => self.push_span(Span::styled(
                c.to_string(),
                Style::default().fg(Color::White).bg(Color::DarkGray),
            )),
            Event::SoftBreak => self.push_span(Span::raw(" ")),
            Event::HardBreak => self.new_line(),
            Event::Rule => {
                self.start_block();
                self.push_span(Span::styled(
                    "─".repeat(24),
                    Style::default().fg(Color::DarkGray),
                ));
                self.needs_gap = true;
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                // List items wrap their text in a paragraph on loose lists.
                if self.lists.is_empty() {
                    self.start_block();
                    self.new_line();
                }
            }
            Tag::Heading { .. } => {
                self.start_block();
                self.new_line();
                self.push_style(Style::default().add_modifier(Modifier::BOLD));
            }
            Tag::BlockQuote(_) => {
                self.start_block();
                self.prefix = Some(Span::styled("│ ", Style::default().fg(Color::DarkGray)));
                self.push_style(Style::default().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(_) => {
                self.start_block();
                self.in_code = true;
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.start_block();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.new_line();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let m = format!("{indent}{n}. ");
                        *n += 1;
                        m
                    }
                    _ => format!("{indent}• "),
                };
                self.push_span(Span::styled(marker, Style::default().fg(Color::DarkGray)));
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            _ => {}
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if self.lists.is_empty() {
                    self.needs_gap = true;
                }
            }
            TagEnd::Heading(_) => {
                self.styles.pop();
                self.needs_gap = true;
            }
            TagEnd::BlockQuote(_) => {
                self.prefix = None;
                self.styles.pop();
                self.needs_gap = true;
            }
            TagEnd::CodeBlock => {
                self.in_code = false;
                self.needs_gap = true;
            }
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.needs_gap = true;
                }
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.styles.pop();
            }
            _ => {}
        }
    }

    fn text(&mut self, cow: CowStr<'_>) {
        // ratatui renders \t as zero-width
        let text = cow.replace('\t', "    ");
        if self.in_code {
            let code = Style::default().fg(Color::White);
            for line in text.lines() {
                self.new_line();
                self.push_span(Span::styled(line.to_owned(), code));
            }
            return;
        }
        let style = self.style();
        self.push_span(Span::styled(text, style));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &Text<'_>) -> Vec<String> {
        text.lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn bold_book_title_is_bold() {
        let text = render("Te recomiendo **Pedro Páramo** hoy.", Color::Blue);
        let span = text.lines[0]
            .spans
            .iter()
            .find(|s| s.content == "Pedro Páramo")
            .unwrap();
        assert!(span.style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(span.style.fg, Some(Color::Blue));
    }

    #[test]
    fn plain_text_uses_base_color() {
        let text = render("hola", Color::Green);
        assert_eq!(text.lines[0].spans[0].style.fg, Some(Color::Green));
    }

    #[test]
    fn paragraphs_are_separated_by_a_blank_line() {
        let text = render("uno\n\ndos", Color::Blue);
        assert_eq!(plain(&text), vec!["uno", "", "dos"]);
    }

    #[test]
    fn numbered_list_items_get_markers() {
        let text = render("1. Rayuela\n2. Aura", Color::Blue);
        assert_eq!(plain(&text), vec!["1. Rayuela", "2. Aura"]);
    }

    #[test]
    fn bullet_list_items_get_markers() {
        let text = render("- uno\n- dos", Color::Blue);
        assert_eq!(plain(&text), vec!["• uno", "• dos"]);
    }

    #[test]
    fn blockquote_lines_are_prefixed() {
        let text = render("> una cita", Color::Blue);
        let lines = plain(&text);
        assert_eq!(lines, vec!["│ una cita"]);
    }

    #[test]
    fn tabs_expanded_to_spaces() {
        let text = render("```\n\tsangría\n```", Color::Blue);
        assert!(plain(&text).iter().any(|l| l.starts_with("    sangría")));
        assert!(!plain(&text).iter().any(|l| l.contains('\t')));
    }
}
