use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::core::Widget;
use crate::core::request::RequestState;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{MessageList, StatsPanel, TitleBar, input_box};

/// Below this width the stats panel is hidden.
const STATS_MIN_TOTAL_WIDTH: u16 = 80;
const STATS_WIDTH: u16 = 34;

/// Title, conversation (with stats panel on the right), input.
pub fn layout(area: Rect) -> (Rect, Rect, Option<Rect>, Rect) {
    use Constraint::{Length, Min};
    let [title_area, main_area, input_area] =
        Layout::vertical([Length(1), Min(0), Length(input_box::HEIGHT)]).areas(area);

    if area.width < STATS_MIN_TOTAL_WIDTH {
        return (title_area, main_area, None, input_area);
    }
    let [chat_area, stats_area] =
        Layout::horizontal([Min(0), Length(STATS_WIDTH)]).areas(main_area);
    (title_area, chat_area, Some(stats_area), input_area)
}

pub fn draw_ui(frame: &mut Frame, widget: &Widget, tui: &mut TuiState, spinner_frame: usize) {
    let (title_area, chat_area, stats_area, input_area) = layout(frame.area());

    MessageList::new(&mut tui.message_list, widget, spinner_frame).render(frame, chat_area);

    if let Some(stats_area) = stats_area {
        StatsPanel::new(widget.stats.as_ref()).render(frame, stats_area);
    }

    TitleBar::new(
        &widget.status_message,
        widget.request_state() == RequestState::Pending,
        tui.message_list.has_unseen_content(),
    )
    .render(frame, title_area);

    tui.input_box.enabled = widget.submit_enabled();
    tui.input_box.render(frame, input_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use crate::core::input::RawInput;
    use crate::core::{Action, update};
    use crate::test_support::{sample_result, sample_stats};

    fn tui_state() -> TuiState {
        TuiState::new(
            vec!["triste".into()],
            vec!["romance".into()],
            vec!["Sorpréndeme".into()],
        )
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        let mut out = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn draw(widget: &Widget, tui: &mut TuiState, width: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, 40)).unwrap();
        terminal.draw(|f| draw_ui(f, widget, tui, 0)).unwrap();
        screen(&terminal)
    }

    fn sync(widget: &mut Widget, tui: &mut TuiState) {
        for delta in widget.log.take_delta() {
            tui.message_list.apply(delta);
        }
    }

    #[test]
    fn test_layout_hides_stats_on_narrow_terminals() {
        let (_, _, stats, _) = layout(Rect::new(0, 0, 60, 20));
        assert!(stats.is_none());
        let (_, chat, stats, input) = layout(Rect::new(0, 0, 120, 20));
        assert_eq!(stats.map(|r| r.width), Some(STATS_WIDTH));
        assert_eq!(chat.width, 120 - STATS_WIDTH);
        assert_eq!(input.height, input_box::HEIGHT);
    }

    #[test]
    fn test_draw_empty_widget() {
        let widget = Widget::new();
        let mut tui = tui_state();
        let out = draw(&widget, &mut tui, 100);
        assert!(out.contains("Welcome to BookMate!"));
        assert!(out.contains("Loading stats..."));
    }

    #[test]
    fn test_draw_full_turn() {
        let mut widget = Widget::new();
        let mut tui = tui_state();
        update(&mut widget, Action::Submit(RawInput::Text("quiero algo triste".into()))).unwrap();
        sync(&mut widget, &mut tui);
        let pending = draw(&widget, &mut tui, 100);
        assert!(pending.contains("quiero algo triste"));
        assert!(pending.contains("Waiting for BookMate"));

        update(&mut widget, Action::RecommendationResolved(Ok(sample_result()))).unwrap();
        update(
            &mut widget,
            Action::StatsResolved {
                seq: 1,
                outcome: Ok(sample_stats()),
            },
        )
        .unwrap();
        sync(&mut widget, &mut tui);
        let done = draw(&widget, &mut tui, 100);
        assert!(done.contains("Pedro Páramo"));
        assert!(done.contains("80% match"));
        assert!(!done.contains("thinking"));
        assert!(done.contains("Total feedback: 3"));
    }
}
