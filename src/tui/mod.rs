//! # TUI Adapter
//!
//! The ratatui page for one widget. Handles terminal I/O, renders the
//! conversation, and turns key presses into controller calls.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Loop
//!
//! Each pass: apply background results (`Controller::process_ready`), drain
//! log deltas into the message list, draw if anything changed, then poll
//! input. While a request is pending the loop redraws every ~80ms so the
//! typing dots move; idle, it sleeps up to 500ms between polls.

mod component;
mod components;
mod event;
pub mod markdown;
mod ui;

use std::io::stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, info, warn};

use crate::controller::Controller;
use crate::core::WidgetError;
use crate::core::config::ResolvedConfig;
use crate::core::feedback::Verdict;
use crate::service::BookService;
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, MessageListState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Presentation state the core doesn't know about.
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
}

impl TuiState {
    pub fn new(moods: Vec<String>, genres: Vec<String>, suggestions: Vec<String>) -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(moods, genres, suggestions),
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Disambiguated escape codes let F-keys and Alt+digit through on
        // terminals that support it; others ignore the request.
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock, // Non-blinking: redraws reset the blink timer
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// What the loop should do after an event.
enum Flow {
    Continue,
    Quit,
}

/// Must be called from within a tokio runtime.
pub fn run(config: &ResolvedConfig, service: Arc<dyn BookService>) -> std::io::Result<()> {
    let mut controller = Controller::new(service, config.analysis_delay);
    let mut tui = TuiState::new(
        config.moods.clone(),
        config.genres.clone(),
        config.suggestions.clone(),
    );

    controller.refresh_stats();

    let mut terminal = ratatui::init();
    let terminal_mode_guard = TerminalModeGuard::new();
    if let Err(e) = &terminal_mode_guard {
        warn!("Terminal modes not enabled: {}", e);
    }

    let start_time = Instant::now();
    let mut needs_redraw = true;

    loop {
        if controller.process_ready() > 0 {
            needs_redraw = true;
        }
        for delta in controller.take_delta() {
            tui.message_list.apply(delta);
            needs_redraw = true;
        }

        let animating = controller.widget().log.has_typing();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 4.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, controller.widget(), &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        let mut should_quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if let Flow::Quit = handle_event(&mut controller, &mut tui, event) {
                should_quit = true;
                break;
            }
        }
        if should_quit {
            break;
        }
    }

    controller.shutdown();
    drop(terminal_mode_guard);
    ratatui::restore();
    info!("BookMate shut down");
    Ok(())
}

fn handle_event(controller: &mut Controller, tui: &mut TuiState, event: TuiEvent) -> Flow {
    match event {
        TuiEvent::Quit => return Flow::Quit,
        TuiEvent::Resize => {}
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown
        | TuiEvent::ScrollToBottom => {
            tui.message_list.handle_event(&event);
        }
        TuiEvent::Feedback(slot) => send_feedback(controller, slot),
        _ => {
            if let Some(InputEvent::Submit(raw)) = tui.input_box.handle_event(&event) {
                match controller.on_submit(raw) {
                    Ok(()) => {
                        tui.input_box.clear_after_submit();
                        tui.message_list.stick_to_bottom = true;
                    }
                    // Already shown inline as a warning
                    Err(WidgetError::Validation(e)) => debug!("Submit rejected: {}", e),
                    Err(e) => debug!("Submit ignored: {}", e),
                }
            }
        }
    }
    Flow::Continue
}

/// Sends feedback for the newest recommendation that still accepts it.
fn send_feedback(controller: &mut Controller, slot: usize) {
    let Some(verdict) = Verdict::ALL.get(slot).copied() else {
        return;
    };
    let Some(message_id) = controller.widget().latest_open_recommendation() else {
        debug!("No open recommendation for feedback");
        return;
    };
    if let Err(e) = controller.on_feedback(message_id, verdict) {
        warn!("Feedback not sent: {}", e);
    }
}
