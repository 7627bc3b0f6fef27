//! # Controller
//!
//! Runs one widget: feeds page events into `core::update`, carries out the
//! returned effects on tokio tasks, and turns their results back into
//! actions on a channel.
//!
//! ```text
//! page ──on_submit/on_feedback──▶ update() ──Effect──▶ tokio::spawn
//!   ▲                                ▲                      │
//!   └──── take_delta() ◀──── widget  └──── Action ◀─────────┘ (channel)
//! ```
//!
//! All widget mutation happens on the caller's task. Background tasks only
//! ever send actions.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::AbortHandle;

use crate::core::feedback::Verdict;
use crate::core::input::RawInput;
use crate::core::message_log::{LogDelta, MessageId};
use crate::core::{Action, Effect, Widget, WidgetError, update};
use crate::service::{BookService, ServiceError};

pub struct Controller {
    widget: Widget,
    service: Arc<dyn BookService>,
    tx: UnboundedSender<Action>,
    rx: UnboundedReceiver<Action>,
    analysis_delay: Duration,
    /// Scheduled analysis messages not yet delivered.
    timers: Vec<AbortHandle>,
}

impl Controller {
    /// Must be called from within a tokio runtime.
    pub fn new(service: Arc<dyn BookService>, analysis_delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        info!("Widget controller using service '{}'", service.name());
        Self {
            widget: Widget::new(),
            service,
            tx,
            rx,
            analysis_delay,
            timers: Vec::new(),
        }
    }

    pub fn widget(&self) -> &Widget {
        &self.widget
    }

    /// Changes to the message log since the last call.
    pub fn take_delta(&mut self) -> Vec<LogDelta> {
        self.widget.log.take_delta()
    }

    pub fn on_submit(&mut self, input: RawInput) -> Result<(), WidgetError> {
        self.dispatch(Action::Submit(input))
    }

    pub fn on_feedback(&mut self, message_id: MessageId, verdict: Verdict) -> Result<(), WidgetError> {
        self.dispatch(Action::Feedback {
            message_id,
            verdict,
        })
    }

    pub fn refresh_stats(&mut self) {
        if let Err(e) = self.dispatch(Action::RefreshStats) {
            warn!("Stats refresh not started: {}", e);
        }
    }

    /// Applies an action and starts whatever it asks for.
    pub fn dispatch(&mut self, action: Action) -> Result<(), WidgetError> {
        debug!("Dispatch: {:?}", action);
        let effects = update(&mut self.widget, action)?;
        for effect in effects {
            self.run(effect);
        }
        Ok(())
    }

    /// Applies every background result that has already arrived.
    /// Returns how many were applied.
    pub fn process_ready(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(action) = self.rx.try_recv() {
            self.apply_background(action);
            applied += 1;
        }
        applied
    }

    /// Waits for the next background result and applies it.
    pub async fn process_next(&mut self) {
        if let Some(action) = self.rx.recv().await {
            self.apply_background(action);
        }
    }

    /// Cancels scheduled analysis messages. In-flight requests are left to
    /// finish; their results are simply never applied.
    pub fn shutdown(&mut self) {
        let pending = self.timers.iter().filter(|h| !h.is_finished()).count();
        if pending > 0 {
            info!("Cancelling {} scheduled analysis message(s)", pending);
        }
        for handle in self.timers.drain(..) {
            handle.abort();
        }
    }

    fn apply_background(&mut self, action: Action) {
        if let Err(e) = self.dispatch(action) {
            warn!("Background action rejected: {}", e);
        }
    }

    fn run(&mut self, effect: Effect) {
        let service = self.service.clone();
        let tx = self.tx.clone();
        match effect {
            Effect::Recommend(payload) => {
                info!("Spawning recommendation request");
                spawn_guarded(
                    tx,
                    async move { service.recommend(&payload).await },
                    Action::RecommendationResolved,
                );
            }
            Effect::SendFeedback {
                message_id,
                request,
            } => {
                info!("Spawning feedback submission for {}", message_id);
                spawn_guarded(
                    tx,
                    async move { service.submit_feedback(&request).await },
                    move |outcome| Action::FeedbackResolved {
                        message_id,
                        outcome,
                    },
                );
            }
            Effect::FetchStats { seq } => {
                debug!("Spawning stats refresh #{}", seq);
                spawn_guarded(
                    tx,
                    async move { service.fetch_stats().await },
                    move |outcome| Action::StatsResolved { seq, outcome },
                );
            }
            Effect::ScheduleAnalysis(card) => {
                let delay = self.analysis_delay;
                let handle = tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    if tx.send(Action::AnalysisDue(card)).is_err() {
                        warn!("Failed to deliver analysis message: receiver dropped");
                    }
                });
                self.timers.retain(|h| !h.is_finished());
                self.timers.push(handle.abort_handle());
            }
        }
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Runs a service call on its own task and always reports back.
///
/// If the call panics, the resolution is still sent (as a network error)
/// so the widget never stays pending.
fn spawn_guarded<T, F, M>(tx: UnboundedSender<Action>, call: F, into_action: M)
where
    T: Send + 'static,
    F: Future<Output = Result<T, ServiceError>> + Send + 'static,
    M: FnOnce(Result<T, ServiceError>) -> Action + Send + 'static,
{
    tokio::spawn(async move {
        let outcome = match tokio::spawn(call).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Service task failed: {}", e);
                Err(ServiceError::Network(format!("request task failed: {e}")))
            }
        };
        if tx.send(into_action(outcome)).is_err() {
            warn!("Failed to send service result: receiver dropped");
        }
    });
}
