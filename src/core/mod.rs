//! # Core Widget Logic
//!
//! The conversation state machine. It knows nothing about terminals,
//! HTTP, or timers.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Widget (state)       │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │ Effects
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │ Controller │      │    TUI     │      │  Service   │
//!     │  (tokio)   │      │ (ratatui)  │      │ (reqwest)  │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`input`]: Input Gate, validates what the user submitted
//! - [`request`]: Request Coordinator, the single in-flight request
//! - [`message_log`]: append-only conversation record
//! - [`render`]: recommendation card and analysis follow-up
//! - [`feedback`]: one-shot feedback per recommendation
//! - [`state`]: the `Widget` struct tying it together
//! - [`action`]: the `Action` enum and `update()`

pub mod action;
pub mod config;
pub mod error;
pub mod feedback;
pub mod input;
pub mod message_log;
pub mod render;
pub mod request;
pub mod state;

pub use action::{Action, Effect, update};
pub use error::WidgetError;
pub use state::Widget;
