//! # TUI Components
//!
//! ## Stateless (props only)
//!
//! - `TitleBar`: app name, status message, pending and "↓ New" markers
//! - `MessageView`: one conversation bubble, including recommendation cards
//! - `StatsPanel`: learning stats side panel
//!
//! ## Stateful (event-driven)
//!
//! - `InputBox`: text entry, mood/genre picker, suggestion chips
//! - `MessageList`: scrollable conversation fed by log deltas
//!
//! Components receive external data as props rather than reaching into
//! the widget, so each one can be rendered against a `TestBackend` alone.
//!
//! ```text
//! components/
//! ├── mod.rs
//! ├── title_bar.rs
//! ├── message.rs
//! ├── message_list.rs
//! ├── stats_panel.rs
//! └── input_box/       (text + picker)
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod input_box;
pub mod message;
pub use input_box::{InputBox, InputEvent};
pub mod message_list;
pub use message_list::{MessageList, MessageListState};
pub mod stats_panel;
pub use stats_panel::StatsPanel;
