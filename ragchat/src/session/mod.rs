//! Conversation session: state machine, options and events.

mod controller;
mod copy;
mod state;

pub use controller::SessionController;
pub use state::{Notice, NoticeLevel, Outcome, Phase, Rejected, SessionEvent, SessionOptions};
