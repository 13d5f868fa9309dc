//! In-memory chat sessions: the transcript, the turn lifecycle and
//! how a transcript is displayed.

mod core;
mod models;
mod render;

pub use self::core::{ChatSession, PendingTurn, Submission};
pub use models::{ERROR_TEXT, HistoryRoles, Speaker, Transcript, Turn};
pub use render::{RenderedTurn, TYPING_INDICATOR, render_transcript, typing_indicator};
