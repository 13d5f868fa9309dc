//! The core models for a single in-memory chat session.
use std::fmt;
use std::str::FromStr;

use anyhow::{Error, anyhow};
use serde::{Deserialize, Serialize};

use crate::mistral::{Message, Role};

/// Text of the turn appended when a completion fails for any reason.
pub const ERROR_TEXT: &str = "Error occurred while fetching data.";

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Speaker {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "error")]
    Error,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Turn {
    speaker: Speaker,
    text: String,
}

impl Turn {
    pub fn new(speaker: Speaker, text: &str) -> Self {
        Self {
            speaker,
            text: text.to_string(),
        }
    }

    pub fn user(text: &str) -> Self {
        Self::new(Speaker::User, text)
    }

    pub fn assistant(text: &str) -> Self {
        Self::new(Speaker::Assistant, text)
    }

    pub fn error() -> Self {
        Self::new(Speaker::Error, ERROR_TEXT)
    }

    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// How prior turns are tagged when the transcript is replayed to the
/// completion API. The newest message is always sent as `user`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HistoryRoles {
    /// Each turn keeps the role of whoever said it.
    #[default]
    BySpeaker,
    /// Every prior user and assistant turn is sent as `assistant`.
    /// Only the role changes: content goes out as typed, without the
    /// display labels, and error turns are still left out.
    Collapsed,
}

impl HistoryRoles {
    fn role_for(&self, speaker: Speaker) -> Role {
        match (self, speaker) {
            (HistoryRoles::BySpeaker, Speaker::User) => Role::User,
            _ => Role::Assistant,
        }
    }
}

impl FromStr for HistoryRoles {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "speaker" | "by_speaker" => Ok(HistoryRoles::BySpeaker),
            "collapsed" => Ok(HistoryRoles::Collapsed),
            other => Err(anyhow!("Unknown history roles mode: {}", other)),
        }
    }
}

impl fmt::Display for HistoryRoles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryRoles::BySpeaker => write!(f, "speaker"),
            HistoryRoles::Collapsed => write!(f, "collapsed"),
        }
    }
}

/// Append-only, chronologically ordered list of turns.
#[derive(Clone, Default, Debug, Serialize)]
pub struct Transcript(Vec<Turn>);

impl Transcript {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, turn: Turn) {
        self.0.push(turn)
    }

    pub fn turns(&self) -> &[Turn] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.0.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.0.iter()
    }

    /// Replays the transcript as completion messages followed by
    /// `newest` as the final `user` message. Error turns are never
    /// sent.
    pub fn to_request(&self, newest: &str, roles: HistoryRoles) -> Vec<Message> {
        self.0
            .iter()
            .filter(|t| t.speaker != Speaker::Error)
            .map(|t| Message::new(roles.role_for(t.speaker), &t.text))
            .chain(std::iter::once(Message::new(Role::User, newest)))
            .collect()
    }
}
