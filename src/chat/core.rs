use std::time::{Duration, Instant};

use anyhow::{Error, Result, anyhow};
use uuid::Uuid;

use super::models::{HistoryRoles, Transcript, Turn};
use crate::mistral::{Completer, Message};

/// Result of handing user text to a session.
#[derive(Debug, PartialEq)]
pub enum Submission {
    /// The text was blank so nothing happened.
    Ignored,
    /// A completion is already in flight for this session so the
    /// text was rejected without touching the transcript.
    Busy,
    /// The user turn was recorded and a completion should be run.
    Started(PendingTurn),
    /// The whole turn ran and this reply (or error) was appended.
    Completed(Turn),
}

/// A turn waiting on its completion. `instance` identifies the session
/// that started it so a reply can't land in a different session that
/// happens to reuse the same ID.
#[derive(Debug, PartialEq)]
pub struct PendingTurn {
    pub instance: Uuid,
    pub messages: Vec<Message>,
}

/// A single chat conversation held in memory.
///
/// The session is the only thing allowed to mutate its transcript and
/// pending flag. Single owners (the REPL) drive it with
/// `submit_user_message`. Shared owners that can't hold a lock across
/// the network call (the API server) use `begin_turn` and
/// `finish_turn` instead.
#[derive(Debug)]
pub struct ChatSession {
    id: String,
    instance: Uuid,
    transcript: Transcript,
    pending: bool,
    history_roles: HistoryRoles,
    last_active: Instant,
}

impl ChatSession {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            instance: Uuid::new_v4(),
            transcript: Transcript::new(),
            pending: false,
            history_roles: HistoryRoles::default(),
            last_active: Instant::now(),
        }
    }

    pub fn history_roles(mut self, roles: HistoryRoles) -> Self {
        self.history_roles = roles;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn instance(&self) -> Uuid {
        self.instance
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Time since the last turn started or finished.
    pub fn idle_for(&self) -> Duration {
        self.last_active.elapsed()
    }

    /// Echoes the user's text into the transcript, marks the session
    /// pending and returns the messages to send for completion.
    pub fn begin_turn(&mut self, text: &str) -> Submission {
        if text.trim().is_empty() {
            return Submission::Ignored;
        }
        if self.pending {
            tracing::warn!("Session {} is busy, rejecting message", self.id);
            return Submission::Busy;
        }

        // History is built from the turns before this one, the new
        // text is always the final user message
        let messages = self.transcript.to_request(text, self.history_roles);
        self.transcript.push(Turn::user(text));
        self.pending = true;
        self.last_active = Instant::now();

        Submission::Started(PendingTurn {
            instance: self.instance,
            messages,
        })
    }

    /// Folds the completion result back into the transcript and clears
    /// the pending flag. Returns `None`, leaving the session untouched,
    /// when no turn is in flight or the turn was started by another
    /// session instance.
    pub fn finish_turn(&mut self, instance: Uuid, result: Result<String, Error>) -> Option<Turn> {
        if instance != self.instance {
            tracing::warn!(
                "Session {} dropped a reply meant for an earlier session with the same ID",
                self.id
            );
            return None;
        }
        if !self.pending {
            tracing::warn!(
                "Session {} received a completion with no turn in flight",
                self.id
            );
            return None;
        }
        Some(self.record_outcome(result))
    }

    fn record_outcome(&mut self, result: Result<String, Error>) -> Turn {
        let turn = match result {
            Ok(content) => Turn::assistant(&content),
            Err(e) => {
                tracing::error!("Error fetching chat response for session {}: {}", self.id, e);
                Turn::error()
            }
        };
        self.transcript.push(turn.clone());
        self.pending = false;
        self.last_active = Instant::now();
        turn
    }

    /// Runs a full turn: echo, completion, reply. Completion failures
    /// end up in the transcript as an error turn and are never
    /// returned. The pending flag is cleared even if this future is
    /// dropped before the completion resolves.
    pub async fn submit_user_message<C>(&mut self, completer: &C, text: &str) -> Submission
    where
        C: Completer + Sync + ?Sized,
    {
        let messages = match self.begin_turn(text) {
            Submission::Started(pending) => pending.messages,
            other => return other,
        };

        let guard = TurnGuard { session: self };
        let result = completer.complete(&messages).await;
        Submission::Completed(guard.finish(result))
    }
}

/// Releases the pending flag of a session when a turn is abandoned
/// mid-flight, recording the abandoned turn as an error.
struct TurnGuard<'a> {
    session: &'a mut ChatSession,
}

impl TurnGuard<'_> {
    fn finish(self, result: Result<String, Error>) -> Turn {
        self.session.record_outcome(result)
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        if self.session.pending {
            self.session
                .record_outcome(Err(anyhow!("Completion was cancelled before it finished")));
        }
    }
}
