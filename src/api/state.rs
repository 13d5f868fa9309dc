use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::chat::ChatSession;
use crate::core::AppConfig;
use crate::mistral::{Completer, MistralClient};

pub type SharedCompleter = Arc<dyn Completer + Send + Sync + 'static>;

pub struct AppState {
    // Live chat sessions by ID. Nothing is persisted.
    pub sessions: HashMap<String, ChatSession>,
    pub completer: SharedCompleter,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let completer = Arc::new(MistralClient::from(&config));
        Self::new_with_completer(config, completer)
    }

    pub fn new_with_completer(config: AppConfig, completer: SharedCompleter) -> Self {
        Self {
            sessions: HashMap::new(),
            completer,
            config,
        }
    }

    /// Returns the session with `id`, starting a fresh one if needed.
    pub fn session_mut(&mut self, id: &str) -> &mut ChatSession {
        let roles = self.config.history_roles;
        self.sessions.entry(id.to_string()).or_insert_with(|| {
            tracing::info!("Starting chat session {}", id);
            ChatSession::new(id).history_roles(roles)
        })
    }

    /// Drops sessions that have sat idle for at least `max_idle`.
    /// Sessions with a completion in flight are kept. Returns how many
    /// were removed.
    pub fn evict_idle(&mut self, max_idle: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| session.is_pending() || session.idle_for() < max_idle);
        let evicted = before - self.sessions.len();
        if evicted > 0 {
            tracing::info!("Evicted {} idle chat sessions", evicted);
        }
        evicted
    }
}
