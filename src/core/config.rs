use std::env;

use crate::chat::HistoryRoles;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_hostname: String,
    pub api_key: String,
    pub model: String,
    pub request_timeout_secs: u64,
    pub history_roles: HistoryRoles,
    pub web_ui_path: String,
    pub session_idle_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let api_hostname = env::var("ULTRACHAT_API_HOST")
            .unwrap_or_else(|_| "https://api.mistral.ai".to_string());
        // The key stays on the server. The fallback will not authenticate.
        let api_key =
            env::var("MISTRAL_API_KEY").unwrap_or_else(|_| "thiswontworkformistral".to_string());
        let model = env::var("ULTRACHAT_MODEL").unwrap_or_else(|_| "mistral-tiny".to_string());
        let request_timeout_secs = env::var("ULTRACHAT_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        let history_roles = env::var("ULTRACHAT_HISTORY_ROLES")
            .ok()
            .and_then(|s| {
                s.parse::<HistoryRoles>()
                    .inspect_err(|e| tracing::warn!("Ignoring ULTRACHAT_HISTORY_ROLES: {}", e))
                    .ok()
            })
            .unwrap_or_default();
        let web_ui_path =
            env::var("ULTRACHAT_WEB_UI_PATH").unwrap_or_else(|_| "./web-ui/src".to_string());
        let session_idle_secs = env::var("ULTRACHAT_SESSION_IDLE_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(3600);

        Self {
            api_hostname,
            api_key,
            model,
            request_timeout_secs,
            history_roles,
            web_ui_path,
            session_idle_secs,
        }
    }
}
