//! Public types for the chat API
use serde::{Deserialize, Serialize};

use crate::chat::{RenderedTurn, Turn};

#[derive(Deserialize)]
pub struct ChatRequest {
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    Ignored,
    Busy,
    Completed,
}

#[derive(Serialize)]
pub struct ChatResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub status: ChatStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<Turn>,
    pub transcript: Vec<Turn>,
    pub pending: bool,
}

#[derive(Serialize)]
pub struct ChatTranscriptResponse {
    pub session_id: String,
    pub transcript: Vec<Turn>,
    pub rendered: Vec<RenderedTurn>,
    pub pending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typing: Option<&'static str>,
}

#[derive(Serialize)]
pub struct ChatSession {
    pub id: String,
    pub turns: usize,
    pub pending: bool,
}

#[derive(Serialize)]
pub struct ChatSessionsResponse {
    pub sessions: Vec<ChatSession>,
}
