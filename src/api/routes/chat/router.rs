//! Router for the chat API

use std::sync::{Arc, RwLock};

use anyhow::anyhow;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::chat::{PendingTurn, Submission, Turn, render_transcript, typing_indicator};

type SharedState = Arc<RwLock<AppState>>;

fn snapshot(state: &SharedState, session_id: &str) -> (Vec<Turn>, bool) {
    let shared_state = state.read().expect("Unable to read share state");
    shared_state
        .sessions
        .get(session_id)
        .map(|s| (s.transcript().turns().to_vec(), s.is_pending()))
        .unwrap_or_default()
}

/// Runs the completion for a turn that has already been started and
/// folds the result back into the session. The reply is dropped if the
/// session was ended in the meantime, even when a new session has since
/// taken the same ID.
///
/// The work happens in its own task so the session is released even if
/// the client hangs up before the reply arrives. The completion itself
/// runs in a nested task so a panic while calling the API is recorded
/// as a failed turn rather than leaving the session pending.
async fn complete_turn(
    state: SharedState,
    session_id: String,
    turn: PendingTurn,
) -> Result<Option<Turn>, ApiError> {
    let PendingTurn { instance, messages } = turn;
    let completer = Arc::clone(&state.read().expect("Unable to read share state").completer);

    let handle = tokio::spawn(async move {
        let completion = tokio::spawn(async move { completer.complete(&messages).await });
        let result = completion
            .await
            .unwrap_or_else(|e| Err(anyhow!("Completion task failed: {}", e)));

        let mut shared_state = state.write().expect("Unable to write share state");
        match shared_state.sessions.get_mut(&session_id) {
            Some(session) => session.finish_turn(instance, result),
            None => {
                tracing::warn!("Chat session {} ended before the reply arrived", session_id);
                None
            }
        }
    });

    Ok(handle.await?)
}

/// Add a message to a chat session and wait for the reply
async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<public::ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Blank messages are a no-op and must not start a session
    if payload.message.trim().is_empty() {
        let session_id = payload.session_id.filter(|id| {
            state
                .read()
                .expect("Unable to read share state")
                .sessions
                .contains_key(id)
        });
        let (transcript, pending) = session_id
            .as_deref()
            .map(|id| snapshot(&state, id))
            .unwrap_or_default();
        let resp = public::ChatResponse {
            session_id,
            status: public::ChatStatus::Ignored,
            reply: None,
            transcript,
            pending,
        };
        return Ok(Json(resp).into_response());
    }

    let session_id = payload
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let submission = {
        let mut shared_state = state.write().expect("Unable to write share state");
        shared_state
            .session_mut(&session_id)
            .begin_turn(&payload.message)
    };

    let (status_code, status, reply) = match submission {
        Submission::Ignored => (StatusCode::OK, public::ChatStatus::Ignored, None),
        Submission::Completed(turn) => (StatusCode::OK, public::ChatStatus::Completed, Some(turn)),
        Submission::Busy => (StatusCode::CONFLICT, public::ChatStatus::Busy, None),
        Submission::Started(turn) => {
            let reply = complete_turn(Arc::clone(&state), session_id.clone(), turn).await?;
            if reply.is_none() {
                return Ok((
                    StatusCode::NOT_FOUND,
                    format!("Chat session {} ended before the reply arrived", session_id),
                )
                    .into_response());
            }
            (StatusCode::OK, public::ChatStatus::Completed, reply)
        }
    };

    let (transcript, pending) = snapshot(&state, &session_id);
    let resp = public::ChatResponse {
        session_id: Some(session_id),
        status,
        reply,
        transcript,
        pending,
    };

    Ok((status_code, Json(resp)).into_response())
}

/// Get a single chat session by ID
async fn chat_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let shared_state = state.read().expect("Unable to read share state");
    let Some(session) = shared_state.sessions.get(&id) else {
        return Ok((
            StatusCode::NOT_FOUND,
            format!("Chat session {} not found", id),
        )
            .into_response());
    };

    let resp = public::ChatTranscriptResponse {
        session_id: id.clone(),
        transcript: session.transcript().turns().to_vec(),
        rendered: render_transcript(session.transcript()),
        pending: session.is_pending(),
        typing: typing_indicator(session.is_pending()),
    };

    Ok(Json(resp).into_response())
}

/// End a chat session, discarding its transcript
async fn chat_session_end(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = state
        .write()
        .expect("Unable to write share state")
        .sessions
        .remove(&id);

    match removed {
        Some(session) => {
            tracing::info!(
                "Ended chat session {} after {} turns",
                id,
                session.transcript().len()
            );
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        None => Ok((
            StatusCode::NOT_FOUND,
            format!("Chat session {} not found", id),
        )
            .into_response()),
    }
}

/// Get a list of all live chat sessions
async fn chat_list(State(state): State<SharedState>) -> Json<public::ChatSessionsResponse> {
    let shared_state = state.read().expect("Unable to read share state");
    let mut sessions: Vec<public::ChatSession> = shared_state
        .sessions
        .values()
        .map(|s| public::ChatSession {
            id: s.id().to_string(),
            turns: s.transcript().len(),
            pending: s.is_pending(),
        })
        .collect();
    sessions.sort_by(|a, b| a.id.cmp(&b.id));

    Json(public::ChatSessionsResponse { sessions })
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(chat_handler))
        .route("/{id}", get(chat_session).delete(chat_session_end))
        .route("/sessions", get(chat_list))
}
