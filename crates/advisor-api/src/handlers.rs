//! Route handler functions for all API endpoints.

use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use advisor_chat::{AssistantReply, ImageInput, IntentCategory, ReplyOutcome, TopicTag};

use crate::error::ApiError;
use crate::state::AppState;
use crate::ui::CHAT_HTML;

/// Longest accepted client-supplied session id.
const MAX_SESSION_ID_CHARS: usize = 128;

/// Quiz length when the client does not ask for one.
const DEFAULT_QUIZ_QUESTIONS: u8 = 5;

// =============================================================================
// Request types
// =============================================================================

/// Request body for POST /chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Omit to start a new session.
    pub session_id: Option<String>,
}

/// Request body for POST /chat/reset.
#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub session_id: String,
}

/// Request body for POST /resume/review.
#[derive(Debug, Deserialize)]
pub struct ResumeReviewRequest {
    pub resume_text: String,
    pub target_role: Option<String>,
}

/// Request body for POST /quiz.
#[derive(Debug, Deserialize)]
pub struct QuizRequest {
    pub topic: String,
    pub question_count: Option<u32>,
    pub difficulty: Option<String>,
}

/// Request body for POST /image/analyze.
#[derive(Debug, Deserialize)]
pub struct ImageAnalyzeRequest {
    /// MIME type, e.g. `image/png`.
    pub media_type: String,
    /// Base64-encoded image bytes.
    pub data_base64: String,
    pub question: Option<String>,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
    pub intent: IntentCategory,
    pub topic_lock: Option<TopicTag>,
    pub outcome: ReplyOutcome,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetResponse {
    pub status: String,
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssistantResponse {
    pub response: String,
    pub outcome: ReplyOutcome,
}

impl From<AssistantReply> for AssistantResponse {
    fn from(reply: AssistantReply) -> Self {
        Self {
            response: reply.response,
            outcome: reply.outcome,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub active_sessions: usize,
    pub generator: String,
    pub model: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET / - serve the chat page.
pub async fn ui() -> impl IntoResponse {
    Html(CHAT_HTML)
}

/// GET /health - health check.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        active_sessions: state.advisor.sessions().len(),
        generator: state.advisor.generator_name().to_string(),
        model: state.config.llm.model.clone(),
    }))
}

/// POST /chat - run one advisor turn.
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let session_id = resolve_session_id(body.session_id)?;
    let reply = state.advisor.reply(&body.message, &session_id).await?;

    tracing::info!(
        session_id = %session_id,
        intent = %reply.intent,
        topic_lock = ?reply.topic_lock,
        outcome = ?reply.outcome,
        "Chat turn handled"
    );

    Ok(Json(ChatResponse {
        response: reply.response,
        session_id,
        intent: reply.intent,
        topic_lock: reply.topic_lock,
        outcome: reply.outcome,
    }))
}

/// POST /chat/reset - clear a session's history.
pub async fn chat_reset(
    State(state): State<AppState>,
    Json(body): Json<ResetRequest>,
) -> Result<Json<ResetResponse>, ApiError> {
    let session_id = body.session_id.trim().to_string();
    if session_id.is_empty() {
        return Err(ApiError::BadRequest("'session_id' must not be empty".to_string()));
    }
    state.advisor.reset(&session_id);
    Ok(Json(ResetResponse {
        status: "reset".to_string(),
        session_id,
    }))
}

/// POST /resume/review - critique a resume.
pub async fn resume_review(
    State(state): State<AppState>,
    Json(body): Json<ResumeReviewRequest>,
) -> Result<Json<AssistantResponse>, ApiError> {
    let reply = state
        .advisor
        .review_resume(&body.resume_text, body.target_role.as_deref())
        .await?;
    Ok(Json(reply.into()))
}

/// POST /quiz - generate a multiple-choice quiz.
pub async fn quiz(
    State(state): State<AppState>,
    Json(body): Json<QuizRequest>,
) -> Result<Json<AssistantResponse>, ApiError> {
    let count = match body.question_count {
        Some(n) => u8::try_from(n).unwrap_or(u8::MAX),
        None => DEFAULT_QUIZ_QUESTIONS,
    };
    let reply = state
        .advisor
        .generate_quiz(&body.topic, count, body.difficulty.as_deref())
        .await?;
    Ok(Json(reply.into()))
}

/// POST /image/analyze - answer a question about an image.
pub async fn image_analyze(
    State(state): State<AppState>,
    Json(body): Json<ImageAnalyzeRequest>,
) -> Result<Json<AssistantResponse>, ApiError> {
    let image = ImageInput {
        media_type: body.media_type,
        data_base64: body.data_base64,
    };
    let reply = state
        .advisor
        .analyze_image(&image, body.question.as_deref())
        .await?;
    Ok(Json(reply.into()))
}

/// Use the client's session id, or issue a new one when absent or blank.
fn resolve_session_id(requested: Option<String>) -> Result<String, ApiError> {
    match requested.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
        Some(id) if id.chars().count() > MAX_SESSION_ID_CHARS => Err(ApiError::BadRequest(format!(
            "'session_id' exceeds {} characters",
            MAX_SESSION_ID_CHARS
        ))),
        Some(id) => Ok(id),
        None => Ok(Uuid::new_v4().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_session_id_is_issued() {
        let id = resolve_session_id(None).unwrap();
        assert!(Uuid::parse_str(&id).is_ok());
        let id = resolve_session_id(Some("   ".to_string())).unwrap();
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_client_session_id_is_kept() {
        assert_eq!(
            resolve_session_id(Some(" student-42 ".to_string())).unwrap(),
            "student-42"
        );
    }

    #[test]
    fn test_oversized_session_id_rejected() {
        let long = "x".repeat(MAX_SESSION_ID_CHARS + 1);
        assert!(matches!(
            resolve_session_id(Some(long)),
            Err(ApiError::BadRequest(_))
        ));
    }
}
