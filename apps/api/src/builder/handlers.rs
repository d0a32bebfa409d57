use std::future::Future;
use std::time::Duration;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::builder::catalog::PROFILE_PHOTO_PATH;
use crate::builder::conversation::{Conversation, ConversationMessage, SessionStatus};
use crate::builder::parser::UploadedFile;
use crate::builder::session::{load_conversation, load_portfolio, save_conversation, SessionLock};
use crate::errors::AppError;
use crate::models::record::ResumeRecord;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub messages: Vec<ConversationMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<ResumeRecord>,
}

impl SessionResponse {
    /// Response carrying the messages appended since `from`.
    fn since(conversation: &Conversation, from: usize) -> Self {
        Self {
            session_id: conversation.id,
            status: conversation.status(),
            messages: conversation.messages().get(from..).unwrap_or_default().to_vec(),
            record: conversation.record.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub path: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct OptionRequest {
    pub option: String,
}

/// POST /api/v1/builder/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let conversation = Conversation::new();
    save_conversation(state.store.as_ref(), &conversation).await?;
    info!("Session {} started", conversation.id);
    Ok((StatusCode::CREATED, Json(SessionResponse::since(&conversation, 0))))
}

/// GET /api/v1/builder/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let conversation = load_conversation(state.store.as_ref(), id).await?;
    Ok(Json(SessionResponse::since(&conversation, 0)))
}

/// POST /api/v1/builder/sessions/:id/answer
pub async fn handle_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    locked(&state, id, async {
        let mut conversation = load_conversation(state.store.as_ref(), id).await?;
        let from = conversation.messages().len();
        conversation.answer(req.path.trim(), &req.value)?;
        save_conversation(state.store.as_ref(), &conversation).await?;
        Ok::<_, AppError>(Json(SessionResponse::since(&conversation, from)))
    })
    .await
}

/// POST /api/v1/builder/sessions/:id/option
pub async fn handle_option(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<OptionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    locked(&state, id, async {
        let mut conversation = load_conversation(state.store.as_ref(), id).await?;
        let from = conversation.messages().len();
        conversation.select_option(&req.option)?;
        save_conversation(state.store.as_ref(), &conversation).await?;
        Ok::<_, AppError>(Json(SessionResponse::since(&conversation, from)))
    })
    .await
}

/// POST /api/v1/builder/sessions/:id/upload
/// Multipart form with a `file` field holding a PDF or DOCX resume.
pub async fn handle_upload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<SessionResponse>, AppError> {
    let form = read_form(multipart).await?;
    locked(&state, id, async {
        let mut conversation = load_conversation(state.store.as_ref(), id).await?;
        let from = conversation.messages().len();
        conversation
            .upload_resume(form.file, state.parser.as_ref(), state.config.parse_timeout)
            .await?;
        save_conversation(state.store.as_ref(), &conversation).await?;
        Ok::<_, AppError>(Json(SessionResponse::since(&conversation, from)))
    })
    .await
}

/// POST /api/v1/builder/sessions/:id/photo
/// Multipart form with a `file` image and an optional `path` (defaults to the profile photo).
pub async fn handle_photo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<SessionResponse>, AppError> {
    let form = read_form(multipart).await?;
    let path = form.path.as_deref().unwrap_or(PROFILE_PHOTO_PATH);
    locked(&state, id, async {
        let mut conversation = load_conversation(state.store.as_ref(), id).await?;
        let from = conversation.messages().len();
        conversation.answer_file(path, &form.file)?;
        save_conversation(state.store.as_ref(), &conversation).await?;
        Ok::<_, AppError>(Json(SessionResponse::since(&conversation, from)))
    })
    .await
}

/// GET /api/v1/portfolio/:id
pub async fn handle_get_portfolio(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeRecord>, AppError> {
    Ok(Json(load_portfolio(state.store.as_ref(), id).await?))
}

/// Runs one load-mutate-save action while holding the session lock.
async fn locked<T>(
    state: &AppState,
    id: Uuid,
    action: impl Future<Output = Result<T, AppError>>,
) -> Result<T, AppError> {
    // Uploads may wait on the parser for the full parse timeout.
    let ttl = state.config.parse_timeout + Duration::from_secs(30);
    let lock = SessionLock::acquire(state.store.as_ref(), id, ttl).await?;
    let outcome = action.await;
    lock.release().await;
    outcome
}

struct UploadForm {
    file: UploadedFile,
    path: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut file: Option<UploadedFile> = None;
    let mut path = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name().unwrap_or("") {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let media_type = field.content_type().map(str::to_string);
                let bytes: Bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;
                file = Some(UploadedFile {
                    file_name,
                    media_type,
                    bytes,
                });
            }
            "path" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read path: {e}")))?;
                path = Some(text.trim().to_string()).filter(|p| !p.is_empty());
            }
            _ => {}
        }
    }

    let file = file
        .ok_or_else(|| AppError::Validation("Missing 'file' field in multipart form".to_string()))?;
    Ok(UploadForm { file, path })
}
