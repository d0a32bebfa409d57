//! Axum route handlers for the career tools.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::llm_client::ChatTurn;
use crate::models::record::ResumeRecord;
use crate::state::AppState;
use crate::tools::cover_letter::{write_cover_letter, CoverLetterInput};
use crate::tools::interview::{evaluate_answer, generate_questions, AnswerEvaluation, InterviewQuestion};
use crate::tools::optimizer::{optimize_resume, OptimizationReport};
use crate::tools::{coach, resume_context};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CoverLetterRequest {
    /// Any record-shaped JSON; decoded leniently.
    pub record: Option<Value>,
    pub resume_text: Option<String>,
    pub job_description: String,
    pub company: Option<String>,
    pub tone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CoverLetterResponse {
    pub cover_letter: String,
}

#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    /// Any record-shaped JSON; decoded leniently.
    pub record: Option<Value>,
    pub resume_text: Option<String>,
    pub job_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InterviewQuestionsRequest {
    pub role: String,
    pub level: Option<String>,
    pub count: Option<u8>,
}

#[derive(Debug, Serialize)]
pub struct InterviewQuestionsResponse {
    pub questions: Vec<InterviewQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct CoachRequest {
    pub messages: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct CoachResponse {
    pub reply: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/tools/cover-letter
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    Json(req): Json<CoverLetterRequest>,
) -> Result<Json<CoverLetterResponse>, AppError> {
    let resume = require_resume(req.record.as_ref(), req.resume_text.as_deref())?;
    require_text(&req.job_description, "job_description")?;

    let cover_letter = write_cover_letter(
        &state.llm,
        &CoverLetterInput {
            resume: &resume,
            job_description: &req.job_description,
            company: req.company.as_deref(),
            tone: req.tone.as_deref(),
        },
    )
    .await?;
    Ok(Json(CoverLetterResponse { cover_letter }))
}

/// POST /api/v1/tools/optimize
pub async fn handle_optimize(
    State(state): State<AppState>,
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<OptimizationReport>, AppError> {
    let resume = require_resume(req.record.as_ref(), req.resume_text.as_deref())?;
    let report = optimize_resume(&state.llm, &resume, req.job_description.as_deref()).await?;
    Ok(Json(report))
}

/// POST /api/v1/tools/interview/questions
pub async fn handle_interview_questions(
    State(state): State<AppState>,
    Json(req): Json<InterviewQuestionsRequest>,
) -> Result<Json<InterviewQuestionsResponse>, AppError> {
    require_text(&req.role, "role")?;
    let questions = generate_questions(&state.llm, &req.role, req.level.as_deref(), req.count).await?;
    Ok(Json(InterviewQuestionsResponse { questions }))
}

/// POST /api/v1/tools/interview/evaluate
pub async fn handle_interview_evaluate(
    State(state): State<AppState>,
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<AnswerEvaluation>, AppError> {
    require_text(&req.question, "question")?;
    require_text(&req.answer, "answer")?;
    let evaluation = evaluate_answer(&state.llm, &req.question, &req.answer).await?;
    Ok(Json(evaluation))
}

/// POST /api/v1/tools/coach
pub async fn handle_coach(
    State(state): State<AppState>,
    Json(req): Json<CoachRequest>,
) -> Result<Json<CoachResponse>, AppError> {
    let reply = coach::reply(&state.llm, &req.messages).await?;
    Ok(Json(CoachResponse { reply }))
}

fn require_resume(record: Option<&Value>, resume_text: Option<&str>) -> Result<String, AppError> {
    let record = record
        .filter(|v| v.is_object())
        .map(|v| ResumeRecord::decode(v, &ResumeRecord::default()));
    resume_context(record.as_ref(), resume_text)
        .ok_or_else(|| AppError::Validation("either record or resume_text is required".to_string()))
}

fn require_text(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}
