//! Mock interview practice: question generation and answer evaluation.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{extract_json, ChatTurn, LlmClient};
use crate::tools::prompts::{
    INTERVIEW_EVALUATE_PROMPT, INTERVIEW_EVALUATE_SYSTEM, INTERVIEW_QUESTIONS_PROMPT,
    INTERVIEW_QUESTIONS_SYSTEM,
};
use crate::tools::{score, string_field};

pub const DEFAULT_QUESTION_COUNT: u8 = 5;
pub const MAX_QUESTION_COUNT: u8 = 15;
const DEFAULT_LEVEL: &str = "mid-level";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterviewQuestion {
    pub question: String,
    pub category: String,
    pub tip: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerEvaluation {
    /// Out of 10.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    pub feedback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improved_answer: Option<String>,
}

pub fn build_questions_prompt(role: &str, level: Option<&str>, count: u8) -> String {
    let level = level.map(str::trim).filter(|l| !l.is_empty()).unwrap_or(DEFAULT_LEVEL);
    INTERVIEW_QUESTIONS_PROMPT
        .replace("{count}", &count.to_string())
        .replace("{level}", level)
        .replace("{role}", role.trim())
}

/// Clamps a requested count to `1..=MAX_QUESTION_COUNT`.
pub fn question_count(requested: Option<u8>) -> u8 {
    requested
        .unwrap_or(DEFAULT_QUESTION_COUNT)
        .clamp(1, MAX_QUESTION_COUNT)
}

/// Reads generated questions. Unusable output becomes one "General" question
/// carrying the raw text.
pub fn interpret_questions(raw: &str) -> Vec<InterviewQuestion> {
    let parsed = extract_json(raw);
    let items = match &parsed {
        Some(Value::Object(obj)) => obj.get("questions").and_then(Value::as_array),
        Some(Value::Array(items)) => Some(items),
        _ => None,
    };

    let questions: Vec<InterviewQuestion> = items
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let question = match item {
                        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
                        other => string_field(other, "question"),
                    }?;
                    Some(InterviewQuestion {
                        question,
                        category: string_field(item, "category").unwrap_or_else(|| "General".to_string()),
                        tip: string_field(item, "tip").unwrap_or_default(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    if questions.is_empty() {
        warn!("Interview question reply was not structured, returning raw text");
        return vec![InterviewQuestion {
            question: raw.trim().to_string(),
            category: "General".to_string(),
            tip: String::new(),
        }];
    }
    questions
}

pub fn build_evaluation_prompt(question: &str, answer: &str) -> String {
    INTERVIEW_EVALUATE_PROMPT
        .replace("{question}", question.trim())
        .replace("{answer}", answer.trim())
}

/// Reads an evaluation. Unusable output becomes feedback holding the raw text.
pub fn interpret_evaluation(raw: &str) -> AnswerEvaluation {
    match extract_json(raw) {
        Some(value @ Value::Object(_)) => match string_field(&value, "feedback") {
            Some(feedback) => AnswerEvaluation {
                score: score(value.get("score"), 10),
                feedback,
                improved_answer: string_field(&value, "improved_answer")
                    .or_else(|| string_field(&value, "improvedAnswer")),
            },
            None => raw_feedback(raw),
        },
        _ => raw_feedback(raw),
    }
}

fn raw_feedback(raw: &str) -> AnswerEvaluation {
    warn!("Interview evaluation reply was not structured, returning raw text");
    AnswerEvaluation {
        score: None,
        feedback: raw.trim().to_string(),
        improved_answer: None,
    }
}

pub async fn generate_questions(
    llm: &LlmClient,
    role: &str,
    level: Option<&str>,
    count: Option<u8>,
) -> Result<Vec<InterviewQuestion>, AppError> {
    let prompt = build_questions_prompt(role, level, question_count(count));
    let system = format!("{INTERVIEW_QUESTIONS_SYSTEM} {JSON_ONLY_SYSTEM}");
    let raw = llm.call_text(&[ChatTurn::user(prompt)], &system).await?;
    Ok(interpret_questions(&raw))
}

pub async fn evaluate_answer(llm: &LlmClient, question: &str, answer: &str) -> Result<AnswerEvaluation, AppError> {
    let prompt = build_evaluation_prompt(question, answer);
    let system = format!("{INTERVIEW_EVALUATE_SYSTEM} {JSON_ONLY_SYSTEM}");
    let raw = llm.call_text(&[ChatTurn::user(prompt)], &system).await?;
    Ok(interpret_evaluation(&raw))
}
