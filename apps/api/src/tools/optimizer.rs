//! Resume optimization: a score and a list of section-level suggestions.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::errors::AppError;
use crate::llm_client::prompts::{FIDELITY_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::{extract_json, ChatTurn, LlmClient};
use crate::tools::prompts::{OPTIMIZE_PROMPT, OPTIMIZE_SYSTEM};
use crate::tools::{score, string_field};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Improvement {
    pub section: String,
    pub suggestion: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptimizationReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    pub improvements: Vec<Improvement>,
}

pub fn build_prompt(resume: &str, job_description: Option<&str>) -> String {
    OPTIMIZE_PROMPT
        .replace("{fidelity_instruction}", FIDELITY_INSTRUCTION)
        .replace("{job_description}", job_description.unwrap_or("").trim())
        .replace("{resume}", resume)
}

/// Reads the model reply. Output without usable suggestions becomes one
/// "General Improvement" entry carrying the raw text.
pub fn interpret(raw: &str) -> OptimizationReport {
    let parsed = extract_json(raw);
    let (score_value, items) = match &parsed {
        Some(Value::Object(obj)) => (obj.get("score"), obj.get("improvements")),
        Some(list @ Value::Array(_)) => (None, Some(list)),
        _ => (None, None),
    };

    let improvements: Vec<Improvement> = items
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let suggestion = string_field(item, "suggestion")?;
                    Some(Improvement {
                        section: string_field(item, "section").unwrap_or_else(|| "General".to_string()),
                        suggestion,
                        reason: string_field(item, "reason").unwrap_or_default(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    if improvements.is_empty() {
        warn!("Optimizer reply had no structured suggestions, returning raw text");
        return OptimizationReport {
            score: score(score_value, 100),
            improvements: vec![Improvement {
                section: "General Improvement".to_string(),
                suggestion: raw.trim().to_string(),
                reason: String::new(),
            }],
        };
    }

    OptimizationReport {
        score: score(score_value, 100),
        improvements,
    }
}

pub async fn optimize_resume(
    llm: &LlmClient,
    resume: &str,
    job_description: Option<&str>,
) -> Result<OptimizationReport, AppError> {
    let prompt = build_prompt(resume, job_description);
    let system = format!("{OPTIMIZE_SYSTEM} {JSON_ONLY_SYSTEM}");
    let raw = llm.call_text(&[ChatTurn::user(prompt)], &system).await?;
    Ok(interpret(&raw))
}
