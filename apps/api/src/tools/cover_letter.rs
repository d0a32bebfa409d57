use crate::errors::AppError;
use crate::llm_client::prompts::FIDELITY_INSTRUCTION;
use crate::llm_client::{ChatTurn, LlmClient};
use crate::tools::prompts::{COVER_LETTER_PROMPT, COVER_LETTER_SYSTEM};

const DEFAULT_TONE: &str = "professional";

pub struct CoverLetterInput<'a> {
    pub resume: &'a str,
    pub job_description: &'a str,
    pub company: Option<&'a str>,
    pub tone: Option<&'a str>,
}

pub fn build_prompt(input: &CoverLetterInput<'_>) -> String {
    let company = input
        .company
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("the hiring company");
    let tone = input
        .tone
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TONE);

    COVER_LETTER_PROMPT
        .replace("{fidelity_instruction}", FIDELITY_INSTRUCTION)
        .replace("{company}", company)
        .replace("{tone}", tone)
        .replace("{job_description}", input.job_description.trim())
        .replace("{resume}", input.resume)
}

pub async fn write_cover_letter(llm: &LlmClient, input: &CoverLetterInput<'_>) -> Result<String, AppError> {
    let prompt = build_prompt(input);
    Ok(llm.call_text(&[ChatTurn::user(prompt)], COVER_LETTER_SYSTEM).await?)
}
