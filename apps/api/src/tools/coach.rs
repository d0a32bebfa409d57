use crate::errors::AppError;
use crate::llm_client::{ChatRole, ChatTurn, LlmClient};
use crate::tools::prompts::COACH_SYSTEM;

/// Turns kept from the end of a long conversation.
const MAX_TURNS: usize = 20;

/// Normalizes a client-supplied history for the messages API: blank turns are
/// dropped, the window is capped, and it must start and end with a user turn.
pub fn prepare_turns(turns: &[ChatTurn]) -> Result<Vec<ChatTurn>, AppError> {
    let mut kept: Vec<ChatTurn> = turns
        .iter()
        .filter(|t| !t.content.trim().is_empty())
        .cloned()
        .collect();

    if kept.last().map(|t| t.role) != Some(ChatRole::User) {
        return Err(AppError::Validation(
            "the last message must be from the user".to_string(),
        ));
    }

    if kept.len() > MAX_TURNS {
        kept.drain(..kept.len() - MAX_TURNS);
    }
    while kept.first().is_some_and(|t| t.role != ChatRole::User) {
        kept.remove(0);
    }
    Ok(kept)
}

pub async fn reply(llm: &LlmClient, turns: &[ChatTurn]) -> Result<String, AppError> {
    let turns = prepare_turns(turns)?;
    Ok(llm.call_text(&turns, COACH_SYSTEM).await?)
}
