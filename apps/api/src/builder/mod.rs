//! Conversational portfolio builder: catalog-driven questions, resume parsing and
//! the merge into a finalized `ResumeRecord`.

pub mod catalog;
pub mod conversation;
pub mod finalize;
pub mod handlers;
pub mod parser;
pub mod path;
pub mod placeholder;
pub mod prompts;
pub mod sequencer;
pub mod session;
