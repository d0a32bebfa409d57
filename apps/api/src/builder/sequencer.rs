//! Picks the next unanswered catalog question.
//!
//! The active question list is recomputed on every step from the catalog, the
//! ignored/edit sets and the current data, then indexed by `current_index`.
//! Paths already handled in the current pass stay in the list so that answering
//! one question never shifts the index past the next one.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::builder::catalog::{FieldQuestion, InputKind, CATALOG};
use crate::builder::path;
use crate::builder::placeholder::is_missing_or_empty;

pub const SKIP_OPTION: &str = "Skip this field";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    AwaitingAnswer {
        path: String,
    },
    Complete,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequenceError {
    #[error("no question is awaiting an answer")]
    NotAwaiting,

    #[error("expected an answer for '{expected}', got '{got}'")]
    WrongPath { expected: String, got: String },

    #[error("'{0}' is required and cannot be skipped")]
    Required(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SequencerState {
    pub current_index: usize,
    pub ignored_paths: BTreeSet<String>,
    /// Empty means "ask about anything missing".
    pub edit_paths: Vec<String>,
    /// Paths answered or skipped during the current pass, in order.
    pub handled_paths: Vec<String>,
    pub phase: Phase,
}

/// A question ready to be shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ask {
    pub path: &'static str,
    pub prompt: String,
    pub input_kind: InputKind,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Ask(Ask),
    Complete,
}

impl SequencerState {
    /// Starts a fresh pass. Answers collected so far are untouched; paths named in
    /// `edit_paths` are un-ignored since the user asked for them explicitly.
    pub fn begin_pass(&mut self, edit_paths: Vec<String>) {
        for p in &edit_paths {
            self.ignored_paths.remove(p);
        }
        self.edit_paths = edit_paths;
        self.current_index = 0;
        self.handled_paths.clear();
        self.phase = Phase::Idle;
    }

    pub fn awaiting(&self) -> Option<&str> {
        match &self.phase {
            Phase::AwaitingAnswer { path } => Some(path),
            _ => None,
        }
    }

    pub fn active_questions(&self, parsed: &Value, collected: &Value) -> Vec<&'static FieldQuestion> {
        CATALOG
            .iter()
            .filter(|q| {
                if self.handled_paths.iter().any(|p| p == q.path) {
                    return true;
                }
                if self.ignored_paths.contains(q.path) {
                    return false;
                }
                if self.edit_paths.is_empty() {
                    is_missing_or_empty(current_value(q.path, parsed, collected), q.path)
                } else {
                    self.edit_paths.iter().any(|p| p == q.path)
                }
            })
            .collect()
    }

    /// Computes the next step and moves to `AwaitingAnswer` or `Complete`.
    pub fn next(&mut self, parsed: &Value, collected: &Value) -> Step {
        let active = self.active_questions(parsed, collected);
        let Some(question) = active.get(self.current_index).copied() else {
            self.phase = Phase::Complete;
            return Step::Complete;
        };

        let mut prompt = question.prompt.to_string();
        let current = current_value(question.path, parsed, collected);
        // Uploaded files are stored as data URIs; only text values are echoed.
        let echoed = current.filter(|_| question.input_kind != InputKind::File);
        if let Some(Value::String(existing)) = echoed {
            if !is_missing_or_empty(current, question.path) {
                prompt.push_str(&format!(
                    "\n\nCurrent value: **{}**\nSend it again to keep it, or type a new value to override it.",
                    existing.trim()
                ));
            }
        }

        let options = if question.required {
            Vec::new()
        } else {
            vec![SKIP_OPTION.to_string()]
        };

        self.phase = Phase::AwaitingAnswer {
            path: question.path.to_string(),
        };
        Step::Ask(Ask {
            path: question.path,
            prompt,
            input_kind: question.input_kind,
            options,
        })
    }

    /// Records an answer for the awaited path and advances by one.
    pub fn answered(&mut self, path: &str) -> Result<(), SequenceError> {
        self.check_awaiting(path)?;
        self.advance(path);
        Ok(())
    }

    /// Skips the awaited path, ignoring it from now on, and advances by one.
    pub fn skipped(&mut self, path: &str) -> Result<(), SequenceError> {
        self.check_awaiting(path)?;
        if CATALOG.iter().any(|q| q.path == path && q.required) {
            return Err(SequenceError::Required(path.to_string()));
        }
        self.ignored_paths.insert(path.to_string());
        self.advance(path);
        Ok(())
    }

    fn check_awaiting(&self, path: &str) -> Result<(), SequenceError> {
        match self.awaiting() {
            None => Err(SequenceError::NotAwaiting),
            Some(expected) if expected != path => Err(SequenceError::WrongPath {
                expected: expected.to_string(),
                got: path.to_string(),
            }),
            Some(_) => Ok(()),
        }
    }

    fn advance(&mut self, path: &str) {
        self.handled_paths.push(path.to_string());
        self.current_index += 1;
        self.phase = Phase::Idle;
    }
}

/// Value at `path`, preferring collected data over parsed data.
pub fn current_value<'a>(path: &str, parsed: &'a Value, collected: &'a Value) -> Option<&'a Value> {
    path::get(collected, path)
        .filter(|v| !v.is_null())
        .or_else(|| path::get(parsed, path))
}
