//! The append-only transcript of one builder session and the
//! entry points that drive the sequencer and finalizer from user actions.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::builder::catalog::{self, InputKind};
use crate::builder::finalize::finalize;
use crate::builder::parser::{
    has_usable_fields, DocumentKind, ParseFailure, ResumeParser, UploadedFile,
};
use crate::builder::path;
use crate::builder::sequencer::{SequenceError, SequencerState, Step, SKIP_OPTION};
use crate::models::record::ResumeRecord;

pub const UPLOAD_OPTION: &str = "Upload Resume";
pub const MANUAL_OPTION: &str = "Enter Data Manually";
pub const LOOKS_GOOD_OPTION: &str = "Looks good";
const EDIT_PREFIX: &str = "Edit ";

/// Sections offered as edit shortcuts on the review message.
const REVIEW_SECTIONS: &[&str] = &[
    "personalInfo.name",
    "personalInfo.title",
    "summary",
    "experience",
    "education",
    "skills",
    "projects",
    "certifications",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Bot,
    User,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_kind: Option<InputKind>,
}

impl ConversationMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            path: None,
            options: None,
            input_kind: None,
        }
    }
}

/// Where a completed sequencer pass leads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    /// Manual entry: completion finalizes immediately.
    #[default]
    Manual,
    /// Upload or edit: completion returns to the review presentation.
    Review,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    AwaitingAnswer,
    Reviewing,
    Complete,
}

#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("{0}")]
    Validation(String),

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("there is nothing to review yet")]
    NotReviewing,

    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    messages: Vec<ConversationMessage>,
    pub sequencer: SequencerState,
    /// Output of the resume-parsing service, pre-review.
    pub parsed: Value,
    /// Answers given through the conversation.
    pub collected: Value,
    pub flow: Flow,
    pub reviewing: bool,
    pub record: Option<ResumeRecord>,
}

impl Conversation {
    /// Opens a session with the greeting offering upload or manual entry.
    pub fn new() -> Self {
        let mut conversation = Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            messages: Vec::new(),
            sequencer: SequencerState::default(),
            parsed: Value::Object(Map::new()),
            collected: Value::Object(Map::new()),
            flow: Flow::Manual,
            reviewing: false,
            record: None,
        };
        conversation.push_bot(
            "Hi! Let's build your portfolio. You can upload an existing resume or enter your details step by step.",
            None,
            vec![UPLOAD_OPTION.to_string(), MANUAL_OPTION.to_string()],
            None,
        );
        conversation
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn status(&self) -> SessionStatus {
        if self.sequencer.awaiting().is_some() {
            SessionStatus::AwaitingAnswer
        } else if self.reviewing {
            SessionStatus::Reviewing
        } else if self.record.is_some() {
            SessionStatus::Complete
        } else {
            SessionStatus::Idle
        }
    }

    /// Handles a click on one of the offered options.
    pub fn select_option(&mut self, option: &str) -> Result<(), ConversationError> {
        let option = option.trim();
        match option {
            UPLOAD_OPTION => {
                self.push_user(option, None);
                self.push_bot(
                    "Great! Upload your resume as a PDF or Word document.",
                    None,
                    Vec::new(),
                    Some(InputKind::File),
                );
            }
            MANUAL_OPTION => {
                self.push_user(option, None);
                self.start_pass(Flow::Manual, Vec::new());
            }
            SKIP_OPTION => {
                let path = self
                    .sequencer
                    .awaiting()
                    .ok_or(SequenceError::NotAwaiting)?
                    .to_string();
                self.sequencer.skipped(&path)?;
                self.push_user(option, Some(path));
                self.ask_next();
            }
            LOOKS_GOOD_OPTION => {
                if !self.reviewing {
                    return Err(ConversationError::NotReviewing);
                }
                self.push_user(option, None);
                self.complete();
            }
            _ => {
                let section = option
                    .strip_prefix(EDIT_PREFIX)
                    .ok_or_else(|| ConversationError::UnknownOption(option.to_string()))?;
                let question = catalog::find_section(section).ok_or_else(|| {
                    ConversationError::Validation(format!("there is no '{section}' section"))
                })?;
                if !self.reviewing && self.record.is_none() {
                    return Err(ConversationError::NotReviewing);
                }
                self.push_user(option, None);
                self.start_pass(Flow::Review, vec![question.path.to_string()]);
            }
        }
        Ok(())
    }

    /// Records a text answer for the awaited question.
    pub fn answer(&mut self, path: &str, value: &str) -> Result<(), ConversationError> {
        if value.trim().is_empty() {
            return Err(ConversationError::Validation(format!(
                "an answer is required; choose '{SKIP_OPTION}' to leave it out"
            )));
        }
        if catalog::find(path).is_some_and(|q| q.input_kind == InputKind::File) {
            return Err(ConversationError::Validation(format!(
                "'{path}' expects a file upload"
            )));
        }
        self.sequencer.answered(path)?;
        self.write(path, Value::String(value.trim().to_string()));
        self.push_user(value.trim(), Some(path.to_string()));
        self.ask_next();
        Ok(())
    }

    /// Records an image answer for the awaited file question as a data URI.
    pub fn answer_file(&mut self, path: &str, file: &UploadedFile) -> Result<(), ConversationError> {
        let media_type = file
            .media_type
            .as_deref()
            .map(str::trim)
            .filter(|m| m.starts_with("image/"))
            .ok_or_else(|| {
                ConversationError::Validation("the photo must be an image file".to_string())
            })?;
        if file.bytes.is_empty() {
            return Err(ConversationError::Validation("the photo is empty".to_string()));
        }
        if catalog::find(path).map(|q| q.input_kind) != Some(InputKind::File) {
            return Err(ConversationError::Validation(format!(
                "'{path}' does not take a file"
            )));
        }
        self.sequencer.answered(path)?;
        self.write(path, Value::String(data_uri(media_type, &file.bytes)));
        self.push_user(format!("Uploaded {}", file.file_name), Some(path.to_string()));
        self.ask_next();
        Ok(())
    }

    /// Handles a resume upload. A wrong file type is rejected without side effects;
    /// any parsing failure falls back to the manual flow.
    pub async fn upload_resume(
        &mut self,
        file: UploadedFile,
        parser: &dyn ResumeParser,
        timeout: Duration,
    ) -> Result<(), ConversationError> {
        let kind = DocumentKind::detect(&file.file_name, file.media_type.as_deref()).ok_or_else(
            || {
                ConversationError::Validation(format!(
                    "'{}' is not a supported resume; upload a PDF or DOCX document",
                    file.file_name
                ))
            },
        )?;

        self.push_user(format!("Uploaded {}", file.file_name), None);

        let outcome = match tokio::time::timeout(timeout, parser.parse(&file, kind)).await {
            Ok(result) => result,
            Err(_) => Err(ParseFailure::Timeout(timeout)),
        };
        let outcome = outcome.and_then(|parsed| {
            if has_usable_fields(&parsed) {
                Ok(parsed)
            } else {
                Err(ParseFailure::NoUsableFields)
            }
        });

        let upload_fields = json!({
            "fileName": file.file_name,
            "fileData": data_uri(kind.media_type(), &file.bytes),
            "uploadDate": Utc::now().to_rfc3339(),
        });

        match outcome {
            Ok(parsed) => {
                info!("Session {}: parsed resume '{}'", self.id, file.file_name);
                self.parsed = merge_top_level(parsed, upload_fields);
                self.push_bot(upload_summary(&self.parsed), None, Vec::new(), None);
                self.start_pass(Flow::Review, Vec::new());
            }
            Err(e) => {
                warn!(
                    "Session {}: resume parsing failed, falling back to manual entry: {e}",
                    self.id
                );
                self.parsed = upload_fields;
                self.push_bot(
                    "Sorry, I couldn't read that resume. Let's build your portfolio step by step instead.",
                    None,
                    Vec::new(),
                    None,
                );
                self.start_pass(Flow::Manual, Vec::new());
            }
        }
        Ok(())
    }

    fn start_pass(&mut self, flow: Flow, edit_paths: Vec<String>) {
        self.flow = flow;
        self.reviewing = false;
        self.sequencer.begin_pass(edit_paths);
        self.ask_next();
    }

    fn ask_next(&mut self) {
        match self.sequencer.next(&self.parsed, &self.collected) {
            Step::Ask(ask) => {
                self.push_bot(ask.prompt, Some(ask.path.to_string()), ask.options, Some(ask.input_kind));
            }
            Step::Complete => match self.flow {
                Flow::Manual => self.complete(),
                Flow::Review => self.present_review(),
            },
        }
    }

    fn present_review(&mut self) {
        self.reviewing = true;
        let preview = finalize(&ResumeRecord::default(), &self.parsed, &self.collected);
        let mut options = vec![LOOKS_GOOD_OPTION.to_string()];
        options.extend(
            REVIEW_SECTIONS
                .iter()
                .map(|p| format!("{EDIT_PREFIX}{}", catalog::section_label(p))),
        );
        self.push_bot(
            format!(
                "Here's what I have so far:\n\n{}\nDoes this look right?",
                describe(&preview)
            ),
            None,
            options,
            None,
        );
    }

    fn complete(&mut self) {
        let defaults = ResumeRecord {
            upload_date: Utc::now(),
            ..Default::default()
        };
        let record = finalize(&defaults, &self.parsed, &self.collected);
        info!(
            "Session {}: finalized record for '{}'",
            self.id, record.personal_info.name
        );
        self.record = Some(record);
        self.reviewing = false;
        self.messages
            .push(ConversationMessage::new(Role::System, "Your portfolio is ready!"));
    }

    fn write(&mut self, path: &str, value: Value) {
        let collected = std::mem::take(&mut self.collected);
        self.collected = path::set(collected, path, value);
    }

    fn push_user(&mut self, content: impl Into<String>, path: Option<String>) {
        let mut message = ConversationMessage::new(Role::User, content);
        message.path = path;
        self.messages.push(message);
    }

    fn push_bot(
        &mut self,
        content: impl Into<String>,
        path: Option<String>,
        options: Vec<String>,
        input_kind: Option<InputKind>,
    ) {
        let mut message = ConversationMessage::new(Role::Bot, content);
        message.path = path;
        message.options = (!options.is_empty()).then_some(options);
        message.input_kind = input_kind;
        self.messages.push(message);
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

fn data_uri(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{media_type};base64,{}", STANDARD.encode(bytes))
}

fn merge_top_level(base: Value, overlay: Value) -> Value {
    let mut base = match base {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    if let Value::Object(overlay) = overlay {
        base.extend(overlay);
    }
    Value::Object(base)
}

fn upload_summary(parsed: &Value) -> String {
    let record = ResumeRecord::decode(parsed, &ResumeRecord::default());
    format!("I've read your resume. Here's what I found:\n\n{}", describe(&record))
}

fn describe(record: &ResumeRecord) -> String {
    let info = &record.personal_info;
    let mut out = String::new();
    if !info.name.is_empty() {
        out.push_str(&format!("**{}**", info.name));
        if !info.title.is_empty() {
            out.push_str(&format!(", {}", info.title));
        }
        out.push('\n');
    }
    for (label, count) in [
        ("experience", record.experience.len()),
        ("education", record.education.len()),
        ("skills", record.skills.len()),
        ("projects", record.projects.len()),
        ("certifications", record.certifications.len()),
    ] {
        out.push_str(&format!("- {label}: {count}\n"));
    }
    out
}
