//! Turns an uploaded resume into record-shaped JSON.
//!
//! `AppState` holds an `Arc<dyn ResumeParser>`; tests swap in stubs.

use std::io::{Cursor, Read};

use async_trait::async_trait;
use bytes::Bytes;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::builder::prompts::{RESUME_PARSE_PROMPT, RESUME_PARSE_SYSTEM};
use crate::llm_client::prompts::{FIDELITY_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};
use crate::models::record::ResumeRecord;

/// Longest extracted text sent to the model.
const MAX_RESUME_CHARS: usize = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

impl DocumentKind {
    pub fn media_type(self) -> &'static str {
        match self {
            DocumentKind::Pdf => PDF_MIME,
            DocumentKind::Docx => DOCX_MIME,
        }
    }

    /// Classifies an upload by its declared media type, falling back to the file
    /// extension when the type is absent or generic. Legacy binary `.doc` files
    /// are not accepted.
    pub fn detect(file_name: &str, media_type: Option<&str>) -> Option<Self> {
        let media_type = media_type
            .map(|m| m.split(';').next().unwrap_or(m).trim().to_ascii_lowercase())
            .filter(|m| !m.is_empty() && m != "application/octet-stream");

        match media_type.as_deref() {
            Some(PDF_MIME) => Some(DocumentKind::Pdf),
            Some(DOCX_MIME) => Some(DocumentKind::Docx),
            Some(_) => None,
            None => {
                let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
                match ext.as_str() {
                    "pdf" => Some(DocumentKind::Pdf),
                    "docx" => Some(DocumentKind::Docx),
                    _ => None,
                }
            }
        }
    }
}

/// A file received from the client.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub media_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("could not extract text: {0}")]
    Extraction(String),

    #[error("document contains no text")]
    NoText,

    #[error("parsing service failed: {0}")]
    Llm(#[from] LlmError),

    #[error("parsing service returned no usable fields")]
    NoUsableFields,

    #[error("parsing service did not answer within {0:?}")]
    Timeout(std::time::Duration),
}

#[async_trait]
pub trait ResumeParser: Send + Sync {
    async fn parse(&self, file: &UploadedFile, kind: DocumentKind) -> Result<Value, ParseFailure>;
}

/// True when parsed JSON carries at least one field worth keeping.
pub fn has_usable_fields(parsed: &Value) -> bool {
    if !parsed.is_object() {
        return false;
    }
    let record = ResumeRecord::decode(parsed, &ResumeRecord::default());
    let info = &record.personal_info;
    let text_fields: [&str; 9] = [
        &info.name,
        &info.title,
        &info.email,
        &info.phone,
        &info.location,
        &info.about,
        info.linkedin.as_deref().unwrap_or_default(),
        &record.summary,
        &record.leadership,
    ];
    text_fields.iter().any(|s| !s.trim().is_empty())
        || !record.experience.is_empty()
        || !record.education.is_empty()
        || !record.skills.is_empty()
        || !record.projects.is_empty()
        || !record.certifications.is_empty()
        || !record.testimonials.is_empty()
}

fn pdf_text(bytes: &[u8]) -> Result<String, ParseFailure> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ParseFailure::Extraction(format!("{e:?}")))
}

fn extraction(e: impl std::fmt::Display) -> ParseFailure {
    ParseFailure::Extraction(e.to_string())
}

/// Collects the `<w:t>` runs of `word/document.xml`, one line per paragraph.
fn docx_text(bytes: &[u8]) -> Result<String, ParseFailure> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(extraction)?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(extraction)?
        .read_to_string(&mut xml)
        .map_err(extraction)?;

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();
    let mut in_run = false;
    loop {
        match reader.read_event().map_err(extraction)? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_run = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_run = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_run => text.push_str(&t.unescape().map_err(extraction)?),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(text)
}

/// Production parser: local text extraction, then structuring by the LLM.
pub struct LlmResumeParser {
    llm: LlmClient,
}

impl LlmResumeParser {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResumeParser for LlmResumeParser {
    async fn parse(&self, file: &UploadedFile, kind: DocumentKind) -> Result<Value, ParseFailure> {
        let bytes = file.bytes.clone();
        let text = tokio::task::spawn_blocking(move || match kind {
            DocumentKind::Pdf => pdf_text(&bytes),
            DocumentKind::Docx => docx_text(&bytes),
        })
        .await
        .map_err(|e| ParseFailure::Extraction(e.to_string()))??;

        let text = text.trim();
        if text.is_empty() {
            return Err(ParseFailure::NoText);
        }
        let text: String = text.chars().take(MAX_RESUME_CHARS).collect();
        info!(
            "Extracted {} chars from '{}', structuring with LLM",
            text.len(),
            file.file_name
        );

        let prompt = RESUME_PARSE_PROMPT
            .replace("{fidelity_instruction}", FIDELITY_INSTRUCTION)
            .replace("{resume_text}", &text);
        let system = format!("{RESUME_PARSE_SYSTEM} {JSON_ONLY_SYSTEM}");
        let parsed: Value = self.llm.call_json(&prompt, &system).await?;
        Ok(parsed)
    }
}
