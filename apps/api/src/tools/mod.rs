//! Career tools built on the LLM client: cover letters, resume optimization,
//! interview practice and free-form coaching.

pub mod coach;
pub mod cover_letter;
pub mod handlers;
pub mod interview;
pub mod optimizer;
pub mod prompts;

use serde_json::Value;

use crate::models::record::ResumeRecord;

/// Plain-text resume for prompts: the record when given, else the raw text.
pub fn resume_context(record: Option<&ResumeRecord>, resume_text: Option<&str>) -> Option<String> {
    let non_blank = |text: &str| Some(text.trim().to_string()).filter(|t| !t.is_empty());
    record
        .and_then(|r| non_blank(r.to_plain_text().as_str()))
        .or_else(|| resume_text.and_then(non_blank))
}

/// Reads a score as a whole number in `0..=max`, accepting numeric strings.
pub(crate) fn score(value: Option<&Value>, max: u8) -> Option<u8> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite()
        .then(|| n.round().clamp(0.0, f64::from(max)) as u8)
}

pub(crate) fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resume_context_prefers_record() {
        let record = ResumeRecord {
            summary: "Builds data platforms.".to_string(),
            ..Default::default()
        };
        let text = resume_context(Some(&record), Some("raw text")).unwrap();
        assert!(text.contains("Builds data platforms."));
        assert!(!text.contains("raw text"));
    }

    #[test]
    fn test_resume_context_falls_back_to_text() {
        assert_eq!(resume_context(None, Some("  raw  ")).as_deref(), Some("raw"));
        assert_eq!(resume_context(None, Some("   ")), None);
        assert_eq!(resume_context(None, None), None);
        assert_eq!(
            resume_context(Some(&ResumeRecord::default()), Some("raw")).as_deref(),
            Some("raw")
        );
    }

    #[test]
    fn test_score_parsing() {
        assert_eq!(score(Some(&json!(72)), 100), Some(72));
        assert_eq!(score(Some(&json!("85%")), 100), Some(85));
        assert_eq!(score(Some(&json!(7.6)), 10), Some(8));
        assert_eq!(score(Some(&json!(140)), 100), Some(100));
        assert_eq!(score(Some(&json!("high")), 100), None);
        assert_eq!(score(None, 100), None);
    }
}
