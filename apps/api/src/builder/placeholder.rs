//! Decides whether the value at a catalog path is real user data or still empty /
//! a seeded placeholder.
//!
//! Known limitation: the placeholder literals double as sentinels, so a user whose
//! real data matches one of them (say a degree titled "... Degree") is treated as
//! not having answered.

use serde_json::Value;

/// Literal defaults that mean "not filled in" wherever a string appears.
pub const PLACEHOLDER_STRINGS: &[&str] = &[
    "Your Name",
    "Professional Title",
    "email@example.com",
    "(123) 456-7890",
    "City, Country",
    "Professional with a passion",
];

/// Minimum number of skills for the skills section to count as answered.
const MIN_SKILLS: usize = 3;

/// Pure and total: every value shape gets an answer.
pub fn is_missing_or_empty(value: Option<&Value>, path: &str) -> bool {
    let value = match value {
        None | Some(Value::Null) => return true,
        Some(v) => v,
    };

    match value {
        Value::String(s) => is_blank_or_placeholder(s),
        Value::Array(items) if items.is_empty() => true,
        Value::Array(items) => match path {
            "education" => items.iter().all(|e| {
                placeholder_field(e, "degree", "Degree")
                    || placeholder_field(e, "institution", "University Name")
            }),
            "experience" => items.iter().all(|e| {
                placeholder_field(e, "title", "Professional")
                    || placeholder_field(e, "company", "Company")
            }),
            "projects" => items.iter().all(|e| {
                placeholder_field(e, "title", "Project") || blank_field(e, "description")
            }),
            "certifications" => items
                .iter()
                .all(|e| placeholder_field(e, "name", "Certification")),
            "skills" => items.len() < MIN_SKILLS || items.iter().all(blank_skill),
            _ => false,
        },
        _ => false,
    }
}

fn is_blank_or_placeholder(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || PLACEHOLDER_STRINGS.iter().any(|p| s.contains(p))
}

/// A field counts as placeholder when it is absent, blank, or contains `marker`.
fn placeholder_field(entry: &Value, key: &str, marker: &str) -> bool {
    match entry.get(key).and_then(Value::as_str) {
        Some(s) => s.trim().is_empty() || s.contains(marker),
        None => true,
    }
}

fn blank_field(entry: &Value, key: &str) -> bool {
    entry
        .get(key)
        .and_then(Value::as_str)
        .map_or(true, |s| s.trim().is_empty())
}

fn blank_skill(skill: &Value) -> bool {
    match skill {
        Value::String(name) => name.trim().is_empty(),
        other => blank_field(other, "name"),
    }
}
