//! The ordered list of every field the builder conversation can ask about.
//!
//! Order is the order questions are asked in. Paths are unique.

use serde::{Deserialize, Serialize};

/// How the client should collect an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Textarea,
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldQuestion {
    pub path: &'static str,
    pub prompt: &'static str,
    pub input_kind: InputKind,
    pub required: bool,
    pub category: &'static str,
}

pub const PROFILE_PHOTO_PATH: &str = "personalInfo.profilePhoto";

const fn question(
    path: &'static str,
    prompt: &'static str,
    input_kind: InputKind,
    required: bool,
    category: &'static str,
) -> FieldQuestion {
    FieldQuestion {
        path,
        prompt,
        input_kind,
        required,
        category,
    }
}

pub static CATALOG: &[FieldQuestion] = &[
    question(
        PROFILE_PHOTO_PATH,
        "Let's start with a **profile photo**. Upload an image to show on your portfolio.",
        InputKind::File,
        false,
        "Personal",
    ),
    question(
        "personalInfo.name",
        "What is your **full name**?",
        InputKind::Text,
        true,
        "Personal",
    ),
    question(
        "personalInfo.title",
        "What is your **professional title**? (e.g. Backend Engineer)",
        InputKind::Text,
        true,
        "Personal",
    ),
    question(
        "personalInfo.email",
        "What **email address** should visitors use to reach you?",
        InputKind::Text,
        true,
        "Contact",
    ),
    question(
        "personalInfo.phone",
        "What is your **phone number**?",
        InputKind::Text,
        false,
        "Contact",
    ),
    question(
        "personalInfo.location",
        "Where are you **located**? (City, Country)",
        InputKind::Text,
        false,
        "Contact",
    ),
    question(
        "personalInfo.about",
        "Tell visitors a little **about yourself**.",
        InputKind::Textarea,
        false,
        "Personal",
    ),
    question(
        "personalInfo.linkedin",
        "What is your **LinkedIn** profile URL?",
        InputKind::Text,
        false,
        "Contact",
    ),
    question(
        "summary",
        "Write a short **professional summary**.",
        InputKind::Textarea,
        false,
        "Summary",
    ),
    question(
        "education",
        "List your **education**, one per line:\nDegree - Institution - Year",
        InputKind::Textarea,
        false,
        "Education",
    ),
    question(
        "experience",
        "List your **work experience**, one role per line:\nTitle at Company | Duration | Description",
        InputKind::Textarea,
        false,
        "Experience",
    ),
    question(
        "projects",
        "List your **projects**, one per line:\nTitle | Description | Outcome",
        InputKind::Textarea,
        false,
        "Projects",
    ),
    question(
        "skills",
        "List your **skills**, one per line.",
        InputKind::Textarea,
        false,
        "Skills",
    ),
    question(
        "certifications",
        "List your **certifications**, one per line:\nName - Issuer - Year",
        InputKind::Textarea,
        false,
        "Certifications",
    ),
    question(
        "leadership",
        "Describe any **leadership** experience.",
        InputKind::Textarea,
        false,
        "Leadership",
    ),
    question(
        "testimonials",
        "Share any **testimonials**, one per line:\nQuote - Name - Role",
        InputKind::Textarea,
        false,
        "Testimonials",
    ),
];

pub fn find(path: &str) -> Option<&'static FieldQuestion> {
    CATALOG.iter().find(|q| q.path == path)
}

/// Resolves a section name such as "Skills" or "Profile Photo" to its catalog entry
/// by comparing against the last path segment, ignoring case and spaces.
pub fn find_section(section: &str) -> Option<&'static FieldQuestion> {
    let wanted: String = section
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    CATALOG.iter().find(|q| {
        q.path
            .rsplit('.')
            .next()
            .is_some_and(|leaf| leaf.to_lowercase() == wanted)
    })
}

/// Human label for a catalog path: "personalInfo.profilePhoto" → "Profile Photo".
pub fn section_label(path: &str) -> String {
    let leaf = path.rsplit('.').next().unwrap_or(path);
    let mut label = String::with_capacity(leaf.len() + 4);
    for (i, c) in leaf.chars().enumerate() {
        if i == 0 {
            label.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            label.push(' ');
            label.push(c);
        } else {
            label.push(c);
        }
    }
    label
}
