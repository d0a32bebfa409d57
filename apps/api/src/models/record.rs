//! The portfolio record handed from the builder flow to the rendering side.
//!
//! Field names and nesting are part of the hand-off contract: the renderer reads
//! the camelCase JSON directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Level given to skills that arrive without one.
pub const DEFAULT_SKILL_LEVEL: u8 = 80;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    pub file_name: String,
    /// Original upload as a data URI, passed through untouched.
    pub file_data: Option<String>,
    pub upload_date: DateTime<Utc>,
    pub personal_info: PersonalInfo,
    pub summary: String,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub skills: Vec<Skill>,
    pub projects: Vec<Project>,
    pub certifications: Vec<Certification>,
    pub leadership: String,
    pub testimonials: Vec<Testimonial>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub about: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub duration: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillCategory {
    Frontend,
    Backend,
    Database,
    Tools,
    #[default]
    Other,
}

impl SkillCategory {
    /// Case-insensitive lookup; anything unrecognized is `Other`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "frontend" => SkillCategory::Frontend,
            "backend" => SkillCategory::Backend,
            "database" => SkillCategory::Database,
            "tools" => SkillCategory::Tools,
            _ => SkillCategory::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub level: u8,
    pub category: SkillCategory,
}

impl Skill {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: DEFAULT_SKILL_LEVEL,
            category: SkillCategory::Other,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<ProjectLinks>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    pub name: String,
    pub issuer: String,
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub quote: String,
    pub name: String,
    pub role: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient decoding
// ────────────────────────────────────────────────────────────────────────────

impl ResumeRecord {
    /// Decodes loosely typed JSON into a record, field by field.
    ///
    /// Never fails: any field that is absent or unreadable takes the value from
    /// `defaults`, and unreadable list entries are dropped.
    pub fn decode(value: &Value, defaults: &ResumeRecord) -> ResumeRecord {
        let field = |key: &str| value.get(key);

        ResumeRecord {
            file_name: text(field("fileName")).unwrap_or_else(|| defaults.file_name.clone()),
            file_data: match field("fileData") {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(Value::Null) => None,
                _ => defaults.file_data.clone(),
            },
            upload_date: field("uploadDate")
                .and_then(Value::as_str)
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|d| d.with_timezone(&Utc))
                .unwrap_or(defaults.upload_date),
            personal_info: match field("personalInfo") {
                Some(v @ Value::Object(_)) => PersonalInfo::decode(v, &defaults.personal_info),
                _ => defaults.personal_info.clone(),
            },
            summary: text(field("summary")).unwrap_or_else(|| defaults.summary.clone()),
            education: list(field("education"), Education::decode)
                .unwrap_or_else(|| defaults.education.clone()),
            experience: list(field("experience"), Experience::decode)
                .unwrap_or_else(|| defaults.experience.clone()),
            skills: list(field("skills"), Skill::decode).unwrap_or_else(|| defaults.skills.clone()),
            projects: list(field("projects"), Project::decode)
                .unwrap_or_else(|| defaults.projects.clone()),
            certifications: list(field("certifications"), Certification::decode)
                .unwrap_or_else(|| defaults.certifications.clone()),
            leadership: text(field("leadership")).unwrap_or_else(|| defaults.leadership.clone()),
            testimonials: list(field("testimonials"), Testimonial::decode)
                .unwrap_or_else(|| defaults.testimonials.clone()),
        }
    }

    /// Plain-text rendering used as resume context in prompts.
    pub fn to_plain_text(&self) -> String {
        let info = &self.personal_info;
        let mut out = String::new();
        push_line(&mut out, "Name", &info.name);
        push_line(&mut out, "Title", &info.title);
        push_line(&mut out, "Location", &info.location);
        push_line(&mut out, "About", &info.about);
        push_line(&mut out, "Summary", &self.summary);

        if !self.experience.is_empty() {
            out.push_str("\nEXPERIENCE\n");
            for e in &self.experience {
                out.push_str(&format!(
                    "- {} at {} ({}): {}\n",
                    e.title, e.company, e.duration, e.description
                ));
            }
        }
        if !self.education.is_empty() {
            out.push_str("\nEDUCATION\n");
            for e in &self.education {
                out.push_str(&format!("- {}, {} ({})\n", e.degree, e.institution, e.year));
            }
        }
        if !self.skills.is_empty() {
            let names: Vec<&str> = self.skills.iter().map(|s| s.name.as_str()).collect();
            out.push_str(&format!("\nSKILLS\n{}\n", names.join(", ")));
        }
        if !self.projects.is_empty() {
            out.push_str("\nPROJECTS\n");
            for p in &self.projects {
                out.push_str(&format!("- {}: {}\n", p.title, p.description));
            }
        }
        if !self.certifications.is_empty() {
            out.push_str("\nCERTIFICATIONS\n");
            for c in &self.certifications {
                out.push_str(&format!("- {} ({}, {})\n", c.name, c.issuer, c.year));
            }
        }
        push_line(&mut out, "\nLeadership", &self.leadership);
        out
    }
}

fn push_line(out: &mut String, label: &str, value: &str) {
    if !value.trim().is_empty() {
        out.push_str(&format!("{label}: {}\n", value.trim()));
    }
}

impl PersonalInfo {
    fn decode(value: &Value, defaults: &PersonalInfo) -> PersonalInfo {
        let get = |key: &str, fallback: &String| {
            text(value.get(key)).unwrap_or_else(|| fallback.clone())
        };
        let optional = |key: &str, fallback: &Option<String>| match value.get(key) {
            Some(Value::Null) => None,
            Some(v) => text(Some(v)).filter(|s| !s.is_empty()),
            None => fallback.clone(),
        };
        PersonalInfo {
            name: get("name", &defaults.name),
            title: get("title", &defaults.title),
            email: get("email", &defaults.email),
            phone: get("phone", &defaults.phone),
            location: get("location", &defaults.location),
            about: get("about", &defaults.about),
            profile_photo: optional("profilePhoto", &defaults.profile_photo),
            linkedin: optional("linkedin", &defaults.linkedin),
        }
    }
}

impl Education {
    fn decode(value: &Value) -> Option<Self> {
        value.as_object()?;
        Some(Education {
            degree: text(value.get("degree")).unwrap_or_default(),
            institution: text(value.get("institution")).unwrap_or_default(),
            year: text(value.get("year")).unwrap_or_default(),
        })
    }
}

impl Experience {
    fn decode(value: &Value) -> Option<Self> {
        value.as_object()?;
        Some(Experience {
            title: text(value.get("title")).unwrap_or_default(),
            company: text(value.get("company")).unwrap_or_default(),
            duration: text(value.get("duration")).unwrap_or_default(),
            description: text(value.get("description")).unwrap_or_default(),
        })
    }
}

impl Skill {
    fn decode(value: &Value) -> Option<Self> {
        let skill = match value {
            Value::String(name) => Skill::named(name.trim()),
            Value::Object(_) => Skill {
                name: text(value.get("name")).unwrap_or_default().trim().to_string(),
                level: value.get("level").and_then(level).unwrap_or(DEFAULT_SKILL_LEVEL),
                category: value
                    .get("category")
                    .and_then(Value::as_str)
                    .map(SkillCategory::parse)
                    .unwrap_or_default(),
            },
            _ => return None,
        };
        (!skill.name.is_empty()).then_some(skill)
    }
}

/// Reads a skill level from a number or numeric string, clamped to 0–100.
fn level(value: &Value) -> Option<u8> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok()?,
        _ => return None,
    };
    if raw.is_nan() {
        return None;
    }
    Some(raw.round().clamp(0.0, 100.0) as u8)
}

impl Project {
    fn decode(value: &Value) -> Option<Self> {
        value.as_object()?;
        let mut tags: Vec<String> = Vec::new();
        let raw_tags: Vec<String> = match value.get("tags") {
            Some(Value::Array(items)) => items.iter().filter_map(|t| text(Some(t))).collect(),
            Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
            _ => Vec::new(),
        };
        for tag in raw_tags {
            let tag = tag.trim().to_string();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        let links = value.get("links").and_then(|l| {
            let demo = text(l.get("demo")).filter(|s| !s.is_empty());
            let code = text(l.get("code")).filter(|s| !s.is_empty());
            (demo.is_some() || code.is_some()).then_some(ProjectLinks { demo, code })
        });
        Some(Project {
            title: text(value.get("title")).unwrap_or_default(),
            description: text(value.get("description")).unwrap_or_default(),
            tags,
            links,
        })
    }
}

impl Certification {
    fn decode(value: &Value) -> Option<Self> {
        value.as_object()?;
        Some(Certification {
            name: text(value.get("name")).unwrap_or_default(),
            issuer: text(value.get("issuer")).unwrap_or_default(),
            year: text(value.get("year")).unwrap_or_default(),
        })
    }
}

impl Testimonial {
    fn decode(value: &Value) -> Option<Self> {
        value.as_object()?;
        Some(Testimonial {
            quote: text(value.get("quote")).unwrap_or_default(),
            name: text(value.get("name")).unwrap_or_default(),
            role: text(value.get("role")).unwrap_or_default(),
        })
    }
}

/// Reads a scalar as text. Numbers and booleans are stringified; anything else is `None`.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn list<T>(value: Option<&Value>, decode: fn(&Value) -> Option<T>) -> Option<Vec<T>> {
    value?.as_array().map(|items| items.iter().filter_map(decode).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_serializes_with_camel_case_keys() {
        let record = ResumeRecord::default();
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("personalInfo").is_some());
        assert!(json.get("fileName").is_some());
        assert!(json.get("uploadDate").is_some());
        assert_eq!(json["skills"], json!([]));
        assert_eq!(json["testimonials"], json!([]));
        assert_eq!(json["personalInfo"]["name"], "");
        assert!(json["personalInfo"].get("profilePhoto").is_none());
    }

    #[test]
    fn test_decode_empty_object_yields_defaults() {
        let defaults = ResumeRecord {
            summary: "seed".to_string(),
            ..Default::default()
        };
        let record = ResumeRecord::decode(&json!({}), &defaults);
        assert_eq!(record, defaults);
    }

    #[test]
    fn test_decode_non_object_yields_defaults() {
        let defaults = ResumeRecord::default();
        assert_eq!(ResumeRecord::decode(&json!("garbage"), &defaults), defaults);
        assert_eq!(ResumeRecord::decode(&Value::Null, &defaults), defaults);
    }

    #[test]
    fn test_decode_stringifies_numeric_years() {
        let value = json!({
            "education": [{"degree": "BSc", "institution": "MIT", "year": 2019}],
            "certifications": [{"name": "CKA", "issuer": "CNCF", "year": 2023}]
        });
        let record = ResumeRecord::decode(&value, &ResumeRecord::default());
        assert_eq!(record.education[0].year, "2019");
        assert_eq!(record.certifications[0].year, "2023");
    }

    #[test]
    fn test_decode_skill_shapes() {
        let value = json!({
            "skills": [
                "Go",
                {"name": "Rust", "level": 140, "category": "backend"},
                {"name": "SQL", "level": "65", "category": "Spreadsheets"},
                {"name": "   "},
                42
            ]
        });
        let record = ResumeRecord::decode(&value, &ResumeRecord::default());
        assert_eq!(record.skills.len(), 3);
        assert_eq!(record.skills[0], Skill::named("Go"));
        assert_eq!(record.skills[1].level, 100);
        assert_eq!(record.skills[1].category, SkillCategory::Backend);
        assert_eq!(record.skills[2].level, 65);
        assert_eq!(record.skills[2].category, SkillCategory::Other);
    }

    #[test]
    fn test_decode_negative_level_clamps_to_zero() {
        let value = json!({"skills": [{"name": "COBOL", "level": -5}]});
        let record = ResumeRecord::decode(&value, &ResumeRecord::default());
        assert_eq!(record.skills[0].level, 0);
    }

    #[test]
    fn test_decode_project_tags_and_links() {
        let value = json!({
            "projects": [{
                "title": "Folio",
                "description": "Portfolio builder",
                "tags": ["rust", "axum", "rust", " "],
                "links": {"code": "https://example.com/folio", "demo": ""}
            }, {
                "title": "CLI",
                "tags": "rust, cli"
            }]
        });
        let record = ResumeRecord::decode(&value, &ResumeRecord::default());
        assert_eq!(record.projects[0].tags, vec!["rust", "axum"]);
        let links = record.projects[0].links.as_ref().unwrap();
        assert_eq!(links.code.as_deref(), Some("https://example.com/folio"));
        assert!(links.demo.is_none());
        assert_eq!(record.projects[1].tags, vec!["rust", "cli"]);
        assert!(record.projects[1].links.is_none());
        assert_eq!(record.projects[1].description, "");
    }

    #[test]
    fn test_decode_wrong_list_type_falls_back() {
        let defaults = ResumeRecord {
            experience: vec![Experience {
                title: "Engineer".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let record = ResumeRecord::decode(&json!({"experience": "not a list"}), &defaults);
        assert_eq!(record.experience, defaults.experience);
    }

    #[test]
    fn test_decode_partial_personal_info_keeps_default_siblings() {
        let defaults = ResumeRecord {
            personal_info: PersonalInfo {
                email: "ava@example.org".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let record =
            ResumeRecord::decode(&json!({"personalInfo": {"name": "Ava Lee"}}), &defaults);
        assert_eq!(record.personal_info.name, "Ava Lee");
        assert_eq!(record.personal_info.email, "ava@example.org");
    }

    #[test]
    fn test_decode_upload_date() {
        let value = json!({"uploadDate": "2024-03-01T10:00:00Z"});
        let record = ResumeRecord::decode(&value, &ResumeRecord::default());
        assert_eq!(record.upload_date.to_rfc3339(), "2024-03-01T10:00:00+00:00");

        let bad = ResumeRecord::decode(&json!({"uploadDate": "yesterday"}), &ResumeRecord::default());
        assert_eq!(bad.upload_date, DateTime::<Utc>::default());
    }

    #[test]
    fn test_skill_category_parse() {
        assert_eq!(SkillCategory::parse("Frontend"), SkillCategory::Frontend);
        assert_eq!(SkillCategory::parse(" DATABASE "), SkillCategory::Database);
        assert_eq!(SkillCategory::parse("cooking"), SkillCategory::Other);
    }

    #[test]
    fn test_plain_text_skips_empty_fields() {
        let record = ResumeRecord {
            personal_info: PersonalInfo {
                name: "Ava Lee".to_string(),
                ..Default::default()
            },
            skills: vec![Skill::named("Python"), Skill::named("SQL")],
            ..Default::default()
        };
        let text = record.to_plain_text();
        assert!(text.contains("Name: Ava Lee"));
        assert!(text.contains("Python, SQL"));
        assert!(!text.contains("Title:"));
        assert!(!text.contains("EXPERIENCE"));
    }
}
