//! The one place defaults, parsed data and collected
//! answers become a complete `ResumeRecord`.

use serde_json::{Map, Value};

use crate::builder::path;
use crate::models::record::{
    Certification, Education, Experience, Project, ResumeRecord, Skill, Testimonial,
};

/// Merges the three sources with precedence defaults < parsed < collected.
///
/// `personalInfo` merges key by key so a partial collected object cannot wipe out
/// parsed siblings. Multi-entry fields answered through a textarea are parsed from
/// their raw newline-delimited text. Pure and infallible: unreadable input
/// degrades to `defaults`.
pub fn finalize(defaults: &ResumeRecord, parsed: &Value, collected: &Value) -> ResumeRecord {
    let mut merged = Map::new();
    for source in [parsed, collected] {
        if let Value::Object(fields) = source {
            for (key, value) in fields {
                if !value.is_null() {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }
    }

    let mut personal = Map::new();
    for source in [parsed, collected] {
        if let Some(Value::Object(fields)) = path::get(source, "personalInfo") {
            for (key, value) in fields {
                if !value.is_null() {
                    personal.insert(key.clone(), value.clone());
                }
            }
        }
    }
    merged.insert("personalInfo".to_string(), Value::Object(personal));

    let mut record = ResumeRecord::decode(&Value::Object(merged), defaults);

    if let Some(text) = raw_text(collected, "education") {
        record.education = parse_education(text);
    }
    if let Some(text) = raw_text(collected, "experience") {
        record.experience = parse_experience(text);
    }
    if let Some(text) = raw_text(collected, "skills") {
        record.skills = parse_skills(text);
    }
    if let Some(text) = raw_text(collected, "projects") {
        record.projects = parse_projects(text);
    }
    if let Some(text) = raw_text(collected, "certifications") {
        record.certifications = parse_certifications(text);
    }
    if let Some(text) = raw_text(collected, "testimonials") {
        record.testimonials = parse_testimonials(text);
    }

    record
}

fn raw_text<'a>(collected: &'a Value, key: &str) -> Option<&'a str> {
    path::get(collected, key).and_then(Value::as_str)
}

// ────────────────────────────────────────────────────────────────────────────
// Line parsers for textarea answers
// ────────────────────────────────────────────────────────────────────────────

/// `Name - Issuer - Year`
pub fn parse_certifications(text: &str) -> Vec<Certification> {
    lines(text)
        .map(|line| {
            let [name, issuer, year] = split_parts(line, " - ");
            Certification { name, issuer, year }
        })
        .collect()
}

/// `Degree - Institution - Year`
pub fn parse_education(text: &str) -> Vec<Education> {
    lines(text)
        .map(|line| {
            let [degree, institution, year] = split_parts(line, " - ");
            Education {
                degree,
                institution,
                year,
            }
        })
        .collect()
}

/// `Title | Description | Outcome`; the outcome is appended to the description.
pub fn parse_projects(text: &str) -> Vec<Project> {
    lines(text)
        .map(|line| {
            let [title, description, outcome] = split_parts(line, " | ");
            let description = match (description.is_empty(), outcome.is_empty()) {
                (_, true) => description,
                (true, false) => outcome,
                (false, false) => format!("{description} Outcome: {outcome}"),
            };
            Project {
                title,
                description,
                tags: Vec::new(),
                links: None,
            }
        })
        .collect()
}

/// `Title at Company | Duration | Description`
pub fn parse_experience(text: &str) -> Vec<Experience> {
    lines(text)
        .map(|line| {
            let [title_line, duration, description] = split_parts(line, " | ");
            let (title, company) = match title_line.split_once(" at ") {
                Some((title, company)) => (title.trim().to_string(), company.trim().to_string()),
                None => (title_line, String::new()),
            };
            Experience {
                title,
                company,
                duration,
                description,
            }
        })
        .collect()
}

/// One skill per line at the default level, category `Other`.
pub fn parse_skills(text: &str) -> Vec<Skill> {
    lines(text).map(Skill::named).collect()
}

/// `Quote - Name - Role`
pub fn parse_testimonials(text: &str) -> Vec<Testimonial> {
    lines(text)
        .map(|line| {
            let [quote, name, role] = split_parts(line, " - ");
            Testimonial {
                quote: quote.trim_matches('"').trim().to_string(),
                name,
                role,
            }
        })
        .collect()
}

fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty())
}

/// Splits into at most `N` trimmed parts; the last part keeps any further separators.
fn split_parts<const N: usize>(line: &str, sep: &str) -> [String; N] {
    let mut parts: [String; N] = std::array::from_fn(|_| String::new());
    for (slot, part) in parts.iter_mut().zip(line.splitn(N, sep)) {
        *slot = part.trim().to_string();
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{PersonalInfo, SkillCategory};
    use serde_json::json;

    #[test]
    fn test_parse_certifications() {
        let certs = parse_certifications("AWS Certified - Amazon - 2023\nPSM - Scrum.org - 2022");
        assert_eq!(
            certs,
            vec![
                Certification {
                    name: "AWS Certified".to_string(),
                    issuer: "Amazon".to_string(),
                    year: "2023".to_string(),
                },
                Certification {
                    name: "PSM".to_string(),
                    issuer: "Scrum.org".to_string(),
                    year: "2022".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_certification_without_separators() {
        let certs = parse_certifications("Kubernetes Administrator");
        assert_eq!(certs[0].name, "Kubernetes Administrator");
        assert_eq!(certs[0].issuer, "");
        assert_eq!(certs[0].year, "");
    }

    #[test]
    fn test_parse_skills_drops_blank_lines() {
        let skills = parse_skills("Go\nRust\n");
        assert_eq!(
            skills,
            vec![
                Skill {
                    name: "Go".to_string(),
                    level: 80,
                    category: SkillCategory::Other
                },
                Skill {
                    name: "Rust".to_string(),
                    level: 80,
                    category: SkillCategory::Other
                },
            ]
        );
    }

    #[test]
    fn test_blank_text_parses_to_empty_list() {
        assert!(parse_skills("  \n\n ").is_empty());
        assert!(parse_experience("").is_empty());
    }

    #[test]
    fn test_parse_experience_splits_company() {
        let roles = parse_experience(
            "Data Engineer at Acme | 2021 - 2024 | Built pipelines\nFreelancer | 2019 | Various clients",
        );
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0].title, "Data Engineer");
        assert_eq!(roles[0].company, "Acme");
        assert_eq!(roles[0].duration, "2021 - 2024");
        assert_eq!(roles[0].description, "Built pipelines");
        assert_eq!(roles[1].title, "Freelancer");
        assert_eq!(roles[1].company, "");
    }

    #[test]
    fn test_parse_projects_appends_outcome() {
        let projects = parse_projects("Folio | Portfolio builder | 2k users\nScratch");
        assert_eq!(projects[0].title, "Folio");
        assert_eq!(projects[0].description, "Portfolio builder Outcome: 2k users");
        assert!(projects[0].tags.is_empty());
        assert_eq!(projects[1].title, "Scratch");
        assert_eq!(projects[1].description, "");
    }

    #[test]
    fn test_parse_testimonials_strips_quotes() {
        let t = parse_testimonials("\"Ships fast\" - Sam Roe - CTO");
        assert_eq!(t[0].quote, "Ships fast");
        assert_eq!(t[0].name, "Sam Roe");
        assert_eq!(t[0].role, "CTO");
    }

    #[test]
    fn test_parse_education() {
        let e = parse_education("BSc Physics - MIT - 2019");
        assert_eq!(e[0].degree, "BSc Physics");
        assert_eq!(e[0].institution, "MIT");
        assert_eq!(e[0].year, "2019");
    }

    #[test]
    fn test_finalize_precedence() {
        let defaults = ResumeRecord {
            summary: "default summary".to_string(),
            leadership: "default leadership".to_string(),
            ..Default::default()
        };
        let parsed = json!({"summary": "parsed summary", "leadership": "parsed leadership"});
        let collected = json!({"summary": "collected summary"});
        let record = finalize(&defaults, &parsed, &collected);
        assert_eq!(record.summary, "collected summary");
        assert_eq!(record.leadership, "parsed leadership");
    }

    #[test]
    fn test_finalize_merges_personal_info_per_key() {
        let defaults = ResumeRecord {
            personal_info: PersonalInfo {
                location: "Remote".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let parsed = json!({"personalInfo": {"name": "Ava Lee", "email": "ava@example.org"}});
        let collected = json!({"personalInfo": {"title": "Data Engineer"}});
        let info = finalize(&defaults, &parsed, &collected).personal_info;
        assert_eq!(info.name, "Ava Lee");
        assert_eq!(info.email, "ava@example.org");
        assert_eq!(info.title, "Data Engineer");
        assert_eq!(info.location, "Remote");
        assert_eq!(info.phone, "");
    }

    #[test]
    fn test_finalize_parses_textarea_answers() {
        let parsed = json!({"skills": [{"name": "Python"}]});
        let collected = json!({
            "skills": "Python\nSQL\nDocker",
            "certifications": "PSM - Scrum.org - 2022"
        });
        let record = finalize(&ResumeRecord::default(), &parsed, &collected);
        let names: Vec<&str> = record.skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Python", "SQL", "Docker"]);
        assert!(record.skills.iter().all(|s| s.level == 80));
        assert_eq!(record.certifications.len(), 1);
    }

    #[test]
    fn test_finalize_keeps_structured_collected_lists() {
        let collected = json!({"skills": [{"name": "Go", "level": 90, "category": "Backend"}]});
        let record = finalize(&ResumeRecord::default(), &json!({}), &collected);
        assert_eq!(record.skills[0].level, 90);
        assert_eq!(record.skills[0].category, SkillCategory::Backend);
    }

    #[test]
    fn test_finalize_garbage_inputs_degrade_to_defaults() {
        let defaults = ResumeRecord {
            summary: "fallback".to_string(),
            ..Default::default()
        };
        let parsed = json!({"summary": {"nested": true}, "experience": 7, "personalInfo": "x"});
        let record = finalize(&defaults, &parsed, &json!(["not", "an", "object"]));
        assert_eq!(record.summary, "fallback");
        assert!(record.experience.is_empty());
        assert_eq!(record.personal_info, PersonalInfo::default());
    }

    #[test]
    fn test_finalize_null_collected_does_not_erase_parsed() {
        let parsed = json!({"summary": "parsed"});
        let collected = json!({"summary": null});
        assert_eq!(
            finalize(&ResumeRecord::default(), &parsed, &collected).summary,
            "parsed"
        );
    }

    #[test]
    fn test_finalize_is_deterministic_and_leaves_inputs_alone() {
        let defaults = ResumeRecord::default();
        let parsed = json!({"personalInfo": {"name": "Ava Lee"}, "skills": ["Python"]});
        let collected = json!({"skills": "Python\nSQL\nDocker", "summary": "Hi"});
        let (p0, c0) = (parsed.clone(), collected.clone());
        let first = finalize(&defaults, &parsed, &collected);
        let second = finalize(&defaults, &parsed, &collected);
        assert_eq!(first, second);
        assert_eq!(parsed, p0);
        assert_eq!(collected, c0);
    }
}
