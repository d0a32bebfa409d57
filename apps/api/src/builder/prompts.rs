// Builder LLM prompt templates.
// All prompts for the builder module are defined here.

pub const RESUME_PARSE_SYSTEM: &str = "\
You are a precise resume data extractor. \
Convert raw resume text into the portfolio record JSON described by the user.";

pub const RESUME_PARSE_PROMPT: &str = r#"Extract the following resume into a structured JSON object.

RESUME TEXT:
{resume_text}

OUTPUT SCHEMA (return exactly this structure, camelCase keys):
{
  "personalInfo": {
    "name": "string", "title": "string", "email": "string", "phone": "string",
    "location": "string", "about": "string", "linkedin": "string"
  },
  "summary": "string",
  "education": [{"degree": "string", "institution": "string", "year": "string"}],
  "experience": [{"title": "string", "company": "string", "duration": "string", "description": "string"}],
  "skills": [{"name": "string", "level": 0-100, "category": "Frontend" | "Backend" | "Database" | "Tools" | "Other"}],
  "projects": [{"title": "string", "description": "string", "tags": ["string"], "links": {"demo": "string", "code": "string"}}],
  "certifications": [{"name": "string", "issuer": "string", "year": "string"}],
  "leadership": "string"
}

RULES:
1. {fidelity_instruction}
2. Use "" for unknown strings and [] for empty sections. Never use placeholder text.
3. Estimate skill level from how the resume presents the skill; default to 80.
4. Keep experience descriptions to 1-3 sentences drawn from the resume bullets.
5. Return ONLY the JSON object."#;
