// Career tool prompt templates.
// Placeholders in braces are replaced before sending.

pub const COVER_LETTER_SYSTEM: &str = "\
You are an experienced career writer. You write concise, specific cover letters \
grounded only in the candidate's real experience.";

pub const COVER_LETTER_PROMPT: &str = r#"Write a cover letter for the role below.

CANDIDATE RESUME:
{resume}

JOB DESCRIPTION:
{job_description}

COMPANY: {company}
TONE: {tone}

RULES:
1. {fidelity_instruction}
2. Three to four paragraphs, under 400 words.
3. Connect two or three concrete achievements to the job's requirements.
4. Return only the letter text, no preamble."#;

pub const OPTIMIZE_SYSTEM: &str = "\
You are a senior recruiter who reviews resumes for clarity, impact and relevance.";

pub const OPTIMIZE_PROMPT: &str = r#"Review this resume and suggest concrete improvements.

RESUME:
{resume}

TARGET JOB (may be empty):
{job_description}

Return a JSON object:
{
  "score": 0-100,
  "improvements": [
    {"section": "string", "suggestion": "string", "reason": "string"}
  ]
}

RULES:
1. {fidelity_instruction}
2. Between 3 and 8 improvements, most important first.
3. Return ONLY the JSON object."#;

pub const INTERVIEW_QUESTIONS_SYSTEM: &str = "\
You are a hiring manager preparing a structured interview.";

pub const INTERVIEW_QUESTIONS_PROMPT: &str = r#"Prepare {count} interview questions for a {level} {role} candidate.

Mix behavioral, technical and situational questions.

Return a JSON object:
{
  "questions": [
    {"question": "string", "category": "Behavioral" | "Technical" | "Situational", "tip": "string"}
  ]
}

Return ONLY the JSON object."#;

pub const INTERVIEW_EVALUATE_SYSTEM: &str = "\
You are an interview coach giving direct, constructive feedback.";

pub const INTERVIEW_EVALUATE_PROMPT: &str = r#"Evaluate the candidate's answer.

QUESTION:
{question}

ANSWER:
{answer}

Return a JSON object:
{
  "score": 0-10,
  "feedback": "string",
  "improved_answer": "string"
}

Return ONLY the JSON object."#;

pub const COACH_SYSTEM: &str = "\
You are a friendly career coach. Give practical, specific advice about job searching, \
resumes, interviews and career growth. Keep answers under 250 words unless asked for more.";
