// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction appended to every prompt that works from a candidate's resume.
pub const FIDELITY_INSTRUCTION: &str = "\
    CRITICAL: Use only facts present in the resume material provided. \
    Do NOT invent employers, dates, degrees, certifications or metrics. \
    If something is unknown, leave it out rather than guessing.";
