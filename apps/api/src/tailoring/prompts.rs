// Prompt constants for resume tailoring suggestions.

/// Role half of the suggestion system prompt; JSON-only rules are appended at call time.
pub const SUGGEST_ROLE: &str = "You are an experienced resume editor. \
    You propose small, truthful wording changes that align a resume with a job description.";

/// Suggestion prompt template. Replace `{resume}` and `{job_description}` before sending.
pub const SUGGEST_PROMPT_TEMPLATE: &str = r#"Suggest edits that tailor the resume below to the job description.

Return a JSON object with this EXACT schema (no extra fields):
{
  "changes": [
    {
      "section": "EXPERIENCE",
      "original": "exact text copied from the resume",
      "tailored": "rewritten text",
      "reason": "which job requirement this addresses"
    }
  ]
}

Rules:
- "original" MUST be copied verbatim from a single line of the resume. Never merge lines.
- Keep every claim truthful. Do NOT invent employers, titles, dates, or metrics.
- Prefer rewording existing bullets over adding new ones.
- Return an empty "changes" array when nothing should change.

RESUME:
{resume}

JOB DESCRIPTION:
{job_description}"#;
