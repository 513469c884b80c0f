// Prompt constants for the resume rewriter.

/// System prompt for rewriting. Plain text out, no commentary.
pub const REWRITE_SYSTEM: &str = "You are an expert resume editor. \
    Rewrite resumes so they address the hiring manager's requirements. \
    Only rephrase or emphasize what the candidate already states; never invent \
    employers, dates, degrees, or metrics. \
    Respond with the revised resume text only. \
    Do NOT use markdown. Do NOT include explanations.";

/// Rewrite prompt template. Replace `{resume_text}` and `{suggestions}` before sending.
pub const REWRITE_PROMPT_TEMPLATE: &str = "Rewrite the following resume text by incorporating these suggestions. \
Ensure the final version is coherent, professional, and well-structured.

Resume Text:
{resume_text}

Suggestions:
{suggestions}

Refined Resume:";

pub fn build_rewrite_prompt(resume_text: &str, suggestions: &str) -> String {
    REWRITE_PROMPT_TEMPLATE
        .replace("{suggestions}", suggestions)
        .replace("{resume_text}", resume_text)
}
