use crate::analysis::prompts::{
    GENERAL_ROLE, RESUME_END, RESUME_START, REVIEW_PROMPT_TEMPLATE, TRUNCATION_MARKER,
};

pub const DEFAULT_MAX_CHARS: usize = 2000;

/// Builds the review prompt sent to the model. Pure and deterministic.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    max_chars: Option<usize>,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            max_chars: Some(DEFAULT_MAX_CHARS),
        }
    }
}

impl PromptBuilder {
    /// `None` sends the résumé uncut.
    pub fn new(max_chars: Option<usize>) -> Self {
        Self { max_chars }
    }

    pub fn build(&self, resume_text: &str, job_role: &str) -> String {
        let job_role = match job_role.trim() {
            "" => GENERAL_ROLE,
            role => role,
        };
        let body = match self.max_chars {
            Some(max) => truncate_chars(resume_text, max),
            None => resume_text.to_string(),
        };

        // The résumé is appended after substitution so its text is never scanned.
        let mut prompt = REVIEW_PROMPT_TEMPLATE.replace("{job_role}", job_role);
        prompt.push_str(RESUME_START);
        prompt.push('\n');
        prompt.push_str(&body);
        prompt.push('\n');
        prompt.push_str(RESUME_END);
        prompt
    }
}

/// Cuts `text` to `max` characters and marks the cut. Never splits a code point.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => format!("{}{}", &text[..byte_index], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}
