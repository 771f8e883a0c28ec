//! Prompt templates sent to the upstream model.

/// Instructions preceding the code under review.
const REVIEW_INSTRUCTIONS: &str = "You are an expert code reviewer. Provide a concise review, highlight bugs, vulnerabilities, performance issues, testing recommendations and suggested fixes. Use markdown.";

/// Instructions following the language in a generation prompt.
const GENERATE_INSTRUCTIONS: &str =
    "Generate code for the following request. Include only the code and minimal comments.";

/// Build the review prompt.
pub fn build_review_prompt(code: &str, language: &str) -> String {
    format!("{REVIEW_INSTRUCTIONS}\n\nLanguage: {language}\n\nCode:\n{code}")
}

/// Build the generation prompt.
pub fn build_generate_prompt(description: &str, language: &str) -> String {
    format!("You are an expert {language} developer. {GENERATE_INSTRUCTIONS}\n\nRequest:\n{description}")
}
