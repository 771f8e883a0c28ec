//! Review and generation forms.
//!
//! Each form owns its inputs and its rendered output. Submitting takes the
//! form by `&mut`, so a second submit cannot start while one is in flight.

use std::fmt;

use tracing::warn;

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::history::HistoryEntry;
use crate::replay::ReplayCommand;

/// The two views of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Review,
    Generate,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Review => f.write_str("review"),
            Self::Generate => f.write_str("generate"),
        }
    }
}

/// Code review form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewForm {
    pub code: String,
    pub language: String,
    /// Rendered review, or `Error: ...` after a failed submit.
    pub result: String,
}

impl Default for ReviewForm {
    fn default() -> Self {
        Self {
            code: "function greet(name){\n  return 'Hello, ' + name;\n}".to_string(),
            language: "javascript".to_string(),
            result: String::new(),
        }
    }
}

impl ReviewForm {
    /// Send the form and render the outcome into `result`.
    ///
    /// Returns the history entry to record on success.
    pub async fn submit(&mut self, api: &ApiClient) -> Result<HistoryEntry, ClientError> {
        self.result.clear();
        match api.review(&self.code, &self.language).await {
            Ok(text) => {
                self.result = text;
                Ok(HistoryEntry::review(
                    self.code.clone(),
                    self.result.clone(),
                    self.language.clone(),
                ))
            }
            Err(e) => {
                warn!(error = %e, "Review request failed");
                self.result = format!("Error: {e}");
                Err(e)
            }
        }
    }

    /// Empty the code and the output.
    pub fn clear(&mut self) {
        self.code.clear();
        self.result.clear();
    }

    fn load(&mut self, code: String, language: String) {
        if !code.is_empty() {
            self.code = code;
        }
        if !language.is_empty() {
            self.language = language;
        }
    }
}

/// Code generation form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateForm {
    pub description: String,
    pub language: String,
    /// Rendered code, or `Error: ...` after a failed submit.
    pub code: String,
}

impl Default for GenerateForm {
    fn default() -> Self {
        Self {
            description: "Create a function that returns the nth fibonacci number".to_string(),
            language: "javascript".to_string(),
            code: String::new(),
        }
    }
}

impl GenerateForm {
    /// Send the form and render the outcome into `code`.
    pub async fn submit(&mut self, api: &ApiClient) -> Result<HistoryEntry, ClientError> {
        self.code.clear();
        match api.generate(&self.description, &self.language).await {
            Ok(text) => {
                self.code = text;
                Ok(HistoryEntry::generate(
                    self.description.clone(),
                    self.code.clone(),
                    self.language.clone(),
                ))
            }
            Err(e) => {
                warn!(error = %e, "Generation request failed");
                self.code = format!("Error: {e}");
                Err(e)
            }
        }
    }

    /// Empty the description and the output.
    pub fn clear(&mut self) {
        self.description.clear();
        self.code.clear();
    }

    /// Suggested file name for the generated code.
    pub fn file_name(&self) -> String {
        let ext: &str = if self.language.is_empty() {
            "txt"
        } else {
            &self.language
        };
        format!("generated.{ext}")
    }

    fn load(&mut self, description: String, language: String, code: String) {
        if !description.is_empty() {
            self.description = description;
        }
        if !language.is_empty() {
            self.language = language;
        }
        if !code.is_empty() {
            self.code = code;
        }
    }
}

/// Both forms plus the active view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workspace {
    active: View,
    pub review: ReviewForm,
    pub generate: GenerateForm,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> View {
        self.active
    }

    pub fn switch_to(&mut self, view: View) {
        self.active = view;
    }

    /// Switch to the command's target view, then populate that view only.
    pub fn apply(&mut self, command: ReplayCommand) {
        self.switch_to(command.target());
        match command {
            ReplayCommand::LoadReview { code, language } => self.review.load(code, language),
            ReplayCommand::LoadGenerate {
                description,
                language,
                code,
            } => self.generate.load(description, language, code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::select;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_replay_review_switches_and_populates() {
        let mut workspace = Workspace::new();
        workspace.switch_to(View::Generate);
        let untouched = workspace.generate.clone();

        workspace.apply(select(&HistoryEntry::review("x = 1", "fine", "python")));

        assert_eq!(workspace.active(), View::Review);
        assert_eq!(workspace.review.code, "x = 1");
        assert_eq!(workspace.review.language, "python");
        assert_eq!(workspace.generate, untouched);
    }

    #[test]
    fn test_replay_generate_switches_and_populates() {
        let mut workspace = Workspace::new();
        let untouched = workspace.review.clone();

        workspace.apply(select(&HistoryEntry::generate("sum", "a + b", "python")));

        assert_eq!(workspace.active(), View::Generate);
        assert_eq!(workspace.generate.description, "sum");
        assert_eq!(workspace.generate.language, "python");
        assert_eq!(workspace.generate.code, "a + b");
        assert_eq!(workspace.review, untouched);
    }

    #[test]
    fn test_replay_keeps_fields_missing_from_entry() {
        let mut workspace = Workspace::new();
        workspace.apply(ReplayCommand::LoadReview {
            code: "y = 2".to_string(),
            language: String::new(),
        });
        assert_eq!(workspace.review.code, "y = 2");
        assert_eq!(workspace.review.language, "javascript");
    }

    #[test]
    fn test_generated_file_name() {
        let mut form = GenerateForm::default();
        assert_eq!(form.file_name(), "generated.javascript");
        form.language.clear();
        assert_eq!(form.file_name(), "generated.txt");
    }

    #[tokio::test]
    async fn test_submit_records_entry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/review"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"review": "nice"})))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri());
        let mut form = ReviewForm::default();
        let entry = form.submit(&api).await.unwrap();

        assert_eq!(form.result, "nice");
        assert_eq!(entry.output(), "nice");
        assert_eq!(entry.input(), form.code);
        assert_eq!(entry.language(), "javascript");
    }

    #[tokio::test]
    async fn test_submit_failure_renders_inline_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"error": "description is required"})),
            )
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri());
        let mut form = GenerateForm::default();
        form.clear();
        assert!(form.submit(&api).await.is_err());
        assert_eq!(form.code, "Error: description is required");
    }
}
