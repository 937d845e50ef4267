//! The AI assistant: a never-failing wrapper around one model provider.
//!
//! [`Assistant`] flattens optional chat history into a single prompt,
//! makes exactly one provider call, and turns whatever comes back
//! (text, an unexpected shape, or an error) into a reply string.  When
//! the provider client could not be built at startup the assistant is
//! [`AssistantStatus::Degraded`] and answers every call with a fixed mock
//! reply instead.

use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::{self, Config, ConfigError, GeminiConfig};
use crate::models::{ConversationTurn, GenerateResponse, GeminiProvider, ModelProvider};

/// Reply used when the provider answered without any usable text.
pub const NO_RESPONSE_TEXT: &str = "I apologize, but I couldn't generate a response.";

/// Model label attached to chat responses.
pub const PROVIDER_LABEL: &str = "gemini-pro";

/// Human-readable model name reported by the info endpoint.
pub const DISPLAY_MODEL: &str = "Gemini Pro";

/// Whether the assistant can reach a real provider.
pub enum AssistantStatus {
    Ready(Box<dyn ModelProvider>),
    /// No provider client; every reply is the mock template.
    Degraded,
}

/// Result of [`Assistant::generate_project_suggestions`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSuggestions {
    pub description: String,
    pub suggestions: String,
}

/// Process-wide assistant, built once at startup and shared by reference.
pub struct Assistant {
    status: AssistantStatus,
}

impl Assistant {
    /// Build the Gemini-backed assistant from `config` and the
    /// `GEMINI_API_KEY` environment variable.
    ///
    /// Fails only when the credential is missing.  A provider client that
    /// cannot be initialised yields a degraded assistant instead.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let api_key = config::api_key_from_env()?;
        Ok(Self::with_api_key(api_key, &config.gemini))
    }

    /// Build the Gemini-backed assistant with an explicit key.
    pub fn with_api_key(api_key: String, gemini: &GeminiConfig) -> Self {
        match GeminiProvider::new(api_key, gemini.endpoint.as_str(), gemini.model.as_str()) {
            Ok(provider) => {
                info!(model = %gemini.model, "Gemini assistant initialised");
                Self::with_provider(Box::new(provider))
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Gemini client unavailable, using mock mode");
                Self::degraded()
            }
        }
    }

    pub fn with_provider(provider: Box<dyn ModelProvider>) -> Self {
        Self {
            status: AssistantStatus::Ready(provider),
        }
    }

    pub fn degraded() -> Self {
        Self {
            status: AssistantStatus::Degraded,
        }
    }

    pub fn status(&self) -> &AssistantStatus {
        &self.status
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.status, AssistantStatus::Degraded)
    }

    /// `"ready"` or `"degraded"`, for logs.
    pub fn status_label(&self) -> &'static str {
        match self.status {
            AssistantStatus::Ready(_) => "ready",
            AssistantStatus::Degraded => "degraded",
        }
    }

    /// Answer `message`, using `history` (oldest first) as context.
    ///
    /// Never fails: provider errors and malformed replies come back as
    /// an apology or an `"I encountered an error: …"` string.
    pub async fn get_response(
        &self,
        message: &str,
        history: Option<&[ConversationTurn]>,
    ) -> String {
        let provider = match &self.status {
            AssistantStatus::Ready(p) => p,
            AssistantStatus::Degraded => return mock_response(message),
        };

        let prompt = build_prompt(message, history);
        let result = provider.generate_content(&prompt).await.and_then(extract_text);

        match result {
            Ok(text) => text,
            Err(e) => {
                error!(provider = provider.name(), error = %format!("{e:#}"), "error generating AI response");
                format!("I encountered an error: {e:#}. Please try again.")
            }
        }
    }

    /// Ask for a stack / features / practices / complexity analysis of a
    /// project description.
    pub async fn generate_project_suggestions(&self, description: &str) -> ProjectSuggestions {
        let prompt = project_analysis_prompt(description);
        let suggestions = self.get_response(&prompt, None).await;
        ProjectSuggestions {
            description: description.to_string(),
            suggestions,
        }
    }
}

/// Flatten `history` and `message` into a single prompt.
///
/// Without history the prompt is `message` itself.  Otherwise each turn
/// becomes a `"{role}: {content}"` line, followed by a blank line and
/// `"User: {message}\nAssistant:"`.
pub fn build_prompt(message: &str, history: Option<&[ConversationTurn]>) -> String {
    let history = match history {
        Some(h) if !h.is_empty() => h,
        _ => return message.to_string(),
    };

    let context = history
        .iter()
        .map(|turn| format!("{}: {}", turn.role, turn.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{context}\n\nUser: {message}\nAssistant:")
}

/// Pull the reply text out of a decoded provider response.
///
/// Direct text wins, then the first part of the first candidate.  A reply
/// with neither yields [`NO_RESPONSE_TEXT`]; a first candidate without a
/// text part is an error.
pub fn extract_text(resp: GenerateResponse) -> anyhow::Result<String> {
    match resp {
        GenerateResponse::Text { text } => Ok(text),
        GenerateResponse::Candidates { candidates } if !candidates.is_empty() => candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| anyhow::anyhow!("first candidate has no text part")),
        _ => Ok(NO_RESPONSE_TEXT.to_string()),
    }
}

/// Fixed reply of a degraded assistant.  Echoes `message` verbatim.
pub fn mock_response(message: &str) -> String {
    format!(
        "[Mock Mode - Gemini not fully configured]\n\
         \n\
         You sent: {message}\n\
         \n\
         To enable full AI functionality:\n\
         1. Make sure the Gemini HTTP client can start (TLS and network setup)\n\
         2. Set GEMINI_API_KEY in the environment\n\
         3. Restart the server"
    )
}

/// Prompt used by [`Assistant::generate_project_suggestions`].
pub fn project_analysis_prompt(description: &str) -> String {
    format!(
        "Analyze this project description and provide recommendations:\n\
         \n\
         {description}\n\
         \n\
         Provide:\n\
         1. Recommended technology stack\n\
         2. Key features to implement\n\
         3. Best practices\n\
         4. Estimated complexity"
    )
}

/// Prompt used by the `suggest-project` endpoint.
pub fn suggestion_prompt(description: &str) -> String {
    format!(
        "Based on this project description: \"{description}\"\n\
         \n\
         Suggest:\n\
         1. Technology stack recommendations\n\
         2. Features to consider\n\
         3. Best practices\n\
         \n\
         Keep it concise and professional."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, Content, Role};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Records prompts and replies with a canned response (or error).
    struct RecordingProvider {
        prompts: Arc<Mutex<Vec<String>>>,
        reply: Result<GenerateResponse, String>,
    }

    #[async_trait]
    impl ModelProvider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }
        async fn generate_content(&self, prompt: &str) -> Result<GenerateResponse, anyhow::Error> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(|e| anyhow::anyhow!(e))
        }
    }

    fn recording(
        reply: Result<GenerateResponse, String>,
    ) -> (Assistant, Arc<Mutex<Vec<String>>>) {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let provider = RecordingProvider {
            prompts: prompts.clone(),
            reply,
        };
        (Assistant::with_provider(Box::new(provider)), prompts)
    }

    #[test]
    fn prompt_without_history_is_message() {
        assert_eq!(build_prompt("hello", None), "hello");
        assert_eq!(build_prompt("hello", Some(&[][..])), "hello");
    }

    #[test]
    fn prompt_flattens_history_in_order() {
        let history = vec![
            ConversationTurn::new(Role::User, "A"),
            ConversationTurn::new(Role::Assistant, "B"),
        ];
        assert_eq!(
            build_prompt("C", Some(history.as_slice())),
            "user: A\nassistant: B\n\nUser: C\nAssistant:"
        );
    }

    #[test]
    fn prompt_renders_other_roles_as_sent() {
        let history = vec![ConversationTurn::new(Role::Other("system".into()), "be brief")];
        assert_eq!(
            build_prompt("q", Some(history.as_slice())),
            "system: be brief\n\nUser: q\nAssistant:"
        );
    }

    #[test]
    fn prompt_uses_defaults_for_missing_fields() {
        let history = vec![ConversationTurn::default()];
        assert_eq!(build_prompt("q", Some(history.as_slice())), "user: \n\nUser: q\nAssistant:");
    }

    #[test]
    fn extract_direct_text_unmodified() {
        let text = extract_text(GenerateResponse::text("  spaced  ")).unwrap();
        assert_eq!(text, "  spaced  ");
    }

    #[test]
    fn extract_first_candidate() {
        let text = extract_text(GenerateResponse::single_candidate("from candidate")).unwrap();
        assert_eq!(text, "from candidate");
    }

    #[test]
    fn extract_falls_back_to_apology() {
        let empty = GenerateResponse::Candidates { candidates: vec![] };
        assert_eq!(extract_text(empty).unwrap(), NO_RESPONSE_TEXT);

        let other = GenerateResponse::Unrecognized(serde_json::json!({}));
        assert_eq!(extract_text(other).unwrap(), NO_RESPONSE_TEXT);
    }

    #[test]
    fn extract_candidate_without_parts_is_error() {
        let resp = GenerateResponse::Candidates {
            candidates: vec![Candidate {
                content: Content { parts: vec![] },
            }],
        };
        assert!(extract_text(resp).is_err());
    }

    #[tokio::test]
    async fn degraded_echoes_message_as_mock() {
        let assistant = Assistant::degraded();
        assert!(assistant.is_degraded());
        assert_eq!(assistant.status_label(), "degraded");

        let history = vec![ConversationTurn::new(Role::Assistant, "earlier")];
        let reply = assistant.get_response("hi there", Some(history.as_slice())).await;
        assert!(reply.contains("hi there"));
        assert!(reply.contains("Mock"));
        assert_eq!(reply, mock_response("hi there"));
    }

    #[tokio::test]
    async fn ready_sends_assembled_prompt_once() {
        let (assistant, prompts) = recording(Ok(GenerateResponse::text("ok")));
        assert_eq!(assistant.status_label(), "ready");

        let history = vec![
            ConversationTurn::new(Role::User, "A"),
            ConversationTurn::new(Role::Assistant, "B"),
        ];
        let reply = assistant.get_response("C", Some(history.as_slice())).await;

        assert_eq!(reply, "ok");
        let sent = prompts.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], "user: A\nassistant: B\n\nUser: C\nAssistant:");
    }

    #[tokio::test]
    async fn provider_error_is_embedded_in_reply() {
        let (assistant, _) = recording(Err("quota exceeded".into()));
        let reply = assistant.get_response("hi", None).await;
        assert!(reply.starts_with("I encountered an error:"));
        assert!(reply.contains("quota exceeded"));
        assert!(reply.ends_with("Please try again."));
    }

    #[tokio::test]
    async fn malformed_candidate_is_embedded_in_reply() {
        let (assistant, _) = recording(Ok(GenerateResponse::Candidates {
            candidates: vec![Candidate::default()],
        }));
        let reply = assistant.get_response("hi", None).await;
        assert!(reply.starts_with("I encountered an error:"));
    }

    #[tokio::test]
    async fn project_suggestions_wrap_description() {
        let (assistant, prompts) = recording(Ok(GenerateResponse::text("use Rust")));
        let out = assistant
            .generate_project_suggestions("A portfolio site with a chatbot")
            .await;

        assert_eq!(out.description, "A portfolio site with a chatbot");
        assert_eq!(out.suggestions, "use Rust");
        let sent = prompts.lock().unwrap();
        assert!(sent[0].contains("A portfolio site with a chatbot"));
        assert!(sent[0].contains("Estimated complexity"));
    }

    #[test]
    fn suggestion_prompt_quotes_description() {
        let p = suggestion_prompt("todo app");
        assert!(p.starts_with("Based on this project description: \"todo app\""));
        assert!(p.ends_with("Keep it concise and professional."));
    }
}
