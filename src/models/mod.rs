//! Model provider abstractions.
//!
//! Defines the [`ModelProvider`] trait, the [`ConversationTurn`] type
//! callers send as chat history, and the typed [`GenerateResponse`]
//! decoded from a provider reply.  [`GeminiProvider`] is the only
//! concrete implementation.

pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use gemini::{GeminiProvider, ModelInfo};

// ---------------------------------------------------------------------------
// ConversationTurn – one entry of caller-supplied history
// ---------------------------------------------------------------------------

/// Author of a conversation turn.
///
/// Any role string other than `user` / `assistant` is kept as sent and
/// rendered verbatim into the prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Assistant,
    #[serde(untagged)]
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Other(role) => role,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single prior message in a chat, oldest first.
///
/// Both fields may be omitted on the wire: `role` falls back to
/// [`Role::User`] and `content` to the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConversationTurn {
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// GenerateResponse – provider reply shapes
// ---------------------------------------------------------------------------

/// A provider reply, decoded as the first shape that fits.
///
/// Variants are tried in declaration order, so a body carrying both a
/// top-level `text` and `candidates` decodes as [`GenerateResponse::Text`].
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GenerateResponse {
    /// Reply exposing the generated text directly.
    Text { text: String },
    /// Standard `generateContent` reply with a list of candidates.
    Candidates { candidates: Vec<Candidate> },
    /// Anything else (e.g. a prompt blocked by safety filters).
    Unrecognized(serde_json::Value),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Content,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Shorthand for a reply that exposes its text directly.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Shorthand for a reply with a single one-part candidate.
    pub fn single_candidate(text: impl Into<String>) -> Self {
        Self::Candidates {
            candidates: vec![Candidate {
                content: Content {
                    parts: vec![Part {
                        text: Some(text.into()),
                    }],
                },
            }],
        }
    }
}

// ---------------------------------------------------------------------------
// ModelProvider trait
// ---------------------------------------------------------------------------

/// Trait implemented by every text-generation backend.
///
/// A provider receives one flattened prompt and returns the decoded
/// reply.  Errors are plain [`anyhow::Error`]s; turning them into
/// user-facing text is the caller's job.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Send `prompt` as a single user message and return the reply.
    async fn generate_content(&self, prompt: &str) -> Result<GenerateResponse, anyhow::Error>;
}
