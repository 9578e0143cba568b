//! LLM request/response types
//!
//! Provider-agnostic shapes shared by the OpenAI and Anthropic backends. Every
//! pipeline stage sends exactly one system prompt and one user payload; the
//! message list exists so corrective retries can be expressed without a new type.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::LlmError;

/// Default response budget when the caller does not set one
pub const DEFAULT_MAX_TOKENS: u32 = 8192;

/// A completion request - everything needed for one LLM call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System instruction for the stage
    pub system_prompt: String,

    /// User messages (a single payload for every pipeline stage)
    pub messages: Vec<Message>,

    /// Max tokens for response (capped by the client config)
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Build a request with one system instruction and one user payload
    pub fn new(system_prompt: impl Into<String>, user: impl Into<String>) -> Self {
        let system_prompt = system_prompt.into();
        let user = user.into();
        debug!(system_len = system_prompt.len(), user_len = user.len(), "CompletionRequest::new: called");
        Self {
            system_prompt,
            messages: vec![Message::user(user)],
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Text of the last user message, if any
    pub fn user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
        }
    }
}

/// Response from a completion request
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Text content (if any)
    pub content: Option<String>,

    /// Why the model stopped
    pub stop_reason: StopReason,

    /// Token usage for cost tracking
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Plain text response with default stop reason and usage
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    /// Response that carries no payload at all
    pub fn empty() -> Self {
        Self {
            content: None,
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    /// Take the text payload, treating an absent or blank body as a generation failure
    pub fn into_text(self) -> Result<String, LlmError> {
        match self.content {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => {
                debug!(stop_reason = ?self.stop_reason, "CompletionResponse::into_text: empty payload");
                Err(LlmError::EmptyResponse)
            }
        }
    }
}

/// Why the model stopped generating
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
    Refusal,
}

impl StopReason {
    /// Parse from an Anthropic `stop_reason` string
    pub fn from_anthropic(s: &str) -> Self {
        match s {
            "max_tokens" => StopReason::MaxTokens,
            "stop_sequence" => StopReason::StopSequence,
            "refusal" => StopReason::Refusal,
            _ => StopReason::EndTurn,
        }
    }

    /// Parse from an OpenAI `finish_reason` string
    pub fn from_openai(s: &str) -> Self {
        match s {
            "length" => StopReason::MaxTokens,
            "content_filter" => StopReason::Refusal,
            _ => StopReason::EndTurn,
        }
    }
}

/// Target schema for a schema-constrained completion
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    /// Schema name reported to the backend (e.g. `DecisionBrief`)
    pub name: String,
    /// JSON Schema document the output must conform to
    pub schema: serde_json::Value,
}

/// Token usage for cost tracking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}
