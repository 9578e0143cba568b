//! Pipeline error types

use thiserror::Error;

use crate::llm::LlmError;

/// Errors surfaced from a pipeline run
///
/// A failed stage aborts the whole run; no partially populated output is
/// returned alongside any of these.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed or empty request fields, detected before any generation call
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The backend failed or returned no usable payload
    #[error("generation failed: {0}")]
    Generation(#[from] LlmError),

    /// Text-mode output never produced a value conforming to the schema
    #[error("{schema} output failed validation after {attempts} attempt(s): {message}")]
    SchemaValidation {
        schema: &'static str,
        attempts: u32,
        message: String,
    },

    /// Clarification answers were collected for a different request
    #[error("clarification answers belong to a different request (expected signature {expected}, got {actual})")]
    StaleClarification { expected: String, actual: String },

    /// A prompt template failed to load or render
    #[error("prompt error: {0}")]
    Prompt(String),
}

impl PipelineError {
    /// Stable short name for display
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidInput(_) => "InputValidationError",
            PipelineError::Generation(_) => "GenerationFailure",
            PipelineError::SchemaValidation { .. } => "SchemaValidationFailure",
            PipelineError::StaleClarification { .. } => "StaleClarificationError",
            PipelineError::Prompt(_) => "PromptError",
        }
    }
}

impl From<handlebars::RenderError> for PipelineError {
    fn from(err: handlebars::RenderError) -> Self {
        PipelineError::Prompt(err.to_string())
    }
}
