//! LlmClient trait definition
//!
//! The completion adapter is capability-polymorphic. Every backend can produce
//! free-form text through [`LlmClient::complete`]; backends that can constrain
//! generation to a JSON Schema additionally expose a [`StructuredClient`] through
//! [`LlmClient::structured`]. Callers probe for the structured capability at call
//! time and prefer it when present.

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError, ResponseSchema};

/// Stateless LLM client - each call is independent (fresh context)
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Short backend name for logs (e.g. "openai")
    fn name(&self) -> &str;

    /// Send a single free-form completion request
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Schema-constrained generation, when the backend supports it
    fn structured(&self) -> Option<&dyn StructuredClient> {
        None
    }
}

/// Schema-constrained generation capability
///
/// Implementations return the parsed JSON value the backend produced under the
/// given schema. An absent or empty payload is reported as [`LlmError::EmptyResponse`].
#[async_trait]
pub trait StructuredClient: Send + Sync {
    async fn complete_structured(
        &self,
        request: CompletionRequest,
        schema: &ResponseSchema,
    ) -> Result<serde_json::Value, LlmError>;
}
