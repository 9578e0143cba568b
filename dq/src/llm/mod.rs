//! LLM Client module for AgenticDQ
//!
//! The Structured Completion Adapter: a text capability every backend has and
//! an optional schema-constrained capability probed at call time.

use std::sync::Arc;

use tracing::debug;

mod anthropic;
pub mod client;
mod error;
mod openai;
mod types;

pub use anthropic::AnthropicClient;
pub use client::{LlmClient, StructuredClient};
pub use error::LlmError;
pub use openai::OpenAIClient;
pub use types::{
    CompletionRequest, CompletionResponse, DEFAULT_MAX_TOKENS, Message, ResponseSchema, Role, StopReason, TokenUsage,
};

use crate::config::LlmConfig;

/// Create an LLM client based on the provider specified in config
///
/// Supports "openai" and "anthropic" providers.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, "create_client: called");
    match config.provider.as_str() {
        "openai" => {
            debug!("create_client: creating OpenAI client");
            Ok(Arc::new(OpenAIClient::from_config(config)?))
        }
        "anthropic" => {
            debug!("create_client: creating Anthropic client");
            Ok(Arc::new(AnthropicClient::from_config(config)?))
        }
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(LlmError::Unsupported(format!(
                "Unknown LLM provider: '{}'. Supported: openai, anthropic",
                other
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_create_client_unknown_provider() {
        let config = LlmConfig {
            provider: "cohere".to_string(),
            ..Default::default()
        };
        assert!(matches!(create_client(&config), Err(LlmError::Unsupported(_))));
    }

    #[test]
    #[serial]
    fn test_create_client_missing_key() {
        let config = LlmConfig {
            api_key_env: Some("ADQ_TEST_FACTORY_KEY".to_string()),
            ..Default::default()
        };
        unsafe { std::env::remove_var("ADQ_TEST_FACTORY_KEY") };
        assert!(matches!(create_client(&config), Err(LlmError::MissingApiKey(_))));

        unsafe { std::env::set_var("ADQ_TEST_FACTORY_KEY", "sk-test") };
        let client = create_client(&config).unwrap();
        assert_eq!(client.name(), "openai");
        assert!(client.structured().is_some());
        unsafe { std::env::remove_var("ADQ_TEST_FACTORY_KEY") };
    }
}
