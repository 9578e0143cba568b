//! Stage agents
//!
//! Each agent renders its system prompt, builds a user payload from the
//! previous stage's typed output, and asks the validation layer for a
//! schema-conformant value. Generator output is untrusted: agents re-stamp
//! bucket types and provenance before returning it.

use std::sync::Arc;

use tracing::debug;

use crate::error::PipelineError;
use crate::llm::LlmClient;
use crate::prompts::PromptLibrary;
use crate::validation::{DEFAULT_RETRIES, StructuredOutput, complete_and_validate};

mod candidates;
mod critic;
mod orchestrator;
mod questioner;
mod synthesizer;

pub use candidates::{AlternativesAgent, PreferencesAgent, UncertaintiesAgent};
pub use critic::CriticAgent;
pub use orchestrator::Orchestrator;
pub use questioner::QuestionerAgent;
pub use synthesizer::Synthesizer;

/// Shared dependencies of every agent
#[derive(Clone)]
pub struct AgentContext {
    pub llm: Arc<dyn LlmClient>,
    pub prompts: Arc<PromptLibrary>,
    /// Corrective retries on the text path
    pub retries: u32,
}

impl AgentContext {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            prompts: Arc::new(PromptLibrary::embedded_only()),
            retries: DEFAULT_RETRIES,
        }
    }

    /// Builder: set prompt library
    pub fn with_prompts(mut self, prompts: Arc<PromptLibrary>) -> Self {
        self.prompts = prompts;
        self
    }

    /// Builder: set retry budget
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Render `template` as the system prompt and generate a `T`
    pub(crate) async fn generate<T: StructuredOutput>(
        &self,
        template: &str,
        vars: &serde_json::Value,
        user: &str,
    ) -> Result<T, PipelineError> {
        debug!(%template, schema = T::NAME, "AgentContext::generate: called");
        let system = self.prompts.render(template, vars)?;
        complete_and_validate::<T>(self.llm.as_ref(), &system, user, self.retries).await
    }
}
