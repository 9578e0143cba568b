//! Agentic DQ - structured decision briefs from free-text problems
//!
//! A fixed pipeline of LLM-backed agents turns a decision title and
//! narrative into a brief plus three disjoint buckets: alternatives
//! (things you could do), preferences (how you judge them) and
//! uncertainties (what you do not know yet).
//!
//! # Core Concepts
//!
//! - **Generator output is untrusted**: every stage output is schema-checked,
//!   retried with a corrective suffix, and re-stamped before it moves on
//! - **Pause, don't fail**: the optional Questioner returns a pending stub;
//!   answers bound to the request's signature resume the run
//! - **Capability probing**: native structured output when the client has
//!   it, extraction and validation when it does not
//!
//! # Modules
//!
//! - [`llm`] - LLM client traits and provider implementations
//! - [`validation`] - JSON extraction, schema checks and corrective retries
//! - [`agents`] - the stage agents
//! - [`pipeline`] - the coordinator state machine
//! - [`clarify`] - request signatures and clarification answers
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod agents;
pub mod clarify;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod render;
pub mod validation;

// Re-export commonly used types
pub use clarify::{ClarificationAnswers, PendingClarification, request_signature};
pub use config::{Config, LlmConfig, PipelineConfig};
pub use domain::{
    ClarificationAnswer, ClarifyingQuestion, DecisionBrief, DecisionContext, DecisionRequest, FinalOutput, Item,
    ItemKind, Meta,
};
pub use error::PipelineError;
pub use llm::{
    AnthropicClient, CompletionRequest, CompletionResponse, LlmClient, LlmError, OpenAIClient, StructuredClient,
    create_client,
};
pub use pipeline::{Pipeline, RunOptions, Stage};
pub use progress::{ProgressEvent, ProgressObserver};
pub use validation::{OutputSchema, StructuredOutput};
