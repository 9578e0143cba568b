//! Prompt Template System
//!
//! Every stage's system instruction is a `.pmt` Handlebars template.
//!
//! Template loading chain:
//! 1. `<override-dir>/{name}.pmt` (user override)
//! 2. Embedded default compiled from `dq/prompts/`

pub mod embedded;
mod loader;

pub use loader::PromptLibrary;
