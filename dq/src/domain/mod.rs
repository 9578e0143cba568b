//! Domain types for AgenticDQ
//!
//! Request, brief, candidate items, clarifying questions and the final output.
//! Every type the generator produces implements `StructuredOutput`.

mod brief;
mod item;
mod output;
mod question;
mod request;

pub use brief::{DecisionBrief, DecisionContext, ORCHESTRATOR_MODE};
pub use item::{
    AlternativesOutput, CriticOutput, Item, ItemKind, MIN_ITEM_TEXT, PreferencesOutput, Provenance, UncertaintiesOutput,
};
pub use output::{FinalOutput, Meta};
pub use question::{
    AnswerType, ClarificationAnswer, ClarifyingQuestion, MAX_CLARIFYING_QUESTIONS, QuestionCategory, QuestionerOutput,
};
pub use request::DecisionRequest;
