//! Pipeline Coordinator
//!
//! Runs the stage agents in order for one request:
//!
//! ```text
//! INIT -> [AWAIT_QUESTIONS -> (PENDING_CLARIFICATION)] -> BUILD_BRIEF
//!      -> GENERATE_CANDIDATES -> CRITIQUE -> SYNTHESIZE -> DONE
//! ```
//!
//! Pausing for clarification is an early return of a stub output, not an
//! error. Resuming is a fresh invocation with the same request and the
//! collected answers.

use std::sync::Arc;

use crate::clarify::ClarificationAnswers;
use crate::domain::{DecisionRequest, FinalOutput};
use crate::error::PipelineError;
use crate::llm::LlmClient;
use crate::progress::ProgressObserver;

mod coordinator;

pub use coordinator::Pipeline;

/// Coordinator states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Init,
    AwaitQuestions,
    PendingClarification,
    BuildBrief,
    GenerateCandidates,
    Critique,
    Synthesize,
    Done,
}

impl Stage {
    /// Stages that may follow this one
    pub fn successors(&self) -> &'static [Stage] {
        match self {
            Stage::Init => &[Stage::AwaitQuestions, Stage::BuildBrief],
            Stage::AwaitQuestions => &[Stage::PendingClarification, Stage::BuildBrief],
            Stage::PendingClarification => &[],
            Stage::BuildBrief => &[Stage::GenerateCandidates, Stage::PendingClarification],
            Stage::GenerateCandidates => &[Stage::Critique],
            Stage::Critique => &[Stage::Synthesize],
            Stage::Synthesize => &[Stage::Done],
            Stage::Done => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }
}

/// Per-run options
#[derive(Default)]
pub struct RunOptions<'a> {
    /// Run the Questioner before building the brief
    pub use_questioner: bool,
    /// Answers from a previous pending run; resumes that run
    pub answers: Option<ClarificationAnswers>,
    /// Advisory progress observer
    pub observer: Option<&'a dyn ProgressObserver>,
}

impl<'a> RunOptions<'a> {
    pub fn questioner() -> Self {
        Self {
            use_questioner: true,
            ..Default::default()
        }
    }

    /// Builder: resume with collected answers
    pub fn with_answers(mut self, answers: ClarificationAnswers) -> Self {
        self.use_questioner = true;
        self.answers = Some(answers);
        self
    }

    /// Builder: attach a progress observer
    pub fn with_observer(mut self, observer: &'a dyn ProgressObserver) -> Self {
        self.observer = Some(observer);
        self
    }
}

/// Run the pipeline once against `llm` with default agent settings
pub async fn run(
    request: &DecisionRequest,
    llm: Arc<dyn LlmClient>,
    options: RunOptions<'_>,
) -> Result<FinalOutput, PipelineError> {
    Pipeline::new(llm).run(request, options).await
}
