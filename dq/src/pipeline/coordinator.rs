//! Pipeline - sequences the stage agents for one request

use std::sync::Arc;

use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::{RunOptions, Stage};
use crate::agents::{
    AgentContext, AlternativesAgent, CriticAgent, Orchestrator, PreferencesAgent, QuestionerAgent, Synthesizer,
    UncertaintiesAgent,
};
use crate::clarify::{ClarificationAnswers, request_signature};
use crate::config::Config;
use crate::domain::{DecisionBrief, DecisionRequest, FinalOutput, Item};
use crate::error::PipelineError;
use crate::llm::LlmClient;
use crate::progress::ProgressTracker;
use crate::prompts::PromptLibrary;

/// Candidate generation always runs a single pass
const CANDIDATE_ITERATION: u32 = 0;

/// Stage agents wired to one generator
pub struct Pipeline {
    orchestrator: Orchestrator,
    questioner: QuestionerAgent,
    alternatives: AlternativesAgent,
    preferences: PreferencesAgent,
    uncertainties: UncertaintiesAgent,
    critic: CriticAgent,
    synthesizer: Synthesizer,
    parallel_candidates: bool,
}

impl Pipeline {
    /// Pipeline with embedded prompts and default retries
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self::with_context(AgentContext::new(llm))
    }

    /// Pipeline honoring the retry, concurrency and prompt settings in `config`
    pub fn from_config(config: &Config, llm: Arc<dyn LlmClient>) -> Self {
        debug!(
            retries = config.pipeline.retries,
            parallel = config.pipeline.parallel_candidates,
            "Pipeline::from_config: called"
        );
        let prompts = Arc::new(PromptLibrary::new(config.prompts.override_dir.as_deref()));
        let ctx = AgentContext::new(llm)
            .with_prompts(prompts)
            .with_retries(config.pipeline.retries);
        Self::with_context(ctx).with_parallel_candidates(config.pipeline.parallel_candidates)
    }

    pub fn with_context(ctx: AgentContext) -> Self {
        Self {
            orchestrator: Orchestrator::new(ctx.clone()),
            questioner: QuestionerAgent::new(ctx.clone()),
            alternatives: AlternativesAgent::new(ctx.clone()),
            preferences: PreferencesAgent::new(ctx.clone()),
            uncertainties: UncertaintiesAgent::new(ctx.clone()),
            critic: CriticAgent::new(ctx.clone()),
            synthesizer: Synthesizer::new(ctx),
            parallel_candidates: false,
        }
    }

    /// Builder: run the three candidate agents concurrently
    pub fn with_parallel_candidates(mut self, parallel: bool) -> Self {
        self.parallel_candidates = parallel;
        self
    }

    /// Run the pipeline for `request`
    ///
    /// Returns either the completed output or, when the Questioner asks
    /// for input, a pending stub carrying the questions. Supplying answers
    /// resumes a pending run; they are verified against the request before
    /// any generator call.
    pub async fn run(&self, request: &DecisionRequest, options: RunOptions<'_>) -> Result<FinalOutput, PipelineError> {
        request.validate()?;
        if let Some(answers) = &options.answers {
            answers.verify(request)?;
        }

        let run_id = Uuid::now_v7();
        let span = info_span!("run", %run_id);
        self.run_inner(request, options).instrument(span).await
    }

    async fn run_inner(&self, request: &DecisionRequest, options: RunOptions<'_>) -> Result<FinalOutput, PipelineError> {
        debug!(
            title = %request.title,
            use_questioner = options.use_questioner,
            resuming = options.answers.is_some(),
            "Pipeline::run: called"
        );
        let mut progress = ProgressTracker::new(options.observer);

        let brief = match (&options.answers, options.use_questioner) {
            (Some(answers), _) => {
                progress.emit(Stage::BuildBrief, "Building decision brief with clarifications", 15);
                self.orchestrator
                    .build_brief_with_clarification(request, answers)
                    .await?
            }
            (None, true) => {
                progress.emit(Stage::AwaitQuestions, "Asking clarifying questions", 5);
                let questions = self.questioner.run(request).await?;

                progress.emit(Stage::BuildBrief, "Building decision brief", 15);
                let brief = self.orchestrator.build_brief(request).await?;

                if questions.wants_answers() {
                    info!(questions = questions.questions.len(), "Pausing for clarification");
                    let stub = FinalOutput::pending(brief, questions.questions, request_signature(request));
                    progress.emit(Stage::PendingClarification, "Waiting for clarification", 100);
                    return Ok(stub);
                }
                brief
            }
            (None, false) => {
                progress.emit(Stage::BuildBrief, "Building decision brief", 15);
                self.orchestrator.build_brief(request).await?
            }
        };

        let (alternatives, preferences, uncertainties) = self.generate_candidates(&brief, &mut progress).await?;

        progress.emit(Stage::Critique, "Reviewing candidates", 75);
        let critic = self
            .critic
            .review(&brief, &alternatives, &preferences, &uncertainties, CANDIDATE_ITERATION)
            .await?;

        progress.emit(Stage::Synthesize, "Synthesizing output", 90);
        let mut output = self.synthesizer.synthesize(&brief, &critic).await?;
        harden(&mut output, brief, &critic.notes, options.use_questioner, options.answers);

        progress.emit(Stage::Done, "Done", 100);
        info!(
            alternatives = output.alternatives.len(),
            preferences = output.preferences.len(),
            uncertainties = output.uncertainties.len(),
            "Pipeline finished"
        );
        Ok(output)
    }

    async fn generate_candidates(
        &self,
        brief: &DecisionBrief,
        progress: &mut ProgressTracker<'_>,
    ) -> Result<(Vec<Item>, Vec<Item>, Vec<Item>), PipelineError> {
        if self.parallel_candidates {
            debug!("Pipeline::generate_candidates: parallel");
            progress.emit(Stage::GenerateCandidates, "Generating candidates", 30);
            let candidates = tokio::try_join!(
                self.alternatives.run(brief, CANDIDATE_ITERATION),
                self.preferences.run(brief, CANDIDATE_ITERATION),
                self.uncertainties.run(brief, CANDIDATE_ITERATION),
            )?;
            progress.emit(Stage::GenerateCandidates, "Candidates generated", 60);
            return Ok(candidates);
        }

        progress.emit(Stage::GenerateCandidates, "Generating alternatives", 30);
        let alternatives = self.alternatives.run(brief, CANDIDATE_ITERATION).await?;
        progress.emit(Stage::GenerateCandidates, "Generating preferences", 45);
        let preferences = self.preferences.run(brief, CANDIDATE_ITERATION).await?;
        progress.emit(Stage::GenerateCandidates, "Generating uncertainties", 60);
        let uncertainties = self.uncertainties.run(brief, CANDIDATE_ITERATION).await?;
        Ok((alternatives, preferences, uncertainties))
    }
}

/// Overwrite everything in the synthesized output the generator does not own
fn harden(
    output: &mut FinalOutput,
    brief: DecisionBrief,
    critic_notes: &[String],
    use_questioner: bool,
    answers: Option<ClarificationAnswers>,
) {
    if output.decision_title != brief.title || output.brief != brief {
        warn!("Synthesizer altered the brief; restoring it");
    }
    output.decision_title = brief.title.clone();
    output.brief = brief;
    output.stamp();

    let meta = &mut output.meta;
    meta.pending_clarification = false;
    meta.used_questioner = use_questioner || answers.is_some();
    if meta.critic_notes.is_empty() {
        meta.critic_notes = critic_notes.to_vec();
    }
    match answers {
        Some(answers) => {
            meta.request_signature = Some(answers.request_signature);
            meta.clarifying_questions = answers.questions;
            meta.clarification_answers = answers.answers;
        }
        None => {
            meta.request_signature = None;
            meta.clarifying_questions.clear();
            meta.clarification_answers.clear();
        }
    }
}
