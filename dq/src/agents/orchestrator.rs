//! Orchestrator - turns a request into a DecisionBrief

use tracing::{debug, info};

use super::AgentContext;
use crate::clarify::ClarificationAnswers;
use crate::domain::{DecisionBrief, DecisionRequest};
use crate::error::PipelineError;

/// Brief builder
pub struct Orchestrator {
    ctx: AgentContext,
}

impl Orchestrator {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }

    /// Separate hard constraints from soft preferences and summarize
    pub async fn build_brief(&self, request: &DecisionRequest) -> Result<DecisionBrief, PipelineError> {
        debug!(title = %request.title, "Orchestrator::build_brief: called");
        let user = request.payload().to_string();
        let mut brief: DecisionBrief = self
            .ctx
            .generate("orchestrator", &serde_json::json!({}), &user)
            .await?;
        brief.stamp_mode();
        info!(
            hard = brief.hard_constraints.len(),
            soft = brief.soft_preferences.len(),
            "Built decision brief"
        );
        Ok(brief)
    }

    /// Same as `build_brief`, with collected answers as authoritative context
    pub async fn build_brief_with_clarification(
        &self,
        request: &DecisionRequest,
        answers: &ClarificationAnswers,
    ) -> Result<DecisionBrief, PipelineError> {
        debug!(
            title = %request.title,
            answer_count = answers.answers.len(),
            "Orchestrator::build_brief_with_clarification: called"
        );
        let mut payload = request.payload();
        payload["clarifications"] = serde_json::Value::Array(answers.pairs());
        let user = payload.to_string();

        let mut brief: DecisionBrief = self
            .ctx
            .generate("orchestrator-clarified", &serde_json::json!({}), &user)
            .await?;
        brief.stamp_mode();
        info!(
            hard = brief.hard_constraints.len(),
            soft = brief.soft_preferences.len(),
            "Built decision brief with clarifications"
        );
        Ok(brief)
    }
}
