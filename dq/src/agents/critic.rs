//! Critic - deduplicates and reclassifies candidate items

use tracing::{debug, info};

use super::AgentContext;
use crate::domain::{CriticOutput, DecisionBrief, Item};
use crate::error::PipelineError;

pub struct CriticAgent {
    ctx: AgentContext,
}

impl CriticAgent {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }

    pub async fn review(
        &self,
        brief: &DecisionBrief,
        alternatives: &[Item],
        preferences: &[Item],
        uncertainties: &[Item],
        iteration: u32,
    ) -> Result<CriticOutput, PipelineError> {
        debug!(
            alternatives = alternatives.len(),
            preferences = preferences.len(),
            uncertainties = uncertainties.len(),
            iteration,
            "CriticAgent::review: called"
        );
        let user = serde_json::json!({
            "brief": brief,
            "alternatives": alternatives,
            "preferences": preferences,
            "uncertainties": uncertainties,
            "iteration": iteration,
        })
        .to_string();

        let mut out: CriticOutput = self.ctx.generate("critic", &serde_json::json!({}), &user).await?;
        out.stamp();
        info!(
            alternatives = out.alternatives.len(),
            preferences = out.preferences.len(),
            uncertainties = out.uncertainties.len(),
            notes = out.notes.len(),
            "Critic pass finished"
        );
        Ok(out)
    }
}
