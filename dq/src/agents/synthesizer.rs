//! Synthesizer - assembles the final output

use tracing::{debug, info};

use super::AgentContext;
use crate::domain::{CriticOutput, DecisionBrief, FinalOutput};
use crate::error::PipelineError;

pub struct Synthesizer {
    ctx: AgentContext,
}

impl Synthesizer {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }

    /// Assemble the brief and cleaned lists; adds no new facts
    pub async fn synthesize(&self, brief: &DecisionBrief, critic: &CriticOutput) -> Result<FinalOutput, PipelineError> {
        debug!("Synthesizer::synthesize: called");
        let user = serde_json::json!({
            "brief": brief,
            "critic_out": critic,
        })
        .to_string();

        let out: FinalOutput = self.ctx.generate("synthesizer", &serde_json::json!({}), &user).await?;
        info!(alternatives = out.alternatives.len(), "Synthesis finished");
        Ok(out)
    }
}
