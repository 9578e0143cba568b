//! Candidate agents: alternatives, preferences, uncertainties
//!
//! The three agents share one user payload template and differ in system
//! prompt, target count and bucket. Target counts are hints to the generator.

use tracing::{debug, info};

use super::AgentContext;
use crate::domain::{AlternativesOutput, DecisionBrief, Item, ItemKind, PreferencesOutput, UncertaintiesOutput};
use crate::error::PipelineError;

/// Requested item count range per bucket
fn target_range(kind: ItemKind) -> (u32, u32) {
    match kind {
        ItemKind::Alternative => (5, 8),
        ItemKind::Preference => (5, 10),
        ItemKind::Uncertainty => (5, 10),
    }
}

/// Render the shared candidate payload for one bucket
fn candidate_input(
    ctx: &AgentContext,
    brief: &DecisionBrief,
    iteration: u32,
    kind: ItemKind,
) -> Result<String, PipelineError> {
    let (min, max) = target_range(kind);
    ctx.prompts.render(
        "candidate-input",
        &serde_json::json!({
            "brief": brief,
            "iteration": iteration,
            "min": min,
            "max": max,
            "bucket": kind.bucket(),
        }),
    )
}

/// Generates actionable alternatives
pub struct AlternativesAgent {
    ctx: AgentContext,
}

impl AlternativesAgent {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }

    pub async fn run(&self, brief: &DecisionBrief, iteration: u32) -> Result<Vec<Item>, PipelineError> {
        debug!(iteration, "AlternativesAgent::run: called");
        let user = candidate_input(&self.ctx, brief, iteration, ItemKind::Alternative)?;
        let out: AlternativesOutput = self.ctx.generate("alternatives", &serde_json::json!({}), &user).await?;

        let mut items = out.alternatives;
        ItemKind::Alternative.stamp_with_provenance(&mut items, iteration);
        info!(count = items.len(), "Generated alternatives");
        Ok(items)
    }
}

/// Generates evaluation criteria
pub struct PreferencesAgent {
    ctx: AgentContext,
}

impl PreferencesAgent {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }

    pub async fn run(&self, brief: &DecisionBrief, iteration: u32) -> Result<Vec<Item>, PipelineError> {
        debug!(iteration, "PreferencesAgent::run: called");
        let user = candidate_input(&self.ctx, brief, iteration, ItemKind::Preference)?;
        let out: PreferencesOutput = self.ctx.generate("preferences", &serde_json::json!({}), &user).await?;

        let mut items = out.preferences;
        ItemKind::Preference.stamp_with_provenance(&mut items, iteration);
        info!(count = items.len(), "Generated preferences");
        Ok(items)
    }
}

/// Generates decision-relevant unknowns
pub struct UncertaintiesAgent {
    ctx: AgentContext,
}

impl UncertaintiesAgent {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }

    pub async fn run(&self, brief: &DecisionBrief, iteration: u32) -> Result<Vec<Item>, PipelineError> {
        debug!(iteration, "UncertaintiesAgent::run: called");
        let user = candidate_input(&self.ctx, brief, iteration, ItemKind::Uncertainty)?;
        let out: UncertaintiesOutput = self.ctx.generate("uncertainties", &serde_json::json!({}), &user).await?;

        let mut items = out.uncertainties;
        ItemKind::Uncertainty.stamp_with_provenance(&mut items, iteration);
        info!(count = items.len(), "Generated uncertainties");
        Ok(items)
    }
}
