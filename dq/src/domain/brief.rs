//! DecisionBrief and the structured context extracted from a narrative

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::validation::StructuredOutput;

/// Mode marker stamped by the brief builder
pub const ORCHESTRATOR_MODE: &str = "llm_only";

/// Structured fields explicitly mentioned in the narrative
///
/// Absence means "not mentioned", never inferred.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DecisionContext {
    /// Budget cap in US dollars
    #[serde(default)]
    pub budget_usd: Option<f64>,
    /// Weight limit in kilograms
    #[serde(default)]
    pub weight_limit_kg: Option<f64>,
    /// Operating system requirement
    #[serde(default)]
    pub os: Option<String>,
    /// Deadline as stated by the user
    #[serde(default)]
    pub deadline: Option<String>,
    /// Location as stated by the user
    #[serde(default)]
    pub location: Option<String>,
    /// How the brief was produced
    #[serde(default)]
    pub orchestrator_mode: Option<String>,
}

/// Structured restatement of a decision problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DecisionBrief {
    pub title: String,
    /// 1-3 sentence restatement
    pub summary: String,
    /// Non-negotiable requirements, in order
    #[serde(default)]
    pub hard_constraints: Vec<String>,
    /// Negotiable preferences, in order
    #[serde(default)]
    pub soft_preferences: Vec<String>,
    #[serde(default)]
    pub context: DecisionContext,
}

impl DecisionBrief {
    /// Stamp the mode marker; the only mutation a brief sees after creation
    pub fn stamp_mode(&mut self) {
        self.context.orchestrator_mode = Some(ORCHESTRATOR_MODE.to_string());
    }
}

impl StructuredOutput for DecisionBrief {
    const NAME: &'static str = "DecisionBrief";

    fn check(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("brief title must not be empty".to_string());
        }
        if self.summary.trim().is_empty() {
            return Err("brief summary must not be empty".to_string());
        }
        if let Some(budget) = self.context.budget_usd
            && budget < 0.0
        {
            return Err(format!("context.budget_usd must not be negative, got {}", budget));
        }
        Ok(())
    }
}
