//! FinalOutput - the terminal artifact of a pipeline run

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::brief::DecisionBrief;
use super::item::{Item, ItemKind, check_items};
use super::question::{ClarificationAnswer, ClarifyingQuestion};
use crate::validation::StructuredOutput;

/// Run metadata; closed so the generator cannot add fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct Meta {
    pub mvp: bool,
    pub synthesis_summary: Option<String>,
    pub critic_notes: Vec<String>,
    pub used_questioner: bool,
    pub pending_clarification: bool,
    pub clarifying_questions: Vec<ClarifyingQuestion>,
    pub clarification_answers: Vec<ClarificationAnswer>,
    /// Signature of the request the questions were generated for
    pub request_signature: Option<String>,
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            mvp: true,
            synthesis_summary: None,
            critic_notes: Vec::new(),
            used_questioner: false,
            pending_clarification: false,
            clarifying_questions: Vec::new(),
            clarification_answers: Vec::new(),
            request_signature: None,
        }
    }
}

/// The decision brief plus the cleaned candidate buckets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FinalOutput {
    pub decision_title: String,
    pub brief: DecisionBrief,
    pub alternatives: Vec<Item>,
    #[serde(default)]
    pub preferences: Vec<Item>,
    #[serde(default)]
    pub uncertainties: Vec<Item>,
    #[serde(default)]
    pub meta: Meta,
}

impl FinalOutput {
    /// Stub returned while the run waits for clarification answers
    pub fn pending(brief: DecisionBrief, questions: Vec<ClarifyingQuestion>, request_signature: String) -> Self {
        Self {
            decision_title: brief.title.clone(),
            brief,
            alternatives: Vec::new(),
            preferences: Vec::new(),
            uncertainties: Vec::new(),
            meta: Meta {
                used_questioner: true,
                pending_clarification: true,
                clarifying_questions: questions,
                request_signature: Some(request_signature),
                ..Meta::default()
            },
        }
    }

    pub fn is_pending(&self) -> bool {
        self.meta.pending_clarification
    }

    /// Force each bucket's item types to match the bucket
    pub fn stamp(&mut self) {
        ItemKind::Alternative.stamp(&mut self.alternatives);
        ItemKind::Preference.stamp(&mut self.preferences);
        ItemKind::Uncertainty.stamp(&mut self.uncertainties);
    }
}

impl StructuredOutput for FinalOutput {
    const NAME: &'static str = "FinalOutput";

    fn check(&self) -> Result<(), String> {
        check_items("alternatives", &self.alternatives)?;
        check_items("preferences", &self.preferences)?;
        check_items("uncertainties", &self.uncertainties)?;

        // Only the coordinator builds pending stubs; a synthesized one is never valid
        if self.meta.pending_clarification {
            return Err("meta.pending_clarification must be false in synthesized output".to_string());
        }
        if self.alternatives.is_empty() {
            return Err("alternatives must not be empty".to_string());
        }
        Ok(())
    }
}
