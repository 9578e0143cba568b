//! Candidate items and the per-bucket agent outputs

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::validation::StructuredOutput;

/// Minimum item text length, in characters
pub const MIN_ITEM_TEXT: usize = 3;

/// Which candidate bucket an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Alternative,
    Preference,
    Uncertainty,
}

impl ItemKind {
    /// Bucket name, also used as the producing agent's name
    pub fn bucket(&self) -> &'static str {
        match self {
            ItemKind::Alternative => "alternatives",
            ItemKind::Preference => "preferences",
            ItemKind::Uncertainty => "uncertainties",
        }
    }

    /// Force every item's type to this bucket
    pub fn stamp(self, items: &mut [Item]) {
        for item in items.iter_mut() {
            item.kind = self;
        }
    }

    /// Force type and provenance on items produced by this bucket's agent
    pub fn stamp_with_provenance(self, items: &mut [Item], iteration: u32) {
        debug!(kind = %self, count = items.len(), iteration, "ItemKind::stamp_with_provenance: called");
        for item in items.iter_mut() {
            item.kind = self;
            item.provenance.agent = self.bucket().to_string();
            item.provenance.iteration = iteration;
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemKind::Alternative => "alternative",
            ItemKind::Preference => "preference",
            ItemKind::Uncertainty => "uncertainty",
        };
        write!(f, "{}", name)
    }
}

/// Which agent produced an item, and in which round
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Provenance {
    pub agent: String,
    #[serde(default)]
    pub iteration: u32,
}

/// A single candidate statement tagged with its bucket and origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Item {
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[schemars(length(min = 3))]
    pub text: String,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default)]
    pub provenance: Provenance,
}

impl Item {
    pub fn new(kind: ItemKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            rationale: None,
            provenance: Provenance {
                agent: kind.bucket().to_string(),
                iteration: 0,
            },
        }
    }

    /// Builder: set rationale
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }
}

/// Check item text lengths across a list
pub(crate) fn check_items(bucket: &str, items: &[Item]) -> Result<(), String> {
    for (i, item) in items.iter().enumerate() {
        if item.text.trim().chars().count() < MIN_ITEM_TEXT {
            return Err(format!(
                "{}[{}].text must be at least {} characters, got {:?}",
                bucket, i, MIN_ITEM_TEXT, item.text
            ));
        }
    }
    Ok(())
}

/// Alternatives agent output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AlternativesOutput {
    pub alternatives: Vec<Item>,
}

impl StructuredOutput for AlternativesOutput {
    const NAME: &'static str = "AlternativesOutput";

    fn check(&self) -> Result<(), String> {
        check_items("alternatives", &self.alternatives)
    }
}

/// Preferences agent output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PreferencesOutput {
    pub preferences: Vec<Item>,
}

impl StructuredOutput for PreferencesOutput {
    const NAME: &'static str = "PreferencesOutput";

    fn check(&self) -> Result<(), String> {
        check_items("preferences", &self.preferences)
    }
}

/// Uncertainties agent output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UncertaintiesOutput {
    pub uncertainties: Vec<Item>,
}

impl StructuredOutput for UncertaintiesOutput {
    const NAME: &'static str = "UncertaintiesOutput";

    fn check(&self) -> Result<(), String> {
        check_items("uncertainties", &self.uncertainties)
    }
}

/// Cleaned candidate lists from the critic pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CriticOutput {
    pub alternatives: Vec<Item>,
    pub preferences: Vec<Item>,
    pub uncertainties: Vec<Item>,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl CriticOutput {
    /// Force each bucket's item types to match the bucket
    pub fn stamp(&mut self) {
        ItemKind::Alternative.stamp(&mut self.alternatives);
        ItemKind::Preference.stamp(&mut self.preferences);
        ItemKind::Uncertainty.stamp(&mut self.uncertainties);
    }
}

impl StructuredOutput for CriticOutput {
    const NAME: &'static str = "CriticOutput";

    fn check(&self) -> Result<(), String> {
        check_items("alternatives", &self.alternatives)?;
        check_items("preferences", &self.preferences)?;
        check_items("uncertainties", &self.uncertainties)
    }
}
