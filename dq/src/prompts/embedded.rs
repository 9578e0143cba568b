//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

pub const ORCHESTRATOR: &str = include_str!("../../prompts/orchestrator.pmt");

pub const ORCHESTRATOR_CLARIFIED: &str = include_str!("../../prompts/orchestrator-clarified.pmt");

pub const QUESTIONER: &str = include_str!("../../prompts/questioner.pmt");

pub const ALTERNATIVES: &str = include_str!("../../prompts/alternatives.pmt");

pub const PREFERENCES: &str = include_str!("../../prompts/preferences.pmt");

pub const UNCERTAINTIES: &str = include_str!("../../prompts/uncertainties.pmt");

pub const CRITIC: &str = include_str!("../../prompts/critic.pmt");

pub const SYNTHESIZER: &str = include_str!("../../prompts/synthesizer.pmt");

/// Shared user payload for the three candidate agents
pub const CANDIDATE_INPUT: &str = include_str!("../../prompts/candidate-input.pmt");

/// Every embedded template name
pub const NAMES: &[&str] = &[
    "orchestrator",
    "orchestrator-clarified",
    "questioner",
    "alternatives",
    "preferences",
    "uncertainties",
    "critic",
    "synthesizer",
    "candidate-input",
];

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    let template = match name {
        "orchestrator" => ORCHESTRATOR,
        "orchestrator-clarified" => ORCHESTRATOR_CLARIFIED,
        "questioner" => QUESTIONER,
        "alternatives" => ALTERNATIVES,
        "preferences" => PREFERENCES,
        "uncertainties" => UNCERTAINTIES,
        "critic" => CRITIC,
        "synthesizer" => SYNTHESIZER,
        "candidate-input" => CANDIDATE_INPUT,
        _ => {
            debug!("get_embedded: no match found");
            return None;
        }
    };
    Some(template)
}
