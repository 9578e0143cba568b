//! DecisionRequest - the caller's input to a pipeline run

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PipelineError;

/// A free-text decision problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub title: String,
    pub narrative: String,
}

impl DecisionRequest {
    /// Create a request with trimmed fields, rejecting blank input
    pub fn new(title: impl Into<String>, narrative: impl Into<String>) -> Result<Self, PipelineError> {
        let request = Self {
            title: title.into().trim().to_string(),
            narrative: narrative.into().trim().to_string(),
        };
        debug!(title = %request.title, narrative_len = request.narrative.len(), "DecisionRequest::new: called");
        request.validate()?;
        Ok(request)
    }

    /// Both fields must be non-empty after trimming
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.title.trim().is_empty() {
            debug!("DecisionRequest::validate: empty title");
            return Err(PipelineError::InvalidInput("title must not be empty".to_string()));
        }
        if self.narrative.trim().is_empty() {
            debug!("DecisionRequest::validate: empty narrative");
            return Err(PipelineError::InvalidInput("narrative must not be empty".to_string()));
        }
        Ok(())
    }

    /// Payload sent to the brief builder and the questioner
    pub fn payload(&self) -> serde_json::Value {
        serde_json::json!({
            "title": self.title.trim(),
            "narrative": self.narrative.trim(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_fields() {
        let req = DecisionRequest::new("  Laptop  ", "\nNeed a laptop for travel\n").unwrap();
        assert_eq!(req.title, "Laptop");
        assert_eq!(req.narrative, "Need a laptop for travel");
    }

    #[test]
    fn test_blank_fields_rejected() {
        assert!(matches!(
            DecisionRequest::new("   ", "narrative"),
            Err(PipelineError::InvalidInput(_))
        ));
        assert!(matches!(DecisionRequest::new("title", ""), Err(PipelineError::InvalidInput(_))));
    }

    #[test]
    fn test_validate_catches_hand_built_request() {
        let req = DecisionRequest {
            title: "t".to_string(),
            narrative: " \t ".to_string(),
        };
        assert!(req.validate().is_err());
    }
}
