//! Clarifying questions and the answers collected for them

use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;
use tracing::debug;

use crate::error::PipelineError;
use crate::validation::StructuredOutput;

/// Maximum number of questions that survive to the caller
pub const MAX_CLARIFYING_QUESTIONS: usize = 8;

/// Minimum question text length, in characters
pub const MIN_QUESTION_TEXT: usize = 5;

/// What part of the brief a question informs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    HardConstraint,
    SoftPreference,
    Uncertainty,
    Context,
}

/// Expected shape of the user's answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnswerType {
    FreeText,
    Number,
    Date,
    Choice,
    MultiChoice,
}

impl AnswerType {
    /// Choice types must offer options
    pub fn needs_options(&self) -> bool {
        matches!(self, AnswerType::Choice | AnswerType::MultiChoice)
    }
}

/// Wire shape of a question, before invariants are checked
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(rename = "ClarifyingQuestion")]
struct QuestionFields {
    #[schemars(length(min = 1))]
    id: String,
    category: QuestionCategory,
    #[schemars(length(min = 5))]
    question: String,
    expected_answer_type: AnswerType,
    /// Required and non-empty for choice and multi_choice
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    rationale: Option<String>,
}

impl QuestionFields {
    fn check(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("question id must not be empty".to_string());
        }
        if self.question.trim().chars().count() < MIN_QUESTION_TEXT {
            return Err(format!(
                "question {} text must be at least {} characters",
                self.id, MIN_QUESTION_TEXT
            ));
        }
        if self.expected_answer_type.needs_options() && self.options.iter().all(|o| o.trim().is_empty()) {
            return Err(format!(
                "question {} expects {:?} but has no options",
                self.id, self.expected_answer_type
            ));
        }
        Ok(())
    }
}

/// A clarifying question; construction enforces its invariants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionFields")]
pub struct ClarifyingQuestion {
    id: String,
    category: QuestionCategory,
    question: String,
    expected_answer_type: AnswerType,
    options: Vec<String>,
    rationale: Option<String>,
}

impl ClarifyingQuestion {
    pub fn new(
        id: impl Into<String>,
        category: QuestionCategory,
        question: impl Into<String>,
        expected_answer_type: AnswerType,
        options: Vec<String>,
    ) -> Result<Self, PipelineError> {
        let fields = QuestionFields {
            id: id.into(),
            category,
            question: question.into(),
            expected_answer_type,
            options,
            rationale: None,
        };
        debug!(id = %fields.id, answer_type = ?expected_answer_type, "ClarifyingQuestion::new: called");
        Self::try_from(fields).map_err(PipelineError::InvalidInput)
    }

    /// Builder: set rationale
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category(&self) -> QuestionCategory {
        self.category
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn expected_answer_type(&self) -> AnswerType {
        self.expected_answer_type
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn rationale(&self) -> Option<&str> {
        self.rationale.as_deref()
    }
}

impl TryFrom<QuestionFields> for ClarifyingQuestion {
    type Error = String;

    fn try_from(fields: QuestionFields) -> Result<Self, Self::Error> {
        fields.check()?;
        Ok(Self {
            id: fields.id.trim().to_string(),
            category: fields.category,
            question: fields.question,
            expected_answer_type: fields.expected_answer_type,
            options: fields.options,
            rationale: fields.rationale,
        })
    }
}

impl JsonSchema for ClarifyingQuestion {
    fn schema_name() -> Cow<'static, str> {
        "ClarifyingQuestion".into()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        QuestionFields::json_schema(generator)
    }
}

/// One answer to a clarifying question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ClarificationAnswer {
    pub question_id: String,
    pub answer: String,
}

impl ClarificationAnswer {
    pub fn new(question_id: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            answer: answer.into(),
        }
    }

    /// Flatten a multi-choice selection into one delimited answer
    pub fn from_choices(question_id: impl Into<String>, choices: &[String]) -> Self {
        let answer = choices
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        Self::new(question_id, answer)
    }
}

/// Questioner agent output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionerOutput {
    /// Whether the pipeline should pause for answers
    pub ask: bool,
    #[serde(default)]
    pub questions: Vec<ClarifyingQuestion>,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl QuestionerOutput {
    /// Drop questions past the cap, keeping generation order
    pub fn cap(&mut self) {
        if self.questions.len() > MAX_CLARIFYING_QUESTIONS {
            debug!(
                count = self.questions.len(),
                cap = MAX_CLARIFYING_QUESTIONS,
                "QuestionerOutput::cap: truncating"
            );
            self.questions.truncate(MAX_CLARIFYING_QUESTIONS);
        }
    }

    /// True when the pipeline must pause for answers
    pub fn wants_answers(&self) -> bool {
        self.ask && !self.questions.is_empty()
    }
}

impl StructuredOutput for QuestionerOutput {
    const NAME: &'static str = "QuestionerOutput";

    fn check(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for q in &self.questions {
            if !seen.insert(q.id()) {
                return Err(format!("duplicate question id {}", q.id()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str) -> ClarifyingQuestion {
        ClarifyingQuestion::new(
            id,
            QuestionCategory::HardConstraint,
            "What is your budget?",
            AnswerType::Number,
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_choice_without_options_rejected() {
        let result = ClarifyingQuestion::new(
            "q1",
            QuestionCategory::SoftPreference,
            "Which OS do you prefer?",
            AnswerType::Choice,
            vec![],
        );
        assert!(matches!(result, Err(PipelineError::InvalidInput(_))));

        let result = ClarifyingQuestion::new(
            "q1",
            QuestionCategory::SoftPreference,
            "Which OS do you prefer?",
            AnswerType::MultiChoice,
            vec!["macOS".to_string(), "Linux".to_string()],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_deserialize_enforces_invariants() {
        let bad = serde_json::json!({
            "id": "q1",
            "category": "context",
            "question": "Which carrier?",
            "expected_answer_type": "choice",
            "options": []
        });
        let err = serde_json::from_value::<ClarifyingQuestion>(bad).unwrap_err();
        assert!(err.to_string().contains("no options"));

        let short = serde_json::json!({
            "id": "q1",
            "category": "context",
            "question": "Why",
            "expected_answer_type": "free_text"
        });
        assert!(serde_json::from_value::<ClarifyingQuestion>(short).is_err());
    }

    #[test]
    fn test_question_serializes_flat() {
        let q = question("budget").with_rationale("drives every alternative");
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["id"], "budget");
        assert_eq!(json["category"], "hard_constraint");
        assert_eq!(json["expected_answer_type"], "number");
        assert_eq!(json["rationale"], "drives every alternative");
        let back: ClarifyingQuestion = serde_json::from_value(json).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn test_cap_keeps_first_eight() {
        let mut out = QuestionerOutput {
            ask: true,
            questions: (0..12).map(|i| question(&format!("q{}", i))).collect(),
            notes: vec![],
        };
        out.cap();
        assert_eq!(out.questions.len(), MAX_CLARIFYING_QUESTIONS);
        assert_eq!(out.questions[7].id(), "q7");
    }

    #[test]
    fn test_duplicate_ids_fail_check() {
        let out = QuestionerOutput {
            ask: true,
            questions: vec![question("q1"), question("q1")],
            notes: vec![],
        };
        assert!(out.check().unwrap_err().contains("duplicate"));
    }

    #[test]
    fn test_wants_answers() {
        let mut out = QuestionerOutput {
            ask: true,
            questions: vec![],
            notes: vec![],
        };
        assert!(!out.wants_answers());
        out.questions.push(question("q1"));
        assert!(out.wants_answers());
        out.ask = false;
        assert!(!out.wants_answers());
    }

    #[test]
    fn test_from_choices_flattens() {
        let answer = ClarificationAnswer::from_choices("q2", &["USB-C".to_string(), " HDMI ".to_string()]);
        assert_eq!(answer.answer, "USB-C, HDMI");
    }
}
