//! Clarification binding
//!
//! A pending run and its later resume are two independent invocations. The
//! answers carry the signature of the request and the exact question set they
//! were collected for, and the coordinator checks both before resuming.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use tracing::debug;

use crate::domain::{ClarificationAnswer, ClarifyingQuestion, DecisionRequest, FinalOutput};
use crate::error::PipelineError;

/// Lowercase hex SHA-256 of the trimmed title and narrative
pub fn request_signature(request: &DecisionRequest) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request.title.trim().as_bytes());
    hasher.update(b"\n");
    hasher.update(request.narrative.trim().as_bytes());
    hex::encode(hasher.finalize())
}

/// Answers bound to the request and question set that produced them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarificationAnswers {
    pub request_signature: String,
    pub questions: Vec<ClarifyingQuestion>,
    pub answers: Vec<ClarificationAnswer>,
}

impl ClarificationAnswers {
    /// Check the answers belong to `request` and to the bound question set
    pub fn verify(&self, request: &DecisionRequest) -> Result<(), PipelineError> {
        debug!(answer_count = self.answers.len(), "ClarificationAnswers::verify: called");
        let expected = request_signature(request);
        if expected != self.request_signature {
            debug!("ClarificationAnswers::verify: signature mismatch");
            return Err(PipelineError::StaleClarification {
                expected,
                actual: self.request_signature.clone(),
            });
        }

        if self.answers.is_empty() {
            return Err(PipelineError::InvalidInput("no clarification answers supplied".to_string()));
        }

        let known: HashSet<&str> = self.questions.iter().map(|q| q.id()).collect();
        let mut answered = HashSet::new();
        for answer in &self.answers {
            if !known.contains(answer.question_id.as_str()) {
                return Err(PipelineError::InvalidInput(format!(
                    "answer for unknown question id {}",
                    answer.question_id
                )));
            }
            if answer.answer.trim().is_empty() {
                return Err(PipelineError::InvalidInput(format!(
                    "answer for question {} is empty",
                    answer.question_id
                )));
            }
            if !answered.insert(answer.question_id.as_str()) {
                return Err(PipelineError::InvalidInput(format!(
                    "question {} answered more than once",
                    answer.question_id
                )));
            }
        }
        Ok(())
    }

    /// Question/answer pairs in answer order, for the brief builder
    pub fn pairs(&self) -> Vec<serde_json::Value> {
        self.answers
            .iter()
            .map(|a| {
                let question = self
                    .questions
                    .iter()
                    .find(|q| q.id() == a.question_id)
                    .map(|q| q.question())
                    .unwrap_or_default();
                serde_json::json!({
                    "question_id": a.question_id,
                    "question": question,
                    "answer": a.answer.trim(),
                })
            })
            .collect()
    }
}

/// Serializable "awaiting input" state between the two invocations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingClarification {
    pub request: DecisionRequest,
    pub request_signature: String,
    pub questions: Vec<ClarifyingQuestion>,
}

impl PendingClarification {
    /// Capture the pending state from a stub output
    pub fn from_stub(request: &DecisionRequest, output: &FinalOutput) -> Result<Self, PipelineError> {
        debug!("PendingClarification::from_stub: called");
        if !output.is_pending() {
            return Err(PipelineError::InvalidInput(
                "output is not awaiting clarification".to_string(),
            ));
        }
        let request_signature = output
            .meta
            .request_signature
            .clone()
            .unwrap_or_else(|| request_signature(request));
        Ok(Self {
            request: request.clone(),
            request_signature,
            questions: output.meta.clarifying_questions.clone(),
        })
    }

    /// True when the stored request still matches its signature
    pub fn is_current(&self) -> bool {
        request_signature(&self.request) == self.request_signature
    }

    /// Bind collected answers to this pending state
    pub fn answer(&self, answers: Vec<ClarificationAnswer>) -> ClarificationAnswers {
        ClarificationAnswers {
            request_signature: self.request_signature.clone(),
            questions: self.questions.clone(),
            answers,
        }
    }

    /// Ask every question through `ask` until at least one gets a reply
    ///
    /// A blank reply skips a question. When a whole round is skipped,
    /// `on_all_skipped` runs and the questions are asked again.
    pub fn collect<E>(
        &self,
        mut ask: impl FnMut(&ClarifyingQuestion) -> Result<String, E>,
        mut on_all_skipped: impl FnMut(),
    ) -> Result<Vec<ClarificationAnswer>, E> {
        debug!(questions = self.questions.len(), "PendingClarification::collect: called");
        if self.questions.is_empty() {
            return Ok(Vec::new());
        }
        loop {
            let mut answers = Vec::new();
            for question in &self.questions {
                let reply = ask(question)?;
                let reply = reply.trim();
                if !reply.is_empty() {
                    answers.push(parse_reply(question, reply));
                }
            }
            if !answers.is_empty() {
                return Ok(answers);
            }
            on_all_skipped();
        }
    }
}

/// Map numeric picks like "1, 3" to option text; anything else is taken verbatim
fn parse_reply(question: &ClarifyingQuestion, reply: &str) -> ClarificationAnswer {
    let options = question.options();
    let picks: Option<Vec<String>> = reply
        .split(',')
        .map(|p| {
            p.trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| options.get(i).cloned())
        })
        .collect();

    match picks {
        Some(picks) if !picks.is_empty() => ClarificationAnswer::from_choices(question.id(), &picks),
        _ => ClarificationAnswer::new(question.id(), reply),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnswerType, DecisionBrief, DecisionContext, QuestionCategory};

    fn request() -> DecisionRequest {
        DecisionRequest::new("Travel laptop", "Need something light under $1500").unwrap()
    }

    fn questions() -> Vec<ClarifyingQuestion> {
        vec![
            ClarifyingQuestion::new(
                "os",
                QuestionCategory::SoftPreference,
                "Which OS do you need?",
                AnswerType::Choice,
                vec!["macOS".into(), "Windows".into()],
            )
            .unwrap(),
            ClarifyingQuestion::new(
                "weight",
                QuestionCategory::HardConstraint,
                "What is the maximum weight?",
                AnswerType::Number,
                vec![],
            )
            .unwrap(),
        ]
    }

    fn pending() -> PendingClarification {
        let brief = DecisionBrief {
            title: "Travel laptop".to_string(),
            summary: "Pick a laptop.".to_string(),
            hard_constraints: vec![],
            soft_preferences: vec![],
            context: DecisionContext::default(),
        };
        let req = request();
        let stub = FinalOutput::pending(brief, questions(), request_signature(&req));
        PendingClarification::from_stub(&req, &stub).unwrap()
    }

    #[test]
    fn test_signature_ignores_surrounding_whitespace() {
        let a = request();
        let b = DecisionRequest {
            title: "  Travel laptop ".to_string(),
            narrative: "Need something light under $1500\n".to_string(),
        };
        assert_eq!(request_signature(&a), request_signature(&b));
        assert_eq!(request_signature(&a).len(), 64);
        assert!(request_signature(&a).chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_signature_separates_fields() {
        let a = DecisionRequest::new("ab", "c").unwrap();
        let b = DecisionRequest::new("a", "bc").unwrap();
        assert_ne!(request_signature(&a), request_signature(&b));
    }

    #[test]
    fn test_verify_accepts_bound_answers() {
        let answers = pending().answer(vec![ClarificationAnswer::new("os", "macOS")]);
        assert!(answers.verify(&request()).is_ok());
    }

    #[test]
    fn test_verify_rejects_changed_request() {
        let answers = pending().answer(vec![ClarificationAnswer::new("os", "macOS")]);
        let changed = DecisionRequest::new("Travel laptop", "Budget is now $2000").unwrap();
        assert!(matches!(
            answers.verify(&changed),
            Err(PipelineError::StaleClarification { .. })
        ));
    }

    #[test]
    fn test_verify_rejects_bad_answers() {
        let p = pending();
        assert!(matches!(p.answer(vec![]).verify(&request()), Err(PipelineError::InvalidInput(_))));

        let unknown = p.answer(vec![ClarificationAnswer::new("color", "red")]);
        assert!(unknown.verify(&request()).unwrap_err().to_string().contains("unknown question id color"));

        let blank = p.answer(vec![ClarificationAnswer::new("os", "  ")]);
        assert!(blank.verify(&request()).is_err());

        let twice = p.answer(vec![
            ClarificationAnswer::new("os", "macOS"),
            ClarificationAnswer::new("os", "Linux"),
        ]);
        assert!(twice.verify(&request()).is_err());
    }

    #[test]
    fn test_pairs_include_question_text() {
        let answers = pending().answer(vec![ClarificationAnswer::new("weight", " 1.3 kg ")]);
        let pairs = answers.pairs();
        assert_eq!(pairs[0]["question"], "What is the maximum weight?");
        assert_eq!(pairs[0]["answer"], "1.3 kg");
    }

    #[test]
    fn test_pending_detects_tampered_request() {
        let mut p = pending();
        assert!(p.is_current());
        p.request.narrative = "something else".to_string();
        assert!(!p.is_current());
    }

    #[test]
    fn test_collect_asks_again_when_everything_is_skipped() {
        let p = pending();
        let mut replies = vec!["", " ", "", "7.5 lbs"].into_iter();
        let mut asked = Vec::new();
        let mut skipped_rounds = 0;

        let answers = p
            .collect(
                |q| {
                    asked.push(q.id().to_string());
                    Ok::<_, String>(replies.next().unwrap_or_default().to_string())
                },
                || skipped_rounds += 1,
            )
            .unwrap();

        assert_eq!(skipped_rounds, 1);
        assert_eq!(asked, vec!["os", "weight", "os", "weight"]);
        assert_eq!(answers, vec![ClarificationAnswer::new("weight", "7.5 lbs")]);
        assert!(p.answer(answers).verify(&request()).is_ok());
    }

    #[test]
    fn test_collect_maps_option_numbers() {
        let p = pending();
        let mut replies = vec!["2", "1, 9"].into_iter();
        let answers = p
            .collect(|_| Ok::<_, String>(replies.next().unwrap_or_default().to_string()), || {})
            .unwrap();

        assert_eq!(
            answers,
            vec![
                ClarificationAnswer::new("os", "Windows"),
                ClarificationAnswer::new("weight", "1, 9"),
            ]
        );
    }

    #[test]
    fn test_collect_stops_on_reader_error() {
        let p = pending();
        let result = p.collect(|_| Err("Cancelled".to_string()), || panic!("no round completed"));
        assert_eq!(result.unwrap_err(), "Cancelled");
    }

    #[test]
    fn test_pending_round_trips_through_json() {
        let p = pending();
        let json = serde_json::to_string(&p).unwrap();
        let back: PendingClarification = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
