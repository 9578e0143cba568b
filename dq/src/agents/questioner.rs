//! Questioner - decides whether to pause for clarifying questions

use tracing::{debug, info};

use super::AgentContext;
use crate::domain::{DecisionRequest, MAX_CLARIFYING_QUESTIONS, QuestionerOutput};
use crate::error::PipelineError;

pub struct QuestionerAgent {
    ctx: AgentContext,
}

impl QuestionerAgent {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }

    /// Ask for prioritized questions; at most eight survive
    pub async fn run(&self, request: &DecisionRequest) -> Result<QuestionerOutput, PipelineError> {
        debug!(title = %request.title, "QuestionerAgent::run: called");
        let vars = serde_json::json!({ "max_questions": MAX_CLARIFYING_QUESTIONS });
        let user = request.payload().to_string();

        let mut out: QuestionerOutput = self.ctx.generate("questioner", &vars, &user).await?;
        out.cap();
        info!(ask = out.ask, questions = out.questions.len(), "Questioner finished");
        Ok(out)
    }
}
