//! Schema-validated completion with corrective retries

use serde_json::Value;
use tracing::{debug, warn};

use super::extract::extract_json;
use super::schema::{OutputSchema, StructuredOutput};
use crate::error::PipelineError;
use crate::llm::{CompletionRequest, LlmClient, LlmError};

/// Default number of corrective retries on the text path
pub const DEFAULT_RETRIES: u32 = 2;

/// Marker line that names the expected schema in a system prompt
pub const SCHEMA_MARKER: &str = "OUTPUT_SCHEMA:";

/// Suffix appended to the original user payload after an invalid output
pub fn corrective_suffix(error: &str) -> String {
    format!(
        "\n\nIMPORTANT: Your previous output was invalid. Error: {}. \
         Return JSON ONLY that matches the required schema. No markdown, no commentary.",
        error
    )
}

/// Generate a value of type `T`, guaranteed to conform to its schema
///
/// With a structured-capable client the schema is enforced by the backend and
/// the result is trusted after a single `check()`. Otherwise free-form text is
/// requested, the first JSON span is extracted, validated and deserialized;
/// any failure re-issues the request with a corrective suffix, up to `retries`
/// additional times. The last failure is surfaced when the budget runs out.
pub async fn complete_and_validate<T: StructuredOutput>(
    client: &dyn LlmClient,
    system: &str,
    user: &str,
    retries: u32,
) -> Result<T, PipelineError> {
    let schema = OutputSchema::of::<T>();
    debug!(schema = schema.name, client = client.name(), retries, "complete_and_validate: called");

    if let Some(structured) = client.structured() {
        debug!(schema = schema.name, "complete_and_validate: structured path");
        let request = CompletionRequest::new(system, user);
        let value = structured.complete_structured(request, &schema.strict()).await?;
        return decode::<T>(value).map_err(|message| PipelineError::SchemaValidation {
            schema: T::NAME,
            attempts: 1,
            message,
        });
    }

    let system = format!("{}\n\n{} {}\n{}", system.trim_end(), SCHEMA_MARKER, schema.name, schema.pretty());
    let mut current_user = user.to_string();
    let mut last_error = String::new();
    let attempts = retries + 1;

    for attempt in 1..=attempts {
        if attempt > 1 {
            warn!(schema = schema.name, attempt, error = %last_error, "complete_and_validate: retrying");
        }

        let request = CompletionRequest::new(system.as_str(), current_user.as_str());
        let reply = client.complete(request).await.and_then(|response| {
            debug!(
                schema = schema.name,
                attempt,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                total_tokens = response.usage.total(),
                "complete_and_validate: response received"
            );
            response.into_text()
        });
        match reply {
            Ok(text) => match parse_text::<T>(&schema, &text) {
                Ok(value) => {
                    debug!(schema = schema.name, attempt, "complete_and_validate: valid output");
                    return Ok(value);
                }
                Err(message) => last_error = message,
            },
            Err(LlmError::EmptyResponse) => last_error = LlmError::EmptyResponse.to_string(),
            Err(e) => return Err(e.into()),
        }

        current_user = format!("{}{}", user, corrective_suffix(&last_error));
    }

    Err(PipelineError::SchemaValidation {
        schema: T::NAME,
        attempts,
        message: last_error,
    })
}

/// Extract, validate and decode free-form model output
fn parse_text<T: StructuredOutput>(schema: &OutputSchema, text: &str) -> Result<T, String> {
    let span = extract_json(text).ok_or_else(|| "no JSON object or array found in output".to_string())?;
    let value: Value = serde_json::from_str(span).map_err(|e| format!("invalid JSON: {}", e))?;
    schema.validate(&value)?;
    decode(value)
}

fn decode<T: StructuredOutput>(value: Value) -> Result<T, String> {
    let parsed: T = serde_json::from_value(value).map_err(|e| e.to_string())?;
    parsed.check()?;
    Ok(parsed)
}
