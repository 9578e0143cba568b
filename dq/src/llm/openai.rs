//! OpenAI API client implementation
//!
//! Implements the LlmClient trait for OpenAI's Chat Completions API. The
//! client also exposes schema-constrained generation through
//! `response_format: json_schema` with strict mode.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{
    CompletionRequest, CompletionResponse, LlmClient, LlmError, ResponseSchema, StopReason, StructuredClient,
    TokenUsage,
};
use crate::config::LlmConfig;

/// Maximum number of retries for transient errors
const MAX_RETRIES: u32 = 3;

/// OpenAI API client
pub struct OpenAIClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    timeout: Duration,
    max_tokens: u32,
    structured_outputs: bool,
}

impl OpenAIClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from the environment variable named in config and
    /// applies the model override env var.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(provider = %config.provider, "OpenAIClient::from_config: called");
        let api_key = config.get_api_key()?;

        let timeout = Duration::from_millis(config.timeout_ms);

        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Network)?;

        Ok(Self {
            model: config.resolved_model(),
            api_key,
            base_url: config.resolved_base_url(),
            http,
            timeout,
            max_tokens: config.max_tokens,
            structured_outputs: config.structured_outputs,
        })
    }

    /// Build the request body for the OpenAI API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(%self.model, %request.max_tokens, "build_request_body: called");

        let mut messages = vec![serde_json::json!({
            "role": "system",
            "content": request.system_prompt,
        })];

        messages.extend(request.messages.iter().map(|msg| {
            serde_json::json!({
                "role": msg.role.as_str(),
                "content": msg.content,
            })
        }));

        let max_tokens = request.max_tokens.min(self.max_tokens);

        // GPT-5.x and o-series models use max_completion_tokens instead of max_tokens
        let uses_completion_tokens =
            self.model.starts_with("gpt-5") || self.model.starts_with("o1") || self.model.starts_with("o3");

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });

        if uses_completion_tokens {
            body["max_completion_tokens"] = serde_json::json!(max_tokens);
        } else {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        body
    }

    /// Attach a strict `json_schema` response format to a request body
    fn with_response_format(mut body: serde_json::Value, schema: &ResponseSchema) -> serde_json::Value {
        debug!(schema = %schema.name, "with_response_format: called");
        body["response_format"] = serde_json::json!({
            "type": "json_schema",
            "json_schema": {
                "name": schema.name,
                "schema": schema.schema,
                "strict": true,
            }
        });
        body
    }

    /// Parse the OpenAI API response
    fn parse_response(&self, api_response: OpenAIResponse) -> Result<CompletionResponse, LlmError> {
        debug!(choice_count = api_response.choices.len(), "parse_response: called");
        let choice = api_response.choices.into_iter().next();

        let (content, stop_reason) = match choice {
            Some(c) => {
                if let Some(refusal) = c.message.refusal {
                    debug!("parse_response: model refused");
                    return Err(LlmError::InvalidResponse(format!("model refused: {}", refusal)));
                }
                let stop_reason = c
                    .finish_reason
                    .as_deref()
                    .map(StopReason::from_openai)
                    .unwrap_or(StopReason::EndTurn);
                (c.message.content, stop_reason)
            }
            None => {
                debug!("parse_response: no choices");
                (None, StopReason::EndTurn)
            }
        };

        let usage = api_response
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            stop_reason,
            usage,
        })
    }

    /// POST a body to the chat completions endpoint, retrying transient failures
    async fn send(&self, body: &serde_json::Value) -> Result<CompletionResponse, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut attempt = 0;
        loop {
            let err = match self.send_once(&url, body).await {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };
            attempt += 1;
            match err.backoff(attempt) {
                Some(delay) if attempt <= MAX_RETRIES => {
                    warn!(attempt, delay_ms = delay.as_millis() as u64, error = %err, "send: retrying after transient error");
                    tokio::time::sleep(delay).await;
                }
                _ => return Err(err),
            }
        }
    }

    /// One HTTP round trip; non-success statuses become typed errors
    async fn send_once(&self, url: &str, body: &serde_json::Value) -> Result<CompletionResponse, LlmError> {
        let response = self
            .http
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::from_transport(e, self.timeout))?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            debug!(retry_after, "send_once: rate limited (429)");
            return Err(LlmError::RateLimited {
                retry_after: Duration::from_secs(retry_after),
            });
        }

        if !response.status().is_success() {
            debug!(%status, "send_once: API error");
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, message: text });
        }

        debug!("send_once: success");
        let api_response: OpenAIResponse = response.json().await?;
        self.parse_response(api_response)
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(%self.model, %request.max_tokens, "complete: called");
        let body = self.build_request_body(&request);
        self.send(&body).await
    }

    fn structured(&self) -> Option<&dyn StructuredClient> {
        if self.structured_outputs { Some(self) } else { None }
    }
}

#[async_trait]
impl StructuredClient for OpenAIClient {
    async fn complete_structured(
        &self,
        request: CompletionRequest,
        schema: &ResponseSchema,
    ) -> Result<serde_json::Value, LlmError> {
        debug!(%self.model, schema = %schema.name, "complete_structured: called");
        let body = Self::with_response_format(self.build_request_body(&request), schema);
        let text = self.send(&body).await?.into_text()?;
        Ok(serde_json::from_str(&text)?)
    }
}

// OpenAI API response types

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Message;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn test_client(model: &str, max_tokens: u32) -> OpenAIClient {
        OpenAIClient {
            model: model.to_string(),
            api_key: "test-key".to_string(),
            base_url: "https://api.openai.com".to_string(),
            http: Client::new(),
            timeout: Duration::from_secs(30),
            max_tokens,
            structured_outputs: true,
        }
    }

    #[test]
    fn test_build_request_body_basic() {
        let client = test_client("gpt-4o", 8192);

        let mut request = CompletionRequest::new("You are helpful", "Hello");
        request.max_tokens = 1000;

        let body = client.build_request_body(&request);

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You are helpful");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Hello");
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_gpt5_uses_max_completion_tokens() {
        let client = test_client("gpt-5-mini", 1000);
        let mut request = CompletionRequest::new("Test", "x");
        request.max_tokens = 5000;
        request.messages.push(Message::user("y"));

        let body = client.build_request_body(&request);
        assert_eq!(body["max_completion_tokens"], 1000);
        assert!(body.get("max_tokens").is_none());
        assert_eq!(body["messages"][2]["role"], "user");
    }

    #[test]
    fn test_response_format_is_strict_json_schema() {
        let client = test_client("gpt-5-mini", 1000);
        let schema = ResponseSchema {
            name: "DecisionBrief".to_string(),
            schema: serde_json::json!({"type": "object", "additionalProperties": false}),
        };
        let body = OpenAIClient::with_response_format(client.build_request_body(&CompletionRequest::new("s", "u")), &schema);

        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["name"], "DecisionBrief");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
    }

    #[test]
    fn test_parse_response_refusal_is_error() {
        let client = test_client("gpt-5-mini", 1000);
        let api: OpenAIResponse = serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"content": null, "refusal": "no"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 1, "completion_tokens": 1}
        }))
        .unwrap();
        assert!(matches!(client.parse_response(api), Err(LlmError::InvalidResponse(_))));
    }

    #[test]
    fn test_parse_response_without_choices_is_empty() {
        let client = test_client("gpt-5-mini", 1000);
        let api: OpenAIResponse = serde_json::from_value(serde_json::json!({"choices": []})).unwrap();
        let response = client.parse_response(api).unwrap();
        assert!(matches!(response.into_text(), Err(LlmError::EmptyResponse)));
    }

    /// Serve one canned HTTP response per connection, counting connections
    async fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                counter.fetch_add(1, Ordering::SeqCst);
                read_request(&mut socket).await;
                let reply = format!(
                    "HTTP/1.1 {} Canned\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(reply.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
        });
        (base_url, hits)
    }

    async fn read_request(socket: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let len = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + len {
                    return;
                }
            }
        }
    }

    const OK_BODY: &str = r#"{"choices":[{"message":{"content":"{\"ok\":true}"},"finish_reason":"stop"}],"usage":{"prompt_tokens":3,"completion_tokens":2}}"#;

    #[tokio::test]
    async fn test_send_retries_server_error() {
        let (base_url, hits) = serve(vec![(503, "{}"), (200, OK_BODY)]).await;
        let mut client = test_client("gpt-5-mini", 1000);
        client.base_url = base_url;

        let response = client.complete(CompletionRequest::new("s", "u")).await.unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(response.usage.total(), 5);
        assert_eq!(response.into_text().unwrap(), r#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn test_send_does_not_retry_client_error() {
        let (base_url, hits) = serve(vec![(400, r#"{"error":"bad"}"#), (200, OK_BODY)]).await;
        let mut client = test_client("gpt-5-mini", 1000);
        client.base_url = base_url;

        let err = client.complete(CompletionRequest::new("s", "u")).await.unwrap_err();

        assert!(matches!(err, LlmError::ApiError { status: 400, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_structured_capability_follows_config() {
        let mut client = test_client("gpt-5-mini", 1000);
        assert!(client.structured().is_some());
        client.structured_outputs = false;
        assert!(client.structured().is_none());
    }
}
