//! LLM error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to a text-generation backend
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The backend answered but carried no usable payload
    #[error("no output: backend returned an empty response")]
    EmptyResponse,

    #[error("API key not found. Set the {0} environment variable.")]
    MissingApiKey(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported: {0}")]
    Unsupported(String),
}

/// Longest server-requested wait honored before giving up on a rate limit
pub const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(10);

/// Initial backoff delay for transient failures
const INITIAL_BACKOFF_MS: u64 = 1000;

impl LlmError {
    /// Map a transport failure, keeping timeouts distinct from other network errors
    pub fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(timeout)
        } else {
            LlmError::Network(err)
        }
    }

    /// Check if this error is retryable at the transport level
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } => true,
            LlmError::ApiError { status, .. } => *status == 408 || *status >= 500,
            LlmError::Network(_) => true,
            LlmError::Timeout(_) => true,
            LlmError::InvalidResponse(_) => false,
            LlmError::EmptyResponse => false,
            LlmError::MissingApiKey(_) => false,
            LlmError::Json(_) => false,
            LlmError::Unsupported(_) => false,
        }
    }

    /// Get the retry duration if this is a rate limit error
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }

    /// Delay before retry number `attempt` (1-based), or None to give up
    ///
    /// Rate limits wait the server-requested time unless it exceeds
    /// `MAX_RATE_LIMIT_WAIT`; other transient errors back off exponentially.
    pub fn backoff(&self, attempt: u32) -> Option<Duration> {
        if !self.is_retryable() {
            return None;
        }
        match self.retry_after() {
            Some(wait) if wait > MAX_RATE_LIMIT_WAIT => None,
            Some(wait) => Some(wait),
            None => Some(Duration::from_millis(INITIAL_BACKOFF_MS * 2u64.pow(attempt.saturating_sub(1)))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(
            LlmError::ApiError {
                status: 503,
                message: "Unavailable".to_string()
            }
            .is_retryable()
        );

        // 4xx errors should not be retryable
        assert!(
            !LlmError::ApiError {
                status: 400,
                message: "Bad request".to_string()
            }
            .is_retryable()
        );

        assert!(
            LlmError::ApiError {
                status: 408,
                message: "Request timeout".to_string()
            }
            .is_retryable()
        );

        assert!(LlmError::Timeout(Duration::from_secs(30)).is_retryable());

        // Empty output is handled by the validation budget, not the transport
        assert!(!LlmError::EmptyResponse.is_retryable());
        assert!(!LlmError::MissingApiKey("OPENAI_API_KEY".to_string()).is_retryable());
    }

    #[test]
    fn test_retry_after() {
        let err = LlmError::RateLimited {
            retry_after: Duration::from_secs(42),
        };
        assert_eq!(err.retry_after(), Some(Duration::from_secs(42)));
        assert_eq!(LlmError::EmptyResponse.retry_after(), None);
    }

    #[test]
    fn test_backoff_schedule() {
        let server = LlmError::ApiError {
            status: 502,
            message: "Bad gateway".to_string(),
        };
        assert_eq!(server.backoff(1), Some(Duration::from_millis(1000)));
        assert_eq!(server.backoff(2), Some(Duration::from_millis(2000)));
        assert_eq!(server.backoff(3), Some(Duration::from_millis(4000)));

        let short = LlmError::RateLimited {
            retry_after: Duration::from_secs(3),
        };
        assert_eq!(short.backoff(1), Some(Duration::from_secs(3)));

        let long = LlmError::RateLimited {
            retry_after: Duration::from_secs(60),
        };
        assert_eq!(long.backoff(1), None);

        let bad_request = LlmError::ApiError {
            status: 400,
            message: "Bad request".to_string(),
        };
        assert_eq!(bad_request.backoff(1), None);
        assert_eq!(LlmError::EmptyResponse.backoff(1), None);
    }

    #[tokio::test]
    async fn test_transport_timeout_maps_to_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold the connection without answering
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let timeout = Duration::from_millis(50);
        let http = reqwest::Client::builder().timeout(timeout).build().unwrap();
        let err = http.get(format!("http://{}/", addr)).send().await.unwrap_err();

        let mapped = LlmError::from_transport(err, timeout);
        assert!(matches!(mapped, LlmError::Timeout(t) if t == timeout));
        assert!(mapped.is_retryable());
        server.abort();
    }

    #[test]
    fn test_empty_response_message_mentions_no_output() {
        assert!(LlmError::EmptyResponse.to_string().contains("no output"));
    }
}
