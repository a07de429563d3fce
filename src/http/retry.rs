//! Retry policy and HTTP status classification.

use std::time::Duration;

use reqwest::StatusCode;

/// Default number of attempts for a single request.
pub const MAX_RETRIES: usize = 3;

/// Default delay between attempts in milliseconds.
pub const RETRY_DELAY_MS: u64 = 1000;

/// How often and how patiently a request is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRIES,
            delay: Duration::from_millis(RETRY_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }
}

/// Errors that should not be retried.
#[derive(Debug)]
pub enum NonRetryableError {
    /// Rate limit exceeded (HTTP 403 with rate limit message)
    RateLimitExceeded(String),
    /// Authentication failed (HTTP 401)
    AuthenticationFailed(String),
    /// Resource not found (HTTP 404)
    NotFound(String),
    /// Forbidden access (HTTP 403 non-rate-limit)
    Forbidden(String),
    /// Other client errors that won't succeed on retry
    ClientError(String),
}

impl std::fmt::Display for NonRetryableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NonRetryableError::RateLimitExceeded(msg) => {
                write!(f, "Rate limit exceeded: {}. Try again later.", msg)
            }
            NonRetryableError::AuthenticationFailed(msg) => {
                write!(f, "Authentication failed: {}. Check the token.", msg)
            }
            NonRetryableError::NotFound(msg) => {
                write!(f, "Not found: {}", msg)
            }
            NonRetryableError::Forbidden(msg) => {
                write!(
                    f,
                    "Access forbidden: {}. The token may lack the required permissions.",
                    msg
                )
            }
            NonRetryableError::ClientError(msg) => {
                write!(f, "Request error: {}", msg)
            }
        }
    }
}

impl std::error::Error for NonRetryableError {}

/// Classifies a failed response by status code and body.
/// Returns `None` when the failure is worth retrying (429, 5xx and anything unexpected).
pub fn classify_status(status: StatusCode, body: &str) -> Option<NonRetryableError> {
    let detail = describe(status, body);
    match status {
        StatusCode::UNAUTHORIZED => Some(NonRetryableError::AuthenticationFailed(detail)),
        StatusCode::FORBIDDEN => {
            if body.to_lowercase().contains("rate limit") {
                Some(NonRetryableError::RateLimitExceeded(detail))
            } else {
                Some(NonRetryableError::Forbidden(detail))
            }
        }
        // Secondary rate limits clear after a pause
        StatusCode::TOO_MANY_REQUESTS => None,
        StatusCode::NOT_FOUND => Some(NonRetryableError::NotFound(detail)),
        // Other 4xx client errors are generally not retryable
        s if s.is_client_error() => Some(NonRetryableError::ClientError(detail)),
        _ => None,
    }
}

/// Turns a failed status into an error, non-retryable where the status says so.
pub fn status_error(status: StatusCode, body: &str) -> anyhow::Error {
    match classify_status(status, body) {
        Some(non_retryable) => anyhow::Error::from(non_retryable),
        None => anyhow::anyhow!(describe(status, body)),
    }
}

/// Returns true if the error chain carries an HTTP 404.
pub fn is_not_found(e: &anyhow::Error) -> bool {
    e.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<NonRetryableError>(),
            Some(NonRetryableError::NotFound(_))
        )
    })
}

/// Checks if an error is worth another attempt.
pub(crate) fn is_retryable_error(e: &anyhow::Error) -> bool {
    !e.chain().any(|cause| cause.is::<NonRetryableError>())
}

fn describe(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("HTTP {}: {}", status.as_u16(), body)
    }
}
