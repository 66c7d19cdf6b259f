//! Error types for template generation.

use thiserror::Error;

/// Errors that can occur while calling the template service.
#[derive(Debug, Error)]
pub enum TemplateServiceError {
    /// Connection, DNS or TLS failure.
    #[error("HTTP request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// No response within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("Template service returned status {0}")]
    Status(u16),

    /// The response body was not a template.
    #[error("Invalid template payload: {0}")]
    InvalidPayload(String),
}

impl TemplateServiceError {
    /// Whether the failure was a timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

impl From<reqwest::Error> for TemplateServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::InvalidPayload(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Transport(err)
        }
    }
}

impl From<serde_json::Error> for TemplateServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidPayload(err.to_string())
    }
}
