//! GitLab API error types.

use thiserror::Error;

/// Errors returned by [`GitLabApi`][super::GitLabApi] implementations.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The resource does not exist (HTTP 404).
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// The resource already exists (HTTP 409).
    #[error("{resource} already exists")]
    Conflict { resource: String },

    /// The request was rejected as too large (HTTP 413 or 414).
    #[error("request too large (HTTP {status})")]
    TooLarge { status: u16 },

    /// Still rate limited after waiting once (HTTP 429).
    #[error("rate limit exceeded, retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },

    /// Any other non-success status.
    #[error("GitLab API error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    /// No response was received.
    #[error("network error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),

    /// The configured server URL is unusable.
    #[error("invalid server URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

impl ApiError {
    /// Returns true for "does not exist" failures.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true for "already exists" failures.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Returns true for oversized payload failures.
    #[must_use]
    pub fn is_too_large(&self) -> bool {
        matches!(self, Self::TooLarge { .. })
    }
}
