//! Upstream error taxonomy.
//!
//! Every fallible operation on the lookup path returns a [`LookupResult`].
//! Errors are built once at the failure site and handed to the caller
//! unchanged; nothing on this path panics or unwinds across the boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for all upstream lookups.
pub type LookupResult<T> = Result<T, UpstreamError>;

/// Closed set of failure kinds produced by the lookup path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Guest activation answered with a non-success status.
    GuestActivationFailed,
    /// Guest activation failed below HTTP (DNS, TLS, reset, bad body).
    GuestActivationError,
    /// The envelope carried no post.
    NotFound,
    /// The post is tombstoned or withheld.
    Restricted,
    /// The lookup answered with a non-success status.
    FetchFailed,
    /// The lookup failed below HTTP.
    FetchError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GuestActivationFailed => "GUEST_ACTIVATION_FAILED",
            Self::GuestActivationError => "GUEST_ACTIVATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Restricted => "RESTRICTED",
            Self::FetchFailed => "FETCH_FAILED",
            Self::FetchError => "FETCH_ERROR",
        }
    }

    /// Whether the failure happened while obtaining a guest credential.
    pub fn is_activation(&self) -> bool {
        matches!(self, Self::GuestActivationFailed | Self::GuestActivationError)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully described lookup failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{code}: {message}")]
pub struct UpstreamError {
    pub message: String,
    pub code: ErrorCode,
    /// HTTP status attached to the failure, if there was one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl UpstreamError {
    pub fn new(code: ErrorCode, message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self {
            message: message.into(),
            code,
            status_code,
        }
    }

    pub fn activation_failed(status: reqwest::StatusCode) -> Self {
        Self::new(
            ErrorCode::GuestActivationFailed,
            format!("Failed to activate guest token: {}", status_text(status)),
            Some(status.as_u16()),
        )
    }

    pub fn activation_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::GuestActivationError, message, None)
    }

    pub fn not_found() -> Self {
        Self::new(ErrorCode::NotFound, "Tweet not found", Some(404))
    }

    pub fn restricted(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Restricted, message, Some(451))
    }

    pub fn fetch_failed(status: reqwest::StatusCode, after_retry: bool) -> Self {
        let message = if after_retry {
            format!("Failed to fetch tweet after retry: {}", status_text(status))
        } else {
            format!("Failed to fetch tweet: {}", status_text(status))
        };
        Self::new(ErrorCode::FetchFailed, message, Some(status.as_u16()))
    }

    pub fn fetch_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::FetchError, message, None)
    }
}

/// Reason phrase for a status, falling back to the numeric code.
fn status_text(status: reqwest::StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_u16().to_string())
}
