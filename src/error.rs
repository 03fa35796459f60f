//! Unified error type for the Foundation Model API client.
//!
//! Every failure the crate can surface — validation, transport, server,
//! decode — is one variant of [`Error`], so callers need a single match
//! site. Variants carry an HTTP-status-like field, a message, and the
//! request URL where those are known.

use thiserror::Error;

/// Message used when a failed response carries an empty body.
pub const DEFAULT_ERROR_MESSAGE: &str = "Unknown Error";

#[derive(Debug, Error)]
pub enum Error {
    /// The request payload was malformed: unknown field, missing required
    /// field, or a value that could not be coerced. Raised before any
    /// network activity.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// The transport hit its deadline.
    #[error("API request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// The transport could not reach the endpoint.
    #[error("API request failed with connection error: {0}")]
    Connection(String),

    /// The server answered with a non-success status (including a 5xx that
    /// survived the retry budget).
    #[error("API request failed\ncode: {status}\nreason: {message}{}", format_url(.url))]
    Server {
        status: u16,
        message: String,
        url: Option<String>,
    },

    /// The response body (or a stream line) was not valid JSON, or the
    /// payload was missing an expected projection.
    #[error("Failed to decode API response: {message}{}", format_url(.url))]
    Decode {
        url: Option<String>,
        message: String,
    },

    /// The requested mode is not supported for this operation.
    #[error("{0}")]
    Unsupported(String),
}

fn format_url(url: &Option<String>) -> String {
    match url {
        Some(u) => format!("\nurl: {u}"),
        None => String::new(),
    }
}

impl Error {
    /// Build the domain error for a failed HTTP response.
    ///
    /// A raw status of 200 is treated as the retry-exhaustion sentinel and
    /// reported as 500; so is any code without a registered reason phrase
    /// (e.g. 599). An empty body falls back to [`DEFAULT_ERROR_MESSAGE`].
    pub(crate) fn from_response(status: u16, body: &str, url: &str) -> Self {
        let recognized = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .is_some();
        let status = if status == 200 || !recognized {
            tracing::debug!(status, "unmapped status on failure path, reporting 500");
            500
        } else {
            status
        };
        let message = body.trim();
        Error::Server {
            status,
            message: if message.is_empty() {
                DEFAULT_ERROR_MESSAGE.to_string()
            } else {
                message.to_string()
            },
            url: Some(url.to_string()),
        }
    }

    /// HTTP-status-like classification, where one applies.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// URL of the endpoint involved, where one is known.
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Server { url, .. } | Error::Decode { url, .. } => url.as_deref(),
            _ => None,
        }
    }

    /// True for failures detected locally, before any network call.
    pub fn is_local(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Unsupported(_))
    }
}
