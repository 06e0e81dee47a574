//! Outfit suggestion error types.

use thiserror::Error;

/// Errors that can occur when asking for outfit suggestions.
#[derive(Debug, Error)]
pub enum SuggestionError {
    /// The style prompt was empty.
    #[error("style prompt is required")]
    EmptyPrompt,

    /// No suggestions model is configured.
    #[error("outfit suggestions are not configured")]
    Unavailable,

    /// None of the suggested items exist in the catalog.
    #[error("no matching products found for this style")]
    NoMatches,

    /// The model's output did not match `{"suggestions": [string]}`.
    #[error("invalid model response: {0}")]
    InvalidResponse(String),

    /// The model call itself failed.
    #[error("model error: {0}")]
    Model(#[from] ClaudeError),
}

/// Errors that can occur when calling the Claude API.
#[derive(Debug, Error)]
pub enum ClaudeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Claude API returned an error.
    #[error("API error ({error_type}): {message}")]
    Api {
        /// Error type from the API.
        error_type: String,
        /// Error message.
        message: String,
    },

    /// Rate limited by the API.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication failed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The client could not be configured.
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// Failed to parse response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// API error response from Claude.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    /// Nested error details.
    pub error: ApiError,
}

/// Nested error details.
#[derive(Debug, serde::Deserialize)]
pub struct ApiError {
    /// Error type.
    #[serde(rename = "type")]
    pub error_type: String,
    /// Error message.
    pub message: String,
}
