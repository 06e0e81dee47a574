//! Outfit model backed by the Anthropic Messages API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::ClaudeConfig;

use super::error::{ApiErrorResponse, ClaudeError, SuggestionError};
use super::{OutfitModel, SuggestionRequest, SuggestionResponse};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

const SYSTEM_PROMPT: &str = "You are a fashion stylist for an online store. \
Given a style prompt and the store's product names, pick products that form an outfit. \
Reply with only a JSON object of the form {\"suggestions\": [\"product name\", ...]} \
using product names exactly as given.";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

/// Claude-backed [`OutfitModel`].
#[derive(Clone)]
pub struct ClaudeOutfitModel {
    inner: Arc<ClaudeClientInner>,
}

struct ClaudeClientInner {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl ClaudeOutfitModel {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `ClaudeError::Config` if the API key is not a valid header
    /// value, or `ClaudeError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ClaudeConfig) -> Result<Self, ClaudeError> {
        Self::with_endpoint(config, ANTHROPIC_API_URL)
    }

    /// Create a client that talks to `endpoint` instead of the public API.
    ///
    /// # Errors
    ///
    /// See [`ClaudeOutfitModel::new`].
    pub fn with_endpoint(config: &ClaudeConfig, endpoint: &str) -> Result<Self, ClaudeError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(config.api_key.expose_secret())
                .map_err(|e| ClaudeError::Config(e.to_string()))?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(ClaudeClientInner {
                client,
                endpoint: endpoint.to_owned(),
                model: config.model.clone(),
            }),
        })
    }

    async fn handle_error_status(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> ClaudeError {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return ClaudeError::RateLimited(retry_after);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return ClaudeError::Unauthorized("Invalid API key".to_string());
        }

        match response.text().await {
            Ok(body) => serde_json::from_str::<ApiErrorResponse>(&body).map_or_else(
                |_| ClaudeError::Api {
                    error_type: "unknown".to_string(),
                    message: body.clone(),
                },
                |api_error| ClaudeError::Api {
                    error_type: api_error.error.error_type,
                    message: api_error.error.message,
                },
            ),
            Err(e) => ClaudeError::Http(e),
        }
    }
}

#[async_trait]
impl OutfitModel for ClaudeOutfitModel {
    #[instrument(skip(self, request), fields(model = %self.inner.model))]
    async fn suggest(
        &self,
        request: &SuggestionRequest,
    ) -> Result<SuggestionResponse, SuggestionError> {
        let content = serde_json::to_string(request)
            .map_err(|e| ClaudeError::Parse(format!("Failed to encode request: {e}")))?;

        let body = MessagesRequest {
            model: &self.inner.model,
            max_tokens: DEFAULT_MAX_TOKENS,
            system: SYSTEM_PROMPT,
            messages: vec![Message {
                role: "user",
                content,
            }],
        };

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(ClaudeError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_status(status, response).await.into());
        }

        let text = response.text().await.map_err(ClaudeError::from)?;
        let parsed: MessagesResponse = serde_json::from_str(&text)
            .map_err(|e| ClaudeError::Parse(format!("Failed to parse response: {e}")))?;

        let reply: String = parsed
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect();

        parse_suggestions(&reply)
    }
}

/// Validate the model's reply against `{"suggestions": [string]}`.
///
/// Text around the outermost JSON object (such as a Markdown code fence) is
/// ignored.
pub(crate) fn parse_suggestions(reply: &str) -> Result<SuggestionResponse, SuggestionError> {
    let json = match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if start < end => reply.get(start..=end).unwrap_or(reply),
        _ => {
            return Err(SuggestionError::InvalidResponse(
                "reply contains no JSON object".to_string(),
            ));
        }
    };

    serde_json::from_str(json).map_err(|e| SuggestionError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let response = parse_suggestions(r#"{"suggestions": ["Linen Shirt", "Chinos"]}"#)
            .expect("valid reply");
        assert_eq!(response.suggestions, vec!["Linen Shirt", "Chinos"]);
    }

    #[test]
    fn test_parse_fenced_json() {
        let reply = "```json\n{\"suggestions\": [\"Linen Shirt\"]}\n```";
        let response = parse_suggestions(reply).expect("valid reply");
        assert_eq!(response.suggestions, vec!["Linen Shirt"]);
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        assert!(matches!(
            parse_suggestions(r#"{"suggestions": "Linen Shirt"}"#),
            Err(SuggestionError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_suggestions(r#"{"items": []}"#),
            Err(SuggestionError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_suggestions("I suggest the linen shirt"),
            Err(SuggestionError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_content_block_ignores_unknown_types() {
        let json = r#"{"content": [{"type": "thinking", "thinking": "..."}, {"type": "text", "text": "{}"}]}"#;
        let parsed: MessagesResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(parsed.content.len(), 2);
        assert!(matches!(parsed.content[0], ContentBlock::Other));
    }

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<ClaudeOutfitModel>();
    }
}
