use std::error::Error as StdError;
use std::fmt;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::api::{GenerateContentRequest, GenerateContentResponse};
use crate::utils::url::generate_content_url;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Why a completion call produced no usable response.
#[derive(Debug)]
pub enum CompletionError {
    /// The request never completed (connect, TLS, body read).
    Transport(reqwest::Error),
    /// The server answered with a non-2xx status.
    Status { status: StatusCode, message: String },
    /// The body was not a JSON object of the expected shape.
    Decode(serde_json::Error),
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::Transport(err) => write!(f, "request failed: {err}"),
            CompletionError::Status { status, message } if message.is_empty() => {
                write!(f, "API returned {status}")
            }
            CompletionError::Status { status, message } => {
                write!(f, "API returned {status}: {message}")
            }
            CompletionError::Decode(err) => write!(f, "malformed response: {err}"),
        }
    }
}

impl StdError for CompletionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            CompletionError::Transport(err) => Some(err),
            CompletionError::Status { .. } => None,
            CompletionError::Decode(err) => Some(err),
        }
    }
}

/// The remote completion call. `Ok(None)` means the service answered but
/// offered no reply text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<Option<String>, CompletionError>;
}

#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> String {
        generate_content_url(&self.base_url, &self.model)
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<Option<String>, CompletionError> {
        let request = GenerateContentRequest::from_prompt(prompt);
        let endpoint = self.endpoint();
        debug!(%endpoint, chars = prompt.len(), "sending completion request");

        let response = self
            .client
            .post(&endpoint)
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(CompletionError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(CompletionError::Transport)?;

        if !status.is_success() {
            return Err(CompletionError::Status {
                status,
                message: summarize_error_body(&body),
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(CompletionError::Decode)?;
        let reply = parsed.reply_text();
        debug!(%status, has_reply = reply.is_some(), "completion response received");
        Ok(reply)
    }
}

/// One-line summary of an error body: the `error.message` field when the
/// body is JSON, otherwise the body with whitespace collapsed.
fn summarize_error_body(body: &str) -> String {
    let summary = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
                .or_else(|| {
                    value
                        .get("error")
                        .and_then(|v| v.as_str().map(str::to_owned))
                })
        })
        .unwrap_or_else(|| body.to_string());

    summary.split_whitespace().collect::<Vec<_>>().join(" ")
}
