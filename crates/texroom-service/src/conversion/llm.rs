//! OpenAI-compatible chat-completions client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use texroom_core::config::conversion::ConversionConfig;
use texroom_core::error::{AppError, ErrorKind};
use texroom_core::result::AppResult;

use super::Converter;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Sends the configured prompt plus the text as a single user message and
/// returns the first choice's content.
#[derive(Debug, Clone)]
pub struct LlmConverter {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    prompt: String,
}

impl LlmConverter {
    /// Creates a client from configuration.
    pub fn new(config: &ConversionConfig) -> AppResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                "Failed to build conversion HTTP client",
                e,
            )
        })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            prompt: config.prompt.clone(),
        })
    }

    fn message_for(&self, text: &str) -> String {
        format!("{}\n{}", self.prompt, text)
    }
}

#[async_trait]
impl Converter for LlmConverter {
    async fn convert(&self, text: &str) -> AppResult<String> {
        let content = self.message_for(text);
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: &content,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::UpstreamFailure,
                    "Conversion service unreachable",
                    e,
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %body, "Conversion service rejected request");
            return Err(AppError::upstream(format!(
                "Conversion service returned {status}"
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::UpstreamFailure,
                "Malformed conversion response",
                e,
            )
        })?;

        let markup = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::upstream("Conversion response had no content"))?;

        debug!(chars = markup.len(), "Conversion completed");
        Ok(markup)
    }
}
