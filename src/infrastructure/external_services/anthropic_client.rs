use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::text_generator::{
    CompletionRequest, CompletionResponse, TextGenerator, TextGeneratorError,
};
use crate::infrastructure::config::{self, ConfigError};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl AnthropicConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(config::env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: config::required(&lookup, "ANTHROPIC_API_KEY")?,
            base_url: config::optional(&lookup, "ANTHROPIC_BASE_URL")
                .unwrap_or_else(|| "https://api.anthropic.com".to_string()),
            model: config::optional(&lookup, "ANTHROPIC_MODEL")
                .unwrap_or_else(|| "claude-3-5-sonnet-20241022".to_string()),
            timeout: config::seconds(&lookup, "ANTHROPIC_TIMEOUT_SECS", 60)?,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    model: String,
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl MessagesResponse {
    /// First text block of the reply.
    fn first_text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|block| block.block_type == "text")
            .and_then(|block| block.text.as_deref())
    }
}

pub struct AnthropicTextGenerator {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicTextGenerator {
    pub fn new(config: AnthropicConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::new(AnthropicConfig::from_env()?)?)
    }
}

#[async_trait]
impl TextGenerator for AnthropicTextGenerator {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, TextGeneratorError> {
        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        let response = self
            .client
            .post(self.config.endpoint())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| TextGeneratorError::NetworkError(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TextGeneratorError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let reply: MessagesResponse = response
            .json()
            .await
            .map_err(|e| TextGeneratorError::ParseError(e.to_string()))?;

        let text = reply
            .first_text()
            .ok_or(TextGeneratorError::EmptyResponse)?
            .to_string();

        Ok(CompletionResponse {
            text,
            model_name: reply.model,
            input_tokens: reply.usage.as_ref().map(|u| u.input_tokens),
            output_tokens: reply.usage.as_ref().map(|u| u.output_tokens),
        })
    }

    fn model_info(&self) -> String {
        self.config.model.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::lookup_from;

    #[test]
    fn test_config_defaults() {
        let config =
            AnthropicConfig::from_lookup(lookup_from(&[("ANTHROPIC_API_KEY", "sk-ant-test")]))
                .unwrap();

        assert_eq!(config.model, "claude-3-5-sonnet-20241022");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.endpoint(), "https://api.anthropic.com/v1/messages");
    }

    #[test]
    fn test_request_body_shape() {
        let body = MessagesRequest {
            model: "claude-3-5-sonnet-20241022",
            max_tokens: 1024,
            temperature: 1.0,
            messages: vec![Message {
                role: "user",
                content: "Tell a story",
            }],
        };

        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["max_tokens"], 1024);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Tell a story");
    }

    #[test]
    fn test_first_text_block_is_used() {
        let reply: MessagesResponse = serde_json::from_value(serde_json::json!({
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-5-sonnet-20241022",
            "content": [
                {"type": "tool_use", "id": "t1", "name": "x", "input": {}},
                {"type": "text", "text": "Once upon a time"},
                {"type": "text", "text": "ignored"}
            ],
            "usage": {"input_tokens": 12, "output_tokens": 4}
        }))
        .unwrap();

        assert_eq!(reply.first_text(), Some("Once upon a time"));
        assert_eq!(reply.usage.map(|u| u.output_tokens), Some(4));
    }

    #[test]
    fn test_reply_without_text() {
        let reply: MessagesResponse = serde_json::from_value(serde_json::json!({
            "model": "claude-3-5-sonnet-20241022",
            "content": []
        }))
        .unwrap();

        assert_eq!(reply.first_text(), None);
    }
}
