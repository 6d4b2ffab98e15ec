use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextGeneratorError {
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },
    #[error("Failed to parse response: {0}")]
    ParseError(String),
    #[error("Response contained no text")]
    EmptyResponse,
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub text: String,
    pub model_name: String,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
}

/// Single-turn, non-streaming text generation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, TextGeneratorError>;

    fn model_info(&self) -> String;
}
