use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::application::ports::embedding_provider::{
    BatchEmbeddingRequest, BatchEmbeddingResponse, EmbeddingProvider, EmbeddingProviderError,
    InputType,
};
use crate::infrastructure::config::{self, ConfigError};

/// Largest batch Voyage accepts in a single request.
const VOYAGE_MAX_BATCH: usize = 128;

#[derive(Debug, Clone)]
pub struct VoyageConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub output_dimension: usize,
    pub max_retries: u32,
    pub timeout: Duration,
    pub backoff_factor: f64,
}

impl VoyageConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(config::env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: config::required(&lookup, "VOYAGE_API_KEY")?,
            base_url: config::optional(&lookup, "VOYAGE_BASE_URL")
                .unwrap_or_else(|| "https://api.voyageai.com".to_string()),
            model: config::optional(&lookup, "VOYAGE_MODEL")
                .unwrap_or_else(|| "voyage-3".to_string()),
            output_dimension: config::embedding_dimension(&lookup)? as usize,
            max_retries: config::parsed(&lookup, "VOYAGE_MAX_RETRIES", 0)?,
            timeout: config::seconds(&lookup, "VOYAGE_TIMEOUT_SECS", 30)?,
            backoff_factor: 1.5,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/embeddings", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    input: &'a [String],
    model: &'a str,
    input_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dimension: Option<usize>,
}

/// Stored documents pin the configured dimension; queries use the model default.
fn output_dimension_for(input_type: InputType, configured: usize) -> Option<usize> {
    match input_type {
        InputType::Document => Some(configured),
        InputType::Query => None,
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
    model: String,
    #[serde(default)]
    usage: Option<EmbeddingUsage>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingUsage {
    total_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct VoyageClient {
    client: Client,
    config: VoyageConfig,
}

impl VoyageClient {
    pub fn new(config: VoyageConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &VoyageConfig {
        &self.config
    }

    async fn send_request(
        &self,
        request: &EmbeddingsRequest<'_>,
    ) -> Result<EmbeddingsResponse, EmbeddingProviderError> {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.execute_request(request).await {
                Ok(response) => return Ok(response),
                Err(e) if is_retryable(&e) && attempts <= self.config.max_retries => {
                    let backoff_time = Duration::from_millis(
                        (self.config.backoff_factor.powi(attempts as i32 - 1) * 1000.0) as u64,
                    );
                    warn!(
                        "Voyage request failed (attempt {}): {}. Retrying in {:?}",
                        attempts, e, backoff_time
                    );
                    tokio::time::sleep(backoff_time).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn execute_request(
        &self,
        request: &EmbeddingsRequest<'_>,
    ) -> Result<EmbeddingsResponse, EmbeddingProviderError> {
        let response = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(&self.config.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| EmbeddingProviderError::NetworkError(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        response
            .json::<EmbeddingsResponse>()
            .await
            .map_err(|e| EmbeddingProviderError::ApiError(format!("Malformed response: {}", e)))
    }
}

fn status_error(status: StatusCode, body: String) -> EmbeddingProviderError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => EmbeddingProviderError::RateLimitExceeded,
        StatusCode::BAD_REQUEST => EmbeddingProviderError::InvalidInput(body),
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            EmbeddingProviderError::ServiceUnavailable
        }
        _ => EmbeddingProviderError::ApiError(format!("Voyage API error ({}): {}", status, body)),
    }
}

fn is_retryable(error: &EmbeddingProviderError) -> bool {
    matches!(
        error,
        EmbeddingProviderError::NetworkError(_)
            | EmbeddingProviderError::RateLimitExceeded
            | EmbeddingProviderError::ServiceUnavailable
    )
}

/// Restores request order; Voyage tags each embedding with its input index.
fn into_ordered_embeddings(mut data: Vec<EmbeddingData>) -> Vec<Vec<f32>> {
    data.sort_by_key(|d| d.index);
    data.into_iter().map(|d| d.embedding).collect()
}

pub struct VoyageEmbeddingProvider {
    client: VoyageClient,
}

impl VoyageEmbeddingProvider {
    pub fn new(client: VoyageClient) -> Self {
        Self { client }
    }

    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let client = VoyageClient::new(VoyageConfig::from_env()?)?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl EmbeddingProvider for VoyageEmbeddingProvider {
    async fn generate_embeddings(
        &self,
        request: BatchEmbeddingRequest,
    ) -> Result<BatchEmbeddingResponse, EmbeddingProviderError> {
        if request.texts.len() > VOYAGE_MAX_BATCH {
            return Err(EmbeddingProviderError::InvalidInput(format!(
                "Batch of {} exceeds the limit of {}",
                request.texts.len(),
                VOYAGE_MAX_BATCH
            )));
        }

        let config = self.client.config();
        let body = EmbeddingsRequest {
            input: &request.texts,
            model: &config.model,
            input_type: request.input_type.as_str(),
            output_dimension: output_dimension_for(request.input_type, config.output_dimension),
        };

        let response = self.client.send_request(&body).await?;

        Ok(BatchEmbeddingResponse {
            embeddings: into_ordered_embeddings(response.data),
            model_name: response.model,
            total_tokens: response.usage.map(|u| u.total_tokens),
        })
    }

    fn model_info(&self) -> String {
        self.client.config().model.clone()
    }

    fn max_batch_size(&self) -> usize {
        VOYAGE_MAX_BATCH
    }

    fn embedding_dimension(&self) -> usize {
        self.client.config().output_dimension
    }
}
