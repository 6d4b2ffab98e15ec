use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::application::ports::embedding_provider::{
    BatchEmbeddingRequest, EmbeddingProvider, EmbeddingProviderError, InputType,
};

/// Largest batch the embedding provider accepts in one call.
pub const EMBED_BATCH_SIZE: usize = 128;

#[derive(Debug, Error)]
pub enum EmbeddingServiceError {
    #[error(transparent)]
    ProviderError(#[from] EmbeddingProviderError),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub struct EmbeddingService {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
}

impl EmbeddingService {
    pub fn new(embedding_provider: Arc<dyn EmbeddingProvider>) -> Self {
        let batch_size = embedding_provider
            .max_batch_size()
            .clamp(1, EMBED_BATCH_SIZE);

        Self {
            embedding_provider,
            batch_size,
        }
    }

    pub async fn embed_one(
        &self,
        text: &str,
        input_type: InputType,
    ) -> Result<Vec<f32>, EmbeddingServiceError> {
        let mut embeddings = self.embed_batch(vec![text.to_string()], input_type).await?;

        embeddings.pop().ok_or_else(|| {
            EmbeddingServiceError::ValidationError("No embedding returned".to_string())
        })
    }

    /// Embeds `texts` in sequential batches, preserving input order. The first
    /// failing batch aborts the call; earlier results are discarded.
    pub async fn embed_many(
        &self,
        texts: &[String],
        input_type: InputType,
    ) -> Result<Vec<Vec<f32>>, EmbeddingServiceError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let total_chunks = texts.len().div_ceil(self.batch_size);
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for (index, chunk) in texts.chunks(self.batch_size).enumerate() {
            let embeddings = self.embed_batch(chunk.to_vec(), input_type).await?;
            all_embeddings.extend(embeddings);

            info!(
                "Processed embedding chunk {} of {}",
                index + 1,
                total_chunks
            );
        }

        Ok(all_embeddings)
    }

    async fn embed_batch(
        &self,
        texts: Vec<String>,
        input_type: InputType,
    ) -> Result<Vec<Vec<f32>>, EmbeddingServiceError> {
        let expected = texts.len();
        let request = BatchEmbeddingRequest { texts, input_type };

        let response = self.embedding_provider.generate_embeddings(request).await?;

        if response.embeddings.len() != expected {
            return Err(EmbeddingServiceError::ValidationError(format!(
                "Requested {} embeddings, provider returned {}",
                expected,
                response.embeddings.len()
            )));
        }

        debug!(
            "Embedded {} texts with {} ({:?} tokens)",
            expected, response.model_name, response.total_tokens
        );

        Ok(response.embeddings)
    }

    pub fn model_info(&self) -> String {
        self.embedding_provider.model_info()
    }

    pub fn embedding_dimension(&self) -> usize {
        self.embedding_provider.embedding_dimension()
    }
}
