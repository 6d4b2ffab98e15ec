use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::application::ports::embedding_provider::InputType;
use crate::application::services::embedding_service::{EmbeddingService, EmbeddingServiceError};
use crate::application::services::vector_index_service::{VectorIndexError, VectorIndexService};
use crate::domain::entities::ScoredPoint;
use crate::domain::value_objects::SearchMode;

/// Nearest neighbours returned per query.
pub const SEARCH_LIMIT: u64 = 10;

#[derive(Debug, Error)]
pub enum SearchServiceError {
    #[error(transparent)]
    EmbeddingError(#[from] EmbeddingServiceError),
    #[error(transparent)]
    IndexError(#[from] VectorIndexError),
    #[error("Search hit {0} has no filename in its payload")]
    MalformedHit(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub filename: String,
    pub score: f32,
    pub story: Option<String>,
    pub personality: Option<String>,
    pub raw_text: Option<String>,
}

impl SearchHit {
    fn from_point(point: &ScoredPoint, mode: SearchMode) -> Result<Self, SearchServiceError> {
        let filename = point
            .payload_str("filename")
            .ok_or_else(|| SearchServiceError::MalformedHit(point.id.clone()))?;

        let field = |included: bool, key: &str| {
            included
                .then(|| point.payload_str(key).map(str::to_string))
                .flatten()
        };

        Ok(Self {
            filename: filename.to_string(),
            score: point.score,
            story: field(mode.includes_story(), "story"),
            personality: field(mode.includes_personality(), "personality"),
            raw_text: field(mode.includes_raw_text(), "raw_text"),
        })
    }
}

pub struct SearchService {
    embedding_service: Arc<EmbeddingService>,
    vector_index: Arc<VectorIndexService>,
}

impl SearchService {
    pub fn new(
        embedding_service: Arc<EmbeddingService>,
        vector_index: Arc<VectorIndexService>,
    ) -> Self {
        Self {
            embedding_service,
            vector_index,
        }
    }

    pub async fn search(
        &self,
        query: &str,
        mode: SearchMode,
    ) -> Result<Vec<SearchHit>, SearchServiceError> {
        info!("Searching with query: {} in mode: {}", query, mode);

        let query_embedding = self
            .embedding_service
            .embed_one(query, InputType::Query)
            .await?;

        let points = self
            .vector_index
            .search(mode.collection_name(), query_embedding, SEARCH_LIMIT)
            .await?;

        let results = points
            .iter()
            .map(|point| SearchHit::from_point(point, mode))
            .collect::<Result<Vec<_>, _>>()?;

        info!("Found {} results", results.len());
        Ok(results)
    }
}
