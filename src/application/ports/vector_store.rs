use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{ScoredPoint, VectorPoint};
use crate::domain::value_objects::CollectionSchema;

#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("Vector store error: {0}")]
    Backend(String),
    #[error("Unsupported collection config: {0}")]
    UnsupportedSchema(String),
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Declared schema of `name`, or `None` when the collection does not exist.
    async fn collection_schema(
        &self,
        name: &str,
    ) -> Result<Option<CollectionSchema>, VectorStoreError>;

    async fn create_collection(&self, schema: &CollectionSchema) -> Result<(), VectorStoreError>;

    /// Writes `points` in a single call.
    async fn upsert_points(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> Result<(), VectorStoreError>;

    async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<ScoredPoint>, VectorStoreError>;
}
