use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::application::ports::vector_store::{VectorStore, VectorStoreError};
use crate::domain::entities::{ScoredPoint, VectorPoint};
use crate::domain::value_objects::CollectionSchema;

/// Points written per upsert call.
pub const UPSERT_BATCH_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum VectorIndexError {
    #[error(transparent)]
    StoreError(#[from] VectorStoreError),
    #[error("Collection `{collection}` exists as {actual}, expected {expected}")]
    SchemaMismatch {
        collection: String,
        expected: CollectionSchema,
        actual: CollectionSchema,
    },
    #[error("Upload to `{collection}` failed at batch {batch} of {total}: {source}")]
    UpsertAborted {
        collection: String,
        batch: usize,
        total: usize,
        #[source]
        source: VectorStoreError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionState {
    Created,
    Existing,
}

pub struct VectorIndexService {
    vector_store: Arc<dyn VectorStore>,
}

impl VectorIndexService {
    pub fn new(vector_store: Arc<dyn VectorStore>) -> Self {
        Self { vector_store }
    }

    /// Creates the collection when absent. An existing collection must match
    /// the schema's vector size and distance.
    pub async fn ensure_collection(
        &self,
        schema: &CollectionSchema,
    ) -> Result<CollectionState, VectorIndexError> {
        match self.vector_store.collection_schema(&schema.name).await? {
            Some(actual) if actual.is_compatible_with(schema) => {
                info!("Collection already exists: {}", schema.name);
                Ok(CollectionState::Existing)
            }
            Some(actual) => {
                error!(
                    "Collection {} has an incompatible schema: {} (expected {})",
                    schema.name, actual, schema
                );
                Err(VectorIndexError::SchemaMismatch {
                    collection: schema.name.clone(),
                    expected: schema.clone(),
                    actual,
                })
            }
            None => {
                self.vector_store
                    .create_collection(schema)
                    .await
                    .inspect_err(|e| {
                        error!("Error with collection {}: {}", schema.name, e);
                    })?;
                info!("Created collection: {}", schema);
                Ok(CollectionState::Created)
            }
        }
    }

    /// Writes `points` in sequential batches. A failing batch aborts the
    /// upload; batches written before it stay committed.
    pub async fn upsert(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> Result<usize, VectorIndexError> {
        let total_points = points.len();
        let total_batches = total_points.div_ceil(UPSERT_BATCH_SIZE);

        let mut remaining = points.into_iter().peekable();
        let mut batch_number = 0;

        while remaining.peek().is_some() {
            batch_number += 1;
            let batch: Vec<VectorPoint> = remaining.by_ref().take(UPSERT_BATCH_SIZE).collect();

            if let Err(source) = self.vector_store.upsert_points(collection, batch).await {
                error!("Error uploading batch to Qdrant: {}", source);
                return Err(VectorIndexError::UpsertAborted {
                    collection: collection.to_string(),
                    batch: batch_number,
                    total: total_batches,
                    source,
                });
            }

            info!(
                "Uploaded batch {} of {} to {}",
                batch_number, total_batches, collection
            );
        }

        Ok(total_points)
    }

    pub async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<ScoredPoint>, VectorIndexError> {
        Ok(self.vector_store.search(collection, vector, limit).await?)
    }
}
