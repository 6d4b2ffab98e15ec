//! Test doubles for the provider ports.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::application::ports::embedding_provider::{
    BatchEmbeddingRequest, BatchEmbeddingResponse, EmbeddingProvider, EmbeddingProviderError,
};
use crate::application::ports::text_generator::{
    CompletionRequest, CompletionResponse, TextGenerator, TextGeneratorError,
};
use crate::application::ports::vector_store::{VectorStore, VectorStoreError};
use crate::domain::entities::{ScoredPoint, VectorPoint};
use crate::domain::value_objects::{CollectionSchema, DistanceMetric};

pub const TEST_DIMENSION: usize = 16;

/// Deterministic bag-of-bytes embedding: equal texts give equal vectors.
pub fn embed_text(text: &str, dimension: usize) -> Vec<f32> {
    let mut vector = vec![0.0; dimension];
    for (i, byte) in text.bytes().enumerate() {
        vector[(byte as usize + i) % dimension] += 1.0;
    }
    if vector.iter().all(|v| *v == 0.0) {
        vector[0] = 1.0;
    }
    vector
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() {
        return None;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    Some(dot_product / (norm_a * norm_b))
}

/// Score as the vector database reports it: higher is closer for cosine and
/// dot, lower is closer for the distance metrics.
pub fn score(metric: DistanceMetric, a: &[f32], b: &[f32]) -> f32 {
    match metric {
        DistanceMetric::Cosine => cosine_similarity(a, b).unwrap_or(0.0),
        DistanceMetric::Dot => a.iter().zip(b.iter()).map(|(x, y)| x * y).sum(),
        DistanceMetric::Euclid => a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt(),
        DistanceMetric::Manhattan => a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum(),
    }
}

fn higher_is_closer(metric: DistanceMetric) -> bool {
    matches!(metric, DistanceMetric::Cosine | DistanceMetric::Dot)
}

pub struct FakeEmbeddingProvider {
    dimension: usize,
    max_batch_size: usize,
    fail_on_call: Option<usize>,
    short_response: bool,
    calls: AtomicUsize,
    batch_sizes: Mutex<Vec<usize>>,
}

impl FakeEmbeddingProvider {
    pub fn new() -> Self {
        Self {
            dimension: TEST_DIMENSION,
            max_batch_size: 128,
            fail_on_call: None,
            short_response: false,
            calls: AtomicUsize::new(0),
            batch_sizes: Mutex::new(Vec::new()),
        }
    }

    /// Fails the n-th call (1-based).
    pub fn failing_on_call(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    /// Returns one embedding fewer than requested.
    pub fn with_short_response(mut self) -> Self {
        self.short_response = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbeddingProvider {
    async fn generate_embeddings(
        &self,
        request: BatchEmbeddingRequest,
    ) -> Result<BatchEmbeddingResponse, EmbeddingProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.batch_sizes.lock().unwrap().push(request.texts.len());

        if self.fail_on_call == Some(call) {
            return Err(EmbeddingProviderError::ServiceUnavailable);
        }

        let mut embeddings: Vec<Vec<f32>> = request
            .texts
            .iter()
            .map(|text| embed_text(text, self.dimension))
            .collect();
        if self.short_response {
            embeddings.pop();
        }

        Ok(BatchEmbeddingResponse {
            embeddings,
            model_name: "fake-embedder".to_string(),
            total_tokens: None,
        })
    }

    fn model_info(&self) -> String {
        "fake-embedder".to_string()
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    fn embedding_dimension(&self) -> usize {
        self.dimension
    }
}

/// Echoes its prompt back. Fails when the prompt contains `fail_marker`.
pub struct FakeTextGenerator {
    fail_marker: Option<String>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl FakeTextGenerator {
    pub fn new() -> Self {
        Self {
            fail_marker: None,
            delay: Duration::from_millis(0),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_when_prompt_contains(mut self, marker: &str) -> Self {
        self.fail_marker = Some(marker.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeTextGenerator {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, TextGeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(marker) = &self.fail_marker {
            if request.prompt.contains(marker) {
                return Err(TextGeneratorError::ApiError {
                    status: 529,
                    message: "overloaded".to_string(),
                });
            }
        }

        Ok(CompletionResponse {
            text: format!("NARRATIVE<{}>", request.prompt),
            model_name: "fake-llm".to_string(),
            input_tokens: None,
            output_tokens: None,
        })
    }

    fn model_info(&self) -> String {
        "fake-llm".to_string()
    }
}

#[derive(Default)]
pub struct InMemoryVectorStore {
    collections: Mutex<HashMap<String, (CollectionSchema, Vec<VectorPoint>)>>,
    create_calls: AtomicUsize,
    upsert_batches: Mutex<Vec<usize>>,
    fail_upsert_on_call: Option<usize>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the n-th upsert call (1-based).
    pub fn failing_upsert_on_call(mut self, call: usize) -> Self {
        self.fail_upsert_on_call = Some(call);
        self
    }

    pub fn with_collection(self, schema: CollectionSchema) -> Self {
        self.collections
            .lock()
            .unwrap()
            .insert(schema.name.clone(), (schema, Vec::new()));
        self
    }

    pub fn collection_count(&self) -> usize {
        self.collections.lock().unwrap().len()
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn upsert_batches(&self) -> Vec<usize> {
        self.upsert_batches.lock().unwrap().clone()
    }

    pub fn points(&self, collection: &str) -> Vec<VectorPoint> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .map(|(_, points)| points.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn collection_schema(
        &self,
        name: &str,
    ) -> Result<Option<CollectionSchema>, VectorStoreError> {
        Ok(self
            .collections
            .lock()
            .unwrap()
            .get(name)
            .map(|(schema, _)| schema.clone()))
    }

    async fn create_collection(&self, schema: &CollectionSchema) -> Result<(), VectorStoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let mut collections = self.collections.lock().unwrap();
        if collections.contains_key(&schema.name) {
            return Err(VectorStoreError::Backend(format!(
                "Collection `{}` already exists",
                schema.name
            )));
        }
        collections.insert(schema.name.clone(), (schema.clone(), Vec::new()));
        Ok(())
    }

    async fn upsert_points(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> Result<(), VectorStoreError> {
        let call = {
            let mut batches = self.upsert_batches.lock().unwrap();
            batches.push(points.len());
            batches.len()
        };
        if self.fail_upsert_on_call == Some(call) {
            return Err(VectorStoreError::Backend("upsert rejected".to_string()));
        }

        let mut collections = self.collections.lock().unwrap();
        let (schema, stored) = collections
            .get_mut(collection)
            .ok_or_else(|| VectorStoreError::Backend(format!("Not found: {}", collection)))?;

        if let Some(point) = points
            .iter()
            .find(|p| p.dimension() as u64 != schema.vector_size)
        {
            return Err(VectorStoreError::Backend(format!(
                "Wrong input: Vector dimension error: expected dim: {}, got {}",
                schema.vector_size,
                point.dimension()
            )));
        }

        stored.extend(points);
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<ScoredPoint>, VectorStoreError> {
        let collections = self.collections.lock().unwrap();
        let (schema, stored) = collections
            .get(collection)
            .ok_or_else(|| VectorStoreError::Backend(format!("Not found: {}", collection)))?;

        let mut hits: Vec<ScoredPoint> = stored
            .iter()
            .map(|point| ScoredPoint {
                id: point.id().to_string(),
                score: score(schema.distance, &vector, point.vector()),
                payload: point.payload().to_json(),
            })
            .collect();

        if higher_is_closer(schema.distance) {
            hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        } else {
            hits.sort_by(|a, b| a.score.total_cmp(&b.score));
        }
        hits.truncate(limit as usize);

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let identical = cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0]).unwrap();
        assert!((identical - 1.0).abs() < 1e-6);

        let orthogonal = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(orthogonal.abs() < 1e-6);

        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).is_none());
        assert!(cosine_similarity(&[1.0], &[1.0, 0.0]).is_none());
    }

    #[test]
    fn test_scores() {
        let a = [1.0, 0.0];
        let b = [0.0, 1.0];

        assert!((score(DistanceMetric::Cosine, &a, &a) - 1.0).abs() < 1e-6);
        assert_eq!(score(DistanceMetric::Dot, &a, &b), 0.0);
        assert!((score(DistanceMetric::Euclid, &a, &b) - 2f32.sqrt()).abs() < 1e-6);
        assert_eq!(score(DistanceMetric::Manhattan, &a, &b), 2.0);
    }
}
