use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::ports::embedding_provider::InputType;
use crate::application::ports::resume_storage::{ResumeStorage, ResumeStorageError};
use crate::application::services::embedding_service::{EmbeddingService, EmbeddingServiceError};
use crate::application::services::vector_index_service::{VectorIndexError, VectorIndexService};
use crate::domain::entities::{NarrativeRecord, VectorPoint};
use crate::domain::value_objects::Corpus;

#[derive(Debug, Error)]
pub enum IndexNarrativesError {
    #[error(transparent)]
    StorageError(#[from] ResumeStorageError),
    #[error(transparent)]
    EmbeddingError(#[from] EmbeddingServiceError),
    #[error(transparent)]
    IndexError(#[from] VectorIndexError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSummary {
    pub collection: String,
    pub indexed: usize,
    pub skipped: usize,
}

/// Batch phase for one corpus: read every document back, embed, upload.
pub struct IndexNarrativesUseCase {
    storage: Arc<dyn ResumeStorage>,
    embedding_service: Arc<EmbeddingService>,
    vector_index: Arc<VectorIndexService>,
}

impl IndexNarrativesUseCase {
    pub fn new(
        storage: Arc<dyn ResumeStorage>,
        embedding_service: Arc<EmbeddingService>,
        vector_index: Arc<VectorIndexService>,
    ) -> Self {
        Self {
            storage,
            embedding_service,
            vector_index,
        }
    }

    pub async fn execute(&self, corpus: Corpus) -> Result<IndexSummary, IndexNarrativesError> {
        let (records, skipped) = self.load_records(corpus).await?;

        let mut summary = IndexSummary {
            collection: corpus.collection_name().to_string(),
            indexed: 0,
            skipped,
        };

        if records.is_empty() {
            info!("No {} files to process", corpus);
            return Ok(summary);
        }

        let texts: Vec<String> = records
            .iter()
            .map(|record| corpus.text_of(record).to_string())
            .collect();

        let embeddings = self
            .embedding_service
            .embed_many(&texts, InputType::Document)
            .await?;

        let points: Vec<VectorPoint> = records
            .iter()
            .zip(embeddings)
            .map(|(record, embedding)| VectorPoint::new(embedding, corpus.payload_for(record)))
            .collect();

        summary.indexed = self
            .vector_index
            .upsert(corpus.collection_name(), points)
            .await?;

        Ok(summary)
    }

    /// Malformed documents, and documents of the wrong variant, are logged
    /// and skipped. Other storage errors abort.
    async fn load_records(
        &self,
        corpus: Corpus,
    ) -> Result<(Vec<NarrativeRecord>, usize), IndexNarrativesError> {
        let expected_variant = corpus.source_variant();
        let mut records = Vec::new();
        let mut skipped = 0;

        for path in self.storage.list_records(expected_variant).await? {
            match self.storage.load_record(&path).await {
                Ok(record) if record.variant() == expected_variant => records.push(record),
                Ok(record) => {
                    warn!(
                        "Skipping {}: expected a {} document, found {}",
                        path.display(),
                        expected_variant,
                        record.variant()
                    );
                    skipped += 1;
                }
                Err(ResumeStorageError::MalformedDocument { path, reason }) => {
                    warn!("Error parsing JSON file: {} ({})", path, reason);
                    skipped += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok((records, skipped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{NarrativeVariant, Resume};
    use crate::domain::value_objects::CollectionSchema;
    use crate::infrastructure::file_system::LocalResumeStorage;
    use crate::test_support::{FakeEmbeddingProvider, InMemoryVectorStore, TEST_DIMENSION};
    use chrono::Utc;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        storage: Arc<LocalResumeStorage>,
        embedder: Arc<FakeEmbeddingProvider>,
        store: Arc<InMemoryVectorStore>,
        use_case: IndexNarrativesUseCase,
    }

    async fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(LocalResumeStorage::new(dir.path().to_path_buf()));
        storage.prepare().await.unwrap();

        let embedder = Arc::new(FakeEmbeddingProvider::new());
        let mut store = InMemoryVectorStore::new();
        for corpus in Corpus::ALL {
            store = store.with_collection(CollectionSchema::cosine(
                corpus.collection_name(),
                TEST_DIMENSION as u64,
            ));
        }
        let store = Arc::new(store);

        let use_case = IndexNarrativesUseCase::new(
            storage.clone(),
            Arc::new(EmbeddingService::new(embedder.clone())),
            Arc::new(VectorIndexService::new(store.clone())),
        );

        Fixture {
            _dir: dir,
            storage,
            embedder,
            store,
            use_case,
        }
    }

    async fn save(storage: &LocalResumeStorage, name: &str, variant: NarrativeVariant) {
        let resume = Resume::new(PathBuf::from(name), format!("raw text of {}", name));
        let record = NarrativeRecord::new(
            &resume,
            variant,
            format!("{} narrative of {}", variant, name),
            Utc::now(),
        );
        storage.save_record(&record).await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_documents_are_skipped() {
        let fx = fixture().await;
        save(&fx.storage, "nina.txt", NarrativeVariant::Story).await;
        save(&fx.storage, "omar.txt", NarrativeVariant::Story).await;
        let story_dir = fx.storage.layout().variant_dir(NarrativeVariant::Story);
        std::fs::write(story_dir.join("aaa_truncated.json"), "{\"filename\": \"x").unwrap();
        std::fs::write(
            story_dir.join("aab_no_story.json"),
            r#"{"filename":"p.txt","raw_text":"p","processed_date":"2024-01-01T00:00:00Z","type":"story"}"#,
        )
        .unwrap();

        let summary = fx.use_case.execute(Corpus::Story).await.unwrap();

        assert_eq!(summary.indexed, 2);
        assert_eq!(summary.skipped, 2);
        let points = fx.store.points("storyteller");
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| p.payload().story.is_some()));
    }

    #[tokio::test]
    async fn test_non_utf8_document_is_skipped() {
        let fx = fixture().await;
        save(&fx.storage, "rita.txt", NarrativeVariant::Story).await;
        let story_dir = fx.storage.layout().variant_dir(NarrativeVariant::Story);
        std::fs::write(story_dir.join("aaa_latin1.json"), [b'{', 0xff, 0xfe, b'}']).unwrap();

        let summary = fx.use_case.execute(Corpus::Story).await.unwrap();

        assert_eq!(summary.indexed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(fx.store.points("storyteller").len(), 1);
    }

    #[tokio::test]
    async fn test_wrong_variant_in_directory_is_skipped() {
        let fx = fixture().await;
        save(&fx.storage, "pat.txt", NarrativeVariant::Personality).await;
        let stray = fx
            .storage
            .list_records(NarrativeVariant::Personality)
            .await
            .unwrap()
            .remove(0);
        std::fs::copy(
            &stray,
            fx.storage
                .layout()
                .variant_dir(NarrativeVariant::Story)
                .join("stray.json"),
        )
        .unwrap();

        let summary = fx.use_case.execute(Corpus::Story).await.unwrap();

        assert_eq!(summary.indexed, 0);
        assert_eq!(summary.skipped, 1);
        assert_eq!(fx.embedder.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_corpus_makes_no_calls() {
        let fx = fixture().await;

        let summary = fx.use_case.execute(Corpus::Personality).await.unwrap();

        assert_eq!(summary.indexed, 0);
        assert_eq!(fx.embedder.calls(), 0);
        assert!(fx.store.upsert_batches().is_empty());
    }

    #[tokio::test]
    async fn test_full_text_corpus_uses_raw_text() {
        let fx = fixture().await;
        save(&fx.storage, "quinn.txt", NarrativeVariant::Story).await;

        let summary = fx.use_case.execute(Corpus::FullText).await.unwrap();

        assert_eq!(summary.collection, "Full_Texts");
        let points = fx.store.points("Full_Texts");
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].payload().raw_text, "raw text of quinn.txt");
        assert!(points[0].payload().story.is_none());
    }

    #[tokio::test]
    async fn test_large_corpus_is_embedded_in_chunks() {
        let fx = fixture().await;
        for i in 0..130 {
            save(&fx.storage, &format!("r{:03}.txt", i), NarrativeVariant::Personality).await;
        }

        let summary = fx.use_case.execute(Corpus::Personality).await.unwrap();

        assert_eq!(summary.indexed, 130);
        assert_eq!(fx.embedder.batch_sizes(), vec![128, 2]);
        assert_eq!(fx.store.upsert_batches(), vec![100, 30]);
    }
}
