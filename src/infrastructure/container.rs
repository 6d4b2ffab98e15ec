use std::sync::Arc;
use tracing::info;

use crate::{
    application::{
        ports::{EmbeddingProvider, ResumeStorage, TextGenerator, VectorStore},
        services::{
            EmbeddingService, NarrativeService, SearchService, VectorIndexService,
            narrative_service::NarrativeSettings,
        },
        use_cases::{IndexNarrativesUseCase, ProcessResumeUseCase, RunIngestionUseCase},
    },
    domain::value_objects::{CollectionSchema, Corpus},
    infrastructure::{
        config::IngestionConfig,
        external_services::{AnthropicTextGenerator, QdrantVectorStore, VoyageEmbeddingProvider},
        file_system::LocalResumeStorage,
    },
    presentation::http::handlers::SearchHandler,
};

/// One cosine collection per corpus, sized to the embedding provider's output.
pub fn collection_schemas(dimension: u64) -> Vec<CollectionSchema> {
    Corpus::ALL
        .iter()
        .map(|corpus| CollectionSchema::cosine(corpus.collection_name(), dimension))
        .collect()
}

pub struct SearchContainer {
    pub vector_index: Arc<VectorIndexService>,
    pub schemas: Vec<CollectionSchema>,
    pub search_handler: Arc<SearchHandler>,
}

impl SearchContainer {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // External services
        let embedding_provider: Arc<dyn EmbeddingProvider> =
            Arc::new(VoyageEmbeddingProvider::from_env()?);
        let vector_store: Arc<dyn VectorStore> = Arc::new(QdrantVectorStore::from_env()?);

        // Application services
        let embedding_service = Arc::new(EmbeddingService::new(embedding_provider));
        let schemas = collection_schemas(embedding_service.embedding_dimension() as u64);
        let vector_index = Arc::new(VectorIndexService::new(vector_store));
        info!("Query embeddings from {}", embedding_service.model_info());
        let search_service = Arc::new(SearchService::new(
            embedding_service,
            vector_index.clone(),
        ));

        // HTTP handlers
        let search_handler = Arc::new(SearchHandler::new(search_service));

        Ok(Self {
            vector_index,
            schemas,
            search_handler,
        })
    }

    pub async fn ensure_collections(&self) -> Result<(), Box<dyn std::error::Error>> {
        for schema in &self.schemas {
            self.vector_index.ensure_collection(schema).await?;
        }
        Ok(())
    }
}

pub struct IngestionContainer {
    pub run_ingestion_use_case: Arc<RunIngestionUseCase>,
}

impl IngestionContainer {
    pub fn new(config: IngestionConfig) -> Result<Self, Box<dyn std::error::Error>> {
        // External services
        let embedding_provider: Arc<dyn EmbeddingProvider> =
            Arc::new(VoyageEmbeddingProvider::from_env()?);
        let text_generator: Arc<dyn TextGenerator> = Arc::new(AnthropicTextGenerator::from_env()?);
        let vector_store: Arc<dyn VectorStore> = Arc::new(QdrantVectorStore::from_env()?);
        let storage: Arc<dyn ResumeStorage> = Arc::new(LocalResumeStorage::new(config.data_dir));

        // Application services
        let embedding_service = Arc::new(EmbeddingService::new(embedding_provider));
        let schemas = collection_schemas(embedding_service.embedding_dimension() as u64);
        let narrative_service = Arc::new(NarrativeService::new(
            text_generator,
            NarrativeSettings::default(),
        ));
        let vector_index = Arc::new(VectorIndexService::new(vector_store));
        info!(
            "Narratives from {}, embeddings from {}",
            narrative_service.model_info(),
            embedding_service.model_info()
        );

        // Use cases
        let process_resume_use_case = Arc::new(ProcessResumeUseCase::new(
            storage.clone(),
            narrative_service,
        ));
        let index_narratives_use_case = Arc::new(IndexNarrativesUseCase::new(
            storage.clone(),
            embedding_service,
            vector_index.clone(),
        ));
        let run_ingestion_use_case = Arc::new(RunIngestionUseCase::new(
            storage,
            process_resume_use_case,
            index_narratives_use_case,
            vector_index,
            schemas,
            config.concurrency,
        ));

        Ok(Self {
            run_ingestion_use_case,
        })
    }
}
