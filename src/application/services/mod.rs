pub mod embedding_service;
pub mod narrative_service;
pub mod search_service;
pub mod vector_index_service;

pub use embedding_service::EmbeddingService;
pub use narrative_service::NarrativeService;
pub use search_service::SearchService;
pub use vector_index_service::VectorIndexService;
