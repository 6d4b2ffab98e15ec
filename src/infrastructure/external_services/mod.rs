pub mod anthropic_client;
pub mod qdrant_store;
pub mod voyage_client;

pub use anthropic_client::AnthropicTextGenerator;
pub use qdrant_store::QdrantVectorStore;
pub use voyage_client::VoyageEmbeddingProvider;
