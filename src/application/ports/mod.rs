pub mod embedding_provider;
pub mod resume_storage;
pub mod text_generator;
pub mod vector_store;

pub use embedding_provider::EmbeddingProvider;
pub use resume_storage::ResumeStorage;
pub use text_generator::TextGenerator;
pub use vector_store::VectorStore;
