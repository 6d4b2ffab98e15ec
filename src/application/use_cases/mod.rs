pub mod index_narratives;
pub mod process_resume;
pub mod run_ingestion;

pub use index_narratives::IndexNarrativesUseCase;
pub use process_resume::ProcessResumeUseCase;
pub use run_ingestion::RunIngestionUseCase;
