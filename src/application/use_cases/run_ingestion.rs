use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::application::ports::resume_storage::{ResumeStorage, ResumeStorageError};
use crate::application::services::vector_index_service::{VectorIndexError, VectorIndexService};
use crate::domain::value_objects::{CollectionSchema, Corpus};

use super::index_narratives::{IndexNarrativesError, IndexNarrativesUseCase};
use super::process_resume::ProcessResumeUseCase;

pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Error)]
pub enum RunIngestionError {
    #[error(transparent)]
    StorageError(#[from] ResumeStorageError),
    #[error(transparent)]
    IndexError(#[from] VectorIndexError),
    #[error(transparent)]
    IndexNarrativesError(#[from] IndexNarrativesError),
    #[error("Resume task panicked: {0}")]
    TaskFailed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionReport {
    pub discovered: usize,
    pub processed: usize,
    pub failed: Vec<(String, String)>,
    pub indexed: Vec<(String, usize)>,
    pub skipped_documents: usize,
}

impl IngestionReport {
    pub fn total_indexed(&self) -> usize {
        self.indexed.iter().map(|(_, points)| points).sum()
    }
}

pub struct RunIngestionUseCase {
    storage: Arc<dyn ResumeStorage>,
    process_resume: Arc<ProcessResumeUseCase>,
    index_narratives: Arc<IndexNarrativesUseCase>,
    vector_index: Arc<VectorIndexService>,
    schemas: Vec<CollectionSchema>,
    concurrency: usize,
}

impl RunIngestionUseCase {
    pub fn new(
        storage: Arc<dyn ResumeStorage>,
        process_resume: Arc<ProcessResumeUseCase>,
        index_narratives: Arc<IndexNarrativesUseCase>,
        vector_index: Arc<VectorIndexService>,
        schemas: Vec<CollectionSchema>,
        concurrency: usize,
    ) -> Self {
        Self {
            storage,
            process_resume,
            index_narratives,
            vector_index,
            schemas,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn execute(&self) -> Result<IngestionReport, RunIngestionError> {
        self.storage.prepare().await?;
        for schema in &self.schemas {
            self.vector_index.ensure_collection(schema).await?;
        }

        let files = self.storage.discover().await?;
        info!("Found {} resume files", files.len());

        let mut report = IngestionReport {
            discovered: files.len(),
            ..Default::default()
        };

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for path in files {
            let semaphore = semaphore.clone();
            let process_resume = self.process_resume.clone();

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| (path.display().to_string(), e.to_string()))?;
                let filename = path
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                process_resume
                    .execute(&path)
                    .await
                    .map_err(|e| (filename, e.to_string()))
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(outcome)) => {
                    debug!(
                        "{} is {}: story {}, personality {}, archived to {}",
                        outcome.filename,
                        outcome.status,
                        outcome.story_document.display(),
                        outcome.personality_document.display(),
                        outcome.archived_to.display()
                    );
                    report.processed += 1;
                }
                Ok(Err(failure)) => report.failed.push(failure),
                Err(e) => {
                    error!("Resume task failed to complete: {}", e);
                    return Err(RunIngestionError::TaskFailed(e.to_string()));
                }
            }
        }
        report.failed.sort();

        info!(
            "Processed {} of {} resumes ({} failed)",
            report.processed,
            report.discovered,
            report.failed.len()
        );

        for corpus in Corpus::ALL {
            let summary = self.index_narratives.execute(corpus).await?;
            report.skipped_documents += summary.skipped;
            report.indexed.push((summary.collection, summary.indexed));
        }

        info!("Indexed {} points in total", report.total_indexed());
        Ok(report)
    }
}
