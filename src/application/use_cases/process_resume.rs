use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::application::ports::resume_storage::{Disposition, ResumeStorage, ResumeStorageError};
use crate::application::services::narrative_service::{NarrativeService, NarrativeServiceError};
use crate::domain::entities::{NarrativeRecord, NarrativeVariant};
use crate::domain::value_objects::ResumeStatus;

const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Error)]
pub enum ProcessResumeError {
    #[error(transparent)]
    StorageError(#[from] ResumeStorageError),
    #[error(transparent)]
    NarrativeError(#[from] NarrativeServiceError),
    #[error("{0}")]
    InvalidTransition(String),
}

#[derive(Debug, Clone)]
pub struct ResumeOutcome {
    pub filename: String,
    pub story_document: PathBuf,
    pub personality_document: PathBuf,
    pub archived_to: PathBuf,
    pub status: ResumeStatus,
}

/// Per-file steps: read, narrate, persist both documents, relocate.
pub struct ProcessResumeUseCase {
    storage: Arc<dyn ResumeStorage>,
    narrative_service: Arc<NarrativeService>,
}

impl ProcessResumeUseCase {
    pub fn new(storage: Arc<dyn ResumeStorage>, narrative_service: Arc<NarrativeService>) -> Self {
        Self {
            storage,
            narrative_service,
        }
    }

    /// On failure the source file is moved to the errors directory and any
    /// document already written is left in place.
    pub async fn execute(&self, path: &Path) -> Result<ResumeOutcome, ProcessResumeError> {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        info!("Processing file: {}", filename);

        let mut status = ResumeStatus::default();

        match self.process(path, &mut status).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                let reached = status.to_string();
                status = ResumeStatus::Failed(e.to_string());
                error!(
                    "Error processing {} after it was {}: {}",
                    filename,
                    reached,
                    status.error_message().unwrap_or_default()
                );
                match self.storage.relocate(path, Disposition::Errors).await {
                    Ok(destination) => debug!("Moved {} to {}", filename, destination.display()),
                    Err(move_error) => {
                        error!("Could not move {} to errors: {}", filename, move_error)
                    }
                }
                Err(e)
            }
        }
    }

    async fn process(
        &self,
        path: &Path,
        status: &mut ResumeStatus,
    ) -> Result<ResumeOutcome, ProcessResumeError> {
        let resume = self.storage.read_resume(path).await?;
        info!(
            "File {} content preview: {}...",
            resume.filename(),
            resume.preview(PREVIEW_CHARS)
        );

        let story = self
            .narrative_service
            .generate(resume.raw_text(), NarrativeVariant::Story)
            .await?;
        info!("Generated story for {}", resume.filename());

        let personality = self
            .narrative_service
            .generate(resume.raw_text(), NarrativeVariant::Personality)
            .await?;
        info!("Generated personality analysis for {}", resume.filename());
        *status = advance(status, ResumeStatus::Narrated)?;

        let processed_date = Utc::now();
        let story_record =
            NarrativeRecord::new(&resume, NarrativeVariant::Story, story, processed_date);
        let personality_record = NarrativeRecord::new(
            &resume,
            NarrativeVariant::Personality,
            personality,
            processed_date,
        );

        let story_document = self.storage.save_record(&story_record).await?;
        let personality_document = self.storage.save_record(&personality_record).await?;
        *status = advance(status, ResumeStatus::Persisted)?;

        let archived_to = self
            .storage
            .relocate(resume.path(), Disposition::Processed)
            .await?;
        *status = advance(status, ResumeStatus::Processed)?;

        Ok(ResumeOutcome {
            filename: resume.filename().to_string(),
            story_document,
            personality_document,
            archived_to,
            status: status.clone(),
        })
    }
}

fn advance(
    current: &ResumeStatus,
    next: ResumeStatus,
) -> Result<ResumeStatus, ProcessResumeError> {
    current
        .clone()
        .transition_to(next)
        .map_err(ProcessResumeError::InvalidTransition)
}
