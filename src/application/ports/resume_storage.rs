use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::entities::{NarrativeRecord, NarrativeVariant, Resume};

#[derive(Debug, Error)]
pub enum ResumeStorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Malformed document {path}: {reason}")]
    MalformedDocument { path: String, reason: String },
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Where a source resume ends up once its per-file processing finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Processed,
    Errors,
}

#[async_trait]
pub trait ResumeStorage: Send + Sync {
    /// Creates every directory of the layout.
    async fn prepare(&self) -> Result<(), ResumeStorageError>;

    /// Resume files waiting in the input directory.
    async fn discover(&self) -> Result<Vec<PathBuf>, ResumeStorageError>;

    async fn read_resume(&self, path: &Path) -> Result<Resume, ResumeStorageError>;

    async fn save_record(&self, record: &NarrativeRecord) -> Result<PathBuf, ResumeStorageError>;

    async fn list_records(
        &self,
        variant: NarrativeVariant,
    ) -> Result<Vec<PathBuf>, ResumeStorageError>;

    async fn load_record(&self, path: &Path) -> Result<NarrativeRecord, ResumeStorageError>;

    async fn relocate(
        &self,
        path: &Path,
        disposition: Disposition,
    ) -> Result<PathBuf, ResumeStorageError>;
}
