use async_trait::async_trait;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::application::ports::resume_storage::{Disposition, ResumeStorage, ResumeStorageError};
use crate::domain::entities::{NarrativeRecord, NarrativeVariant, Resume};

/// Directory layout of a data root.
#[derive(Debug, Clone)]
pub struct ResumeLayout {
    pub input: PathBuf,
    pub processed: PathBuf,
    pub errors: PathBuf,
    pub results: PathBuf,
}

impl ResumeLayout {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            input: data_dir.join("resumes"),
            processed: data_dir.join("processed_resumes"),
            errors: data_dir.join("errors"),
            results: data_dir.join("results"),
        }
    }

    pub fn variant_dir(&self, variant: NarrativeVariant) -> PathBuf {
        self.results.join(variant.directory_name())
    }

    fn all_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![
            self.input.clone(),
            self.processed.clone(),
            self.errors.clone(),
            self.results.clone(),
        ];
        dirs.extend(NarrativeVariant::ALL.iter().map(|v| self.variant_dir(*v)));
        dirs
    }
}

pub struct LocalResumeStorage {
    layout: ResumeLayout,
}

impl LocalResumeStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            layout: ResumeLayout::new(&data_dir),
        }
    }

    #[cfg(test)]
    pub fn layout(&self) -> &ResumeLayout {
        &self.layout
    }

    async fn files_with_extension(
        &self,
        dir: &Path,
        extension: &str,
    ) -> Result<Vec<PathBuf>, ResumeStorageError> {
        let mut entries = fs::read_dir(dir).await.map_err(|e| io_error(dir, e))?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(dir, e))? {
            let path = entry.path();
            let is_file = entry
                .file_type()
                .await
                .map_err(|e| io_error(&path, e))?
                .is_file();

            if is_file && path.extension().is_some_and(|ext| ext == extension) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }
}

fn io_error(path: &Path, error: std::io::Error) -> ResumeStorageError {
    match error.kind() {
        ErrorKind::NotFound => ResumeStorageError::FileNotFound(path.display().to_string()),
        _ => ResumeStorageError::IoError(format!("{}: {}", path.display(), error)),
    }
}

fn file_name_of(path: &Path) -> Result<&std::ffi::OsStr, ResumeStorageError> {
    path.file_name()
        .ok_or_else(|| ResumeStorageError::InvalidPath(path.display().to_string()))
}

#[async_trait]
impl ResumeStorage for LocalResumeStorage {
    async fn prepare(&self) -> Result<(), ResumeStorageError> {
        for dir in self.layout.all_dirs() {
            fs::create_dir_all(&dir)
                .await
                .map_err(|e| io_error(&dir, e))?;
        }
        Ok(())
    }

    async fn discover(&self) -> Result<Vec<PathBuf>, ResumeStorageError> {
        self.files_with_extension(&self.layout.input, "txt").await
    }

    async fn read_resume(&self, path: &Path) -> Result<Resume, ResumeStorageError> {
        let raw_text = fs::read_to_string(path)
            .await
            .map_err(|e| io_error(path, e))?;

        Ok(Resume::new(path.to_path_buf(), raw_text))
    }

    async fn save_record(&self, record: &NarrativeRecord) -> Result<PathBuf, ResumeStorageError> {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let path = self
            .layout
            .variant_dir(record.variant())
            .join(format!("{}_{}.json", record.filename(), timestamp));

        let json = serde_json::to_string_pretty(record)
            .map_err(|e| ResumeStorageError::IoError(e.to_string()))?;

        fs::write(&path, json)
            .await
            .map_err(|e| io_error(&path, e))?;

        info!("Saved JSON file: {}", path.display());
        Ok(path)
    }

    async fn list_records(
        &self,
        variant: NarrativeVariant,
    ) -> Result<Vec<PathBuf>, ResumeStorageError> {
        self.files_with_extension(&self.layout.variant_dir(variant), "json")
            .await
    }

    async fn load_record(&self, path: &Path) -> Result<NarrativeRecord, ResumeStorageError> {
        let contents = fs::read(path).await.map_err(|e| io_error(path, e))?;

        serde_json::from_slice(&contents).map_err(|e| ResumeStorageError::MalformedDocument {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    async fn relocate(
        &self,
        path: &Path,
        disposition: Disposition,
    ) -> Result<PathBuf, ResumeStorageError> {
        let target_dir = match disposition {
            Disposition::Processed => &self.layout.processed,
            Disposition::Errors => &self.layout.errors,
        };
        let destination = target_dir.join(file_name_of(path)?);

        fs::rename(path, &destination)
            .await
            .map_err(|e| io_error(path, e))?;

        Ok(destination)
    }
}
