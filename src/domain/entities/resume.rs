use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct Resume {
    filename: String,
    path: PathBuf,
    raw_text: String,
}

impl Resume {
    pub fn new(path: PathBuf, raw_text: String) -> Self {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        Self {
            filename,
            path,
            raw_text,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// First `max_chars` characters of the resume, for log lines.
    pub fn preview(&self, max_chars: usize) -> String {
        self.raw_text.chars().take(max_chars).collect()
    }
}
