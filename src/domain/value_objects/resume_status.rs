use serde::{Deserialize, Serialize};

/// Lifecycle of one resume file through the per-file ingestion steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResumeStatus {
    Discovered,
    Narrated,
    Persisted,
    Processed,
    Failed(String),
}

impl ResumeStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResumeStatus::Processed | ResumeStatus::Failed(_))
    }

    pub fn can_transition_to(&self, new_status: &ResumeStatus) -> bool {
        match (self, new_status) {
            (ResumeStatus::Discovered, ResumeStatus::Narrated) => true,
            (ResumeStatus::Narrated, ResumeStatus::Persisted) => true,
            (ResumeStatus::Persisted, ResumeStatus::Processed) => true,
            (current, ResumeStatus::Failed(_)) => !current.is_terminal(),
            _ => false,
        }
    }

    pub fn transition_to(self, new_status: ResumeStatus) -> Result<ResumeStatus, String> {
        if self.can_transition_to(&new_status) {
            Ok(new_status)
        } else {
            Err(format!(
                "Invalid resume status transition: {} -> {}",
                self, new_status
            ))
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ResumeStatus::Failed(error) => Some(error),
            _ => None,
        }
    }
}

impl Default for ResumeStatus {
    fn default() -> Self {
        ResumeStatus::Discovered
    }
}

impl std::fmt::Display for ResumeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResumeStatus::Discovered => "discovered",
            ResumeStatus::Narrated => "narrated",
            ResumeStatus::Persisted => "persisted",
            ResumeStatus::Processed => "processed",
            ResumeStatus::Failed(_) => "failed",
        };
        write!(f, "{}", name)
    }
}
