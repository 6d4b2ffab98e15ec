use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponseDto {
    pub status: String,
}

impl HealthResponseDto {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// Body of every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponseDto {
    pub detail: String,
}

impl ErrorResponseDto {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
