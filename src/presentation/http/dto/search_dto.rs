use serde::{Deserialize, Serialize};

use crate::application::services::search_service::SearchHit;
use crate::domain::value_objects::SearchMode;

#[derive(Debug, Deserialize)]
pub struct SearchRequestDto {
    pub query: String,
    pub mode: SearchMode,
}

#[derive(Debug, Serialize)]
pub struct SearchResponseDto {
    pub results: Vec<SearchResultDto>,
}

#[derive(Debug, Serialize)]
pub struct SearchResultDto {
    pub filename: String,
    pub score: f32,
    pub story: Option<String>,
    pub personality: Option<String>,
    #[serde(rename = "rawText")]
    pub raw_text: Option<String>,
}

impl From<SearchHit> for SearchResultDto {
    fn from(hit: SearchHit) -> Self {
        Self {
            filename: hit.filename,
            score: hit.score,
            story: hit.story,
            personality: hit.personality,
            raw_text: hit.raw_text,
        }
    }
}

impl From<Vec<SearchHit>> for SearchResponseDto {
    fn from(hits: Vec<SearchHit>) -> Self {
        Self {
            results: hits.into_iter().map(SearchResultDto::from).collect(),
        }
    }
}
