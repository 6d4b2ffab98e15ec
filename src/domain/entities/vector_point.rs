use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::NarrativeRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointPayload {
    pub filename: String,
    pub raw_text: String,
    pub processed_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,
}

impl PointPayload {
    /// Payload shared by every corpus: filename, raw text and processing date.
    pub fn base(record: &NarrativeRecord) -> Self {
        Self {
            filename: record.filename().to_string(),
            raw_text: record.raw_text().to_string(),
            processed_date: record.processed_date(),
            story: None,
            personality: None,
        }
    }

    pub fn with_story(mut self, story: &str) -> Self {
        self.story = Some(story.to_string());
        self
    }

    pub fn with_personality(mut self, personality: &str) -> Self {
        self.personality = Some(personality.to_string());
        self
    }

    pub fn to_json(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorPoint {
    id: Uuid,
    vector: Vec<f32>,
    payload: PointPayload,
}

impl VectorPoint {
    pub fn new(vector: Vec<f32>, payload: PointPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            vector,
            payload,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }

    pub fn payload(&self) -> &PointPayload {
        &self.payload
    }
}

/// A search hit as returned by the vector store. The payload is kept loose
/// because collections may have been filled by other writers.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPoint {
    pub id: String,
    pub score: f32,
    pub payload: Map<String, Value>,
}

impl ScoredPoint {
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }
}
