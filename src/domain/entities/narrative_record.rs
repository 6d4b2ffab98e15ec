use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Resume;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeVariant {
    Story,
    Personality,
}

impl NarrativeVariant {
    pub const ALL: [NarrativeVariant; 2] = [NarrativeVariant::Story, NarrativeVariant::Personality];

    pub fn as_str(&self) -> &'static str {
        match self {
            NarrativeVariant::Story => "story",
            NarrativeVariant::Personality => "personality",
        }
    }

    /// Results subdirectory holding this variant's documents.
    pub fn directory_name(&self) -> &'static str {
        match self {
            NarrativeVariant::Story => "storyteller",
            NarrativeVariant::Personality => "personality",
        }
    }
}

impl std::fmt::Display for NarrativeVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The generated text, tagged with its variant. Serializes as
/// `{"type": "story", "story": "..."}` or `{"type": "personality", "personality": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Narrative {
    Story { story: String },
    Personality { personality: String },
}

impl Narrative {
    pub fn new(variant: NarrativeVariant, text: String) -> Self {
        match variant {
            NarrativeVariant::Story => Narrative::Story { story: text },
            NarrativeVariant::Personality => Narrative::Personality { personality: text },
        }
    }

    pub fn variant(&self) -> NarrativeVariant {
        match self {
            Narrative::Story { .. } => NarrativeVariant::Story,
            Narrative::Personality { .. } => NarrativeVariant::Personality,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Narrative::Story { story } => story,
            Narrative::Personality { personality } => personality,
        }
    }
}

/// Intermediate document written once per resume per variant and read back
/// by the embedding phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeRecord {
    filename: String,
    raw_text: String,
    processed_date: DateTime<Utc>,
    #[serde(flatten)]
    narrative: Narrative,
}

impl NarrativeRecord {
    pub fn new(
        resume: &Resume,
        variant: NarrativeVariant,
        narrative_text: String,
        processed_date: DateTime<Utc>,
    ) -> Self {
        Self {
            filename: resume.filename().to_string(),
            raw_text: resume.raw_text().to_string(),
            processed_date,
            narrative: Narrative::new(variant, narrative_text),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn processed_date(&self) -> DateTime<Utc> {
        self.processed_date
    }

    pub fn variant(&self) -> NarrativeVariant {
        self.narrative.variant()
    }

    pub fn narrative_text(&self) -> &str {
        self.narrative.text()
    }
}
