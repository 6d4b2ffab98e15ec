use crate::domain::entities::{NarrativeRecord, NarrativeVariant, PointPayload};

pub const STORY_COLLECTION: &str = "storyteller";
pub const PERSONALITY_COLLECTION: &str = "personality";
pub const FULL_TEXT_COLLECTION: &str = "Full_Texts";

/// One indexed body of text: which documents it is read from, which text is
/// embedded, and which collection receives the points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corpus {
    Story,
    Personality,
    FullText,
}

impl Corpus {
    pub const ALL: [Corpus; 3] = [Corpus::Story, Corpus::Personality, Corpus::FullText];

    pub fn collection_name(&self) -> &'static str {
        match self {
            Corpus::Story => STORY_COLLECTION,
            Corpus::Personality => PERSONALITY_COLLECTION,
            Corpus::FullText => FULL_TEXT_COLLECTION,
        }
    }

    /// The full-text corpus re-reads the story documents, one per resume.
    pub fn source_variant(&self) -> NarrativeVariant {
        match self {
            Corpus::Story | Corpus::FullText => NarrativeVariant::Story,
            Corpus::Personality => NarrativeVariant::Personality,
        }
    }

    pub fn text_of<'a>(&self, record: &'a NarrativeRecord) -> &'a str {
        match self {
            Corpus::Story | Corpus::Personality => record.narrative_text(),
            Corpus::FullText => record.raw_text(),
        }
    }

    pub fn payload_for(&self, record: &NarrativeRecord) -> PointPayload {
        let payload = PointPayload::base(record);
        match self {
            Corpus::Story => payload.with_story(record.narrative_text()),
            Corpus::Personality => payload.with_personality(record.narrative_text()),
            Corpus::FullText => payload,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Corpus::Story => "storyteller",
            Corpus::Personality => "personality",
            Corpus::FullText => "full text",
        }
    }
}

impl std::fmt::Display for Corpus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
