use serde::{Deserialize, Serialize};

use super::Corpus;

/// Query-time selector choosing the collection and the payload fields returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Resume,
    Story,
    Personality,
}

impl SearchMode {
    pub fn corpus(&self) -> Corpus {
        match self {
            SearchMode::Resume => Corpus::FullText,
            SearchMode::Story => Corpus::Story,
            SearchMode::Personality => Corpus::Personality,
        }
    }

    pub fn collection_name(&self) -> &'static str {
        self.corpus().collection_name()
    }

    pub fn includes_story(&self) -> bool {
        matches!(self, SearchMode::Story | SearchMode::Resume)
    }

    pub fn includes_personality(&self) -> bool {
        matches!(self, SearchMode::Personality | SearchMode::Resume)
    }

    pub fn includes_raw_text(&self) -> bool {
        matches!(self, SearchMode::Resume)
    }
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SearchMode::Resume => "resume",
            SearchMode::Story => "story",
            SearchMode::Personality => "personality",
        };
        write!(f, "{}", name)
    }
}
