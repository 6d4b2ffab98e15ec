use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMetric {
    Cosine,
    Dot,
    Euclid,
    Manhattan,
}

impl std::fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Dot => "dot",
            DistanceMetric::Euclid => "euclid",
            DistanceMetric::Manhattan => "manhattan",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSchema {
    pub name: String,
    pub vector_size: u64,
    pub distance: DistanceMetric,
}

impl CollectionSchema {
    pub fn new(name: impl Into<String>, vector_size: u64, distance: DistanceMetric) -> Self {
        Self {
            name: name.into(),
            vector_size,
            distance,
        }
    }

    pub fn cosine(name: impl Into<String>, vector_size: u64) -> Self {
        Self::new(name, vector_size, DistanceMetric::Cosine)
    }

    /// Whether an existing collection can hold this schema's vectors.
    pub fn is_compatible_with(&self, other: &CollectionSchema) -> bool {
        self.vector_size == other.vector_size && self.distance == other.distance
    }
}

impl std::fmt::Display for CollectionSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (size {}, {})",
            self.name, self.vector_size, self.distance
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compatibility_ignores_name() {
        let expected = CollectionSchema::cosine("storyteller", 1024);

        assert!(expected.is_compatible_with(&CollectionSchema::cosine("other", 1024)));
        assert!(!expected.is_compatible_with(&CollectionSchema::cosine("storyteller", 1536)));
        assert!(!expected.is_compatible_with(&CollectionSchema::new(
            "storyteller",
            1024,
            DistanceMetric::Dot
        )));
    }

    #[test]
    fn test_display() {
        let schema = CollectionSchema::cosine("personality", 1024);
        assert_eq!(schema.to_string(), "personality (size 1024, cosine)");
    }
}
