pub mod narrative_record;
pub mod resume;
pub mod vector_point;

pub use narrative_record::{NarrativeRecord, NarrativeVariant};
pub use resume::Resume;
pub use vector_point::{PointPayload, ScoredPoint, VectorPoint};
