pub mod collection_schema;
pub mod corpus;
pub mod resume_status;
pub mod search_mode;

pub use collection_schema::{CollectionSchema, DistanceMetric};
pub use corpus::Corpus;
pub use resume_status::ResumeStatus;
pub use search_mode::SearchMode;
