pub mod response_dto;
pub mod search_dto;

pub use response_dto::*;
pub use search_dto::*;
