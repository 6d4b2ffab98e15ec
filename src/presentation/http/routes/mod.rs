pub mod health_routes;
pub mod search_routes;

pub use health_routes::*;
pub use search_routes::*;
