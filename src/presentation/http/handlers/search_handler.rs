use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;
use tracing::error;

use crate::application::services::SearchService;
use crate::presentation::http::dto::{ErrorResponseDto, SearchRequestDto, SearchResponseDto};

pub struct SearchHandler {
    search_service: Arc<SearchService>,
}

impl SearchHandler {
    pub fn new(search_service: Arc<SearchService>) -> Self {
        Self { search_service }
    }

    pub async fn search(
        State(handler): State<Arc<SearchHandler>>,
        Json(request): Json<SearchRequestDto>,
    ) -> impl IntoResponse {
        match handler
            .search_service
            .search(&request.query, request.mode)
            .await
        {
            Ok(hits) => (StatusCode::OK, Json(SearchResponseDto::from(hits))).into_response(),
            Err(e) => {
                error!("Search error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponseDto::new(e.to_string())),
                )
                    .into_response()
            }
        }
    }
}
