use axum::Router;
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::infrastructure::config::ServerConfig;
use crate::presentation::http::{
    handlers::SearchHandler,
    routes::{health_routes, search_routes},
};

const REQUEST_BODY_LIMIT: usize = 1024 * 1024;

pub struct HttpServer {
    search_handler: Arc<SearchHandler>,
    allowed_origins: Vec<HeaderValue>,
    bind_address: String,
}

impl HttpServer {
    pub fn new(
        search_handler: Arc<SearchHandler>,
        config: &ServerConfig,
    ) -> Result<Self, axum::http::header::InvalidHeaderValue> {
        let allowed_origins = config
            .cors_origins
            .iter()
            .map(|origin| HeaderValue::from_str(origin))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            search_handler,
            allowed_origins,
            bind_address: config.bind_address(),
        })
    }

    fn cors_layer(&self) -> CorsLayer {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(self.allowed_origins.clone()))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([CONTENT_TYPE, ACCEPT])
    }

    pub fn router(&self) -> Router {
        Router::new()
            .merge(health_routes())
            .merge(search_routes(self.search_handler.clone()))
            .layer(self.cors_layer())
            .layer(RequestBodyLimitLayer::new(REQUEST_BODY_LIMIT))
            .layer(
                TraceLayer::new_for_http()
                    .on_request(
                        |request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {
                            tracing::info!(
                                "Received request: {} {}",
                                request.method(),
                                request.uri()
                            );
                        },
                    )
                    .on_response(
                        |response: &axum::http::Response<axum::body::Body>,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::info!(
                                "Response: {} (took {} ms)",
                                response.status(),
                                latency.as_millis()
                            );
                        },
                    )
                    .on_failure(
                        |error: ServerErrorsFailureClass,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::error!(
                                "Request failed: {:?} (took {} ms)",
                                error,
                                latency.as_millis()
                            );
                        },
                    ),
            )
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        let listener = TcpListener::bind(&self.bind_address).await?;
        info!("Listening on {}", self.bind_address);
        axum::serve(listener, app).await?;

        Ok(())
    }
}
