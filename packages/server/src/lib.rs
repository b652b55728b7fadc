pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod routes;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use intake_common::response::{GENERIC_FAILURE_MESSAGE, SubmitResponse};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{CorsConfig, StorageBackend};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Runway VNEST Application Intake API",
        version = "1.0.0",
        description = "Submission endpoint for the startup pre-incubation application form"
    ),
    tags(
        (name = "Applications", description = "Application submission and lookup"),
    ),
)]
struct ApiDoc;

/// Mount point for decks kept by the filesystem backend. The default
/// `storage.public_base_url` points here.
pub const FILES_ROUTE: &str = "/files";

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);
    let files = match state.config.storage.backend {
        StorageBackend::Filesystem => Some(ServeDir::new(&state.config.storage.local_root)),
        StorageBackend::S3 => None,
    };

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes(&state.config))
        .split_for_parts();

    let router = router
        .route("/health", get(health))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api));

    let router = match files {
        Some(files) => router.nest_service(FILES_ROUTE, files),
        None => router,
    }
    .layer(CatchPanicLayer::custom(panic_response));

    match cors {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

async fn health() -> &'static str {
    "ok"
}

fn panic_response(_: Box<dyn std::any::Any + Send + 'static>) -> Response {
    tracing::error!("Handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(SubmitResponse::failure(GENERIC_FAILURE_MESSAGE)),
    )
        .into_response()
}

/// `None` when no origins are configured.
fn cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    if config.allow_origins.is_empty() {
        return None;
    }

    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.max_age));

    if config.allow_origins.iter().any(|o| o == "*") {
        return Some(layer.allow_origin(Any));
    }

    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    Some(layer.allow_origin(origins))
}
