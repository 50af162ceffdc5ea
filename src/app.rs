use axum::{
    error_handling::HandleErrorLayer, extract::DefaultBodyLimit, http::StatusCode, routing::get,
    BoxError, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::errors::AppError;
use crate::handlers::{self, AppState};
use crate::openapi::ApiDoc;

/// Builds the full HTTP application around `state`.
///
/// `/` and `/test` sit outside the body limit; `/api/*` routes carry it.
/// Oversized bodies and timeouts are answered with the usual `{"detail"}` body.
pub fn build_router(state: Arc<AppState>) -> Router {
    let max_body_bytes = state.config.max_body_bytes;
    let timeout_secs = state.config.request_timeout_secs;

    let api_routes = Router::new()
        .route(
            "/api/leads",
            get(handlers::list_leads).post(handlers::create_lead),
        )
        .layer(DefaultBodyLimit::max(max_body_bytes));

    Router::new()
        .route("/", get(handlers::read_root))
        .route("/test", get(handlers::test_database))
        .merge(api_routes)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                    middleware_error(err, timeout_secs)
                }))
                .layer(TimeoutLayer::new(Duration::from_secs(timeout_secs)))
                .layer(CorsLayer::permissive()),
        )
}

/// Maps failures raised by the middleware stack onto `AppError`.
fn middleware_error(err: BoxError, timeout_secs: u64) -> AppError {
    if err.is::<tower::timeout::error::Elapsed>() {
        AppError::Timeout(timeout_secs)
    } else {
        AppError::Rejected {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: format!("Unhandled internal error: {}", err),
        }
    }
}
