use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::domain::Application;
use super::registry::{AllocationSink, FundAccountRegistry, RegistryError};
use super::service::{AllocationServiceError, FundAllocationService};

/// Router builder exposing fund selection over HTTP.
pub fn allocation_router<R, S>(service: Arc<FundAllocationService<R, S>>) -> Router
where
    R: FundAccountRegistry + 'static,
    S: AllocationSink + 'static,
{
    Router::new()
        .route("/api/v1/allocations", post(allocate_handler::<R, S>))
        .route("/api/v1/allocations/preview", post(preview_handler::<R, S>))
        .with_state(service)
}

pub(crate) async fn allocate_handler<R, S>(
    State(service): State<Arc<FundAllocationService<R, S>>>,
    axum::Json(application): axum::Json<Application>,
) -> Response
where
    R: FundAccountRegistry + 'static,
    S: AllocationSink + 'static,
{
    match service.process_application_created(&application) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn preview_handler<R, S>(
    State(service): State<Arc<FundAllocationService<R, S>>>,
    axum::Json(application): axum::Json<Application>,
) -> Response
where
    R: FundAccountRegistry + 'static,
    S: AllocationSink + 'static,
{
    match service.preview(&application) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: AllocationServiceError) -> Response {
    let status = match &error {
        AllocationServiceError::Configuration(_)
        | AllocationServiceError::Registry(RegistryError::Configuration(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        AllocationServiceError::Registry(RegistryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        AllocationServiceError::Allocation(_) => StatusCode::BAD_GATEWAY,
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
