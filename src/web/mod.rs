//! HTTP surface for the Thing service.
//!
//! Routes mirror the action-style paths the browser client calls
//! (`/thing/getThings`, `/thing/validateName`, ...). Bodies are camelCase
//! JSON; errors come back as [`ErrorResponse`].

pub mod handlers;

use crate::core::ServiceError;
use crate::service::ThingService;
use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ThingService>,
}

impl AppState {
    pub fn new(service: Arc<ThingService>) -> Self {
        Self { service }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::healthcheck))
        .route("/thing/getThings", get(handlers::get_things))
        .route("/thing/getThing/:id", get(handlers::get_thing))
        .route("/thing/validateName", post(handlers::validate_name))
        .route("/thing/validate", post(handlers::validate))
        .route("/thing/save", post(handlers::save))
        .route("/thing/remove", delete(handlers::remove))
        .route("/thing/remove/:id", delete(handlers::remove_by_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin, method and header.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// `code` of the error body sent when the revalidation gate refuses a write.
pub const VALIDATION_FAILED: &str = "validation_failed";

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug)]
pub enum WebError {
    Service(ServiceError),
    NotFound(String),
}

impl From<ServiceError> for WebError {
    fn from(err: ServiceError) -> Self {
        WebError::Service(err)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            WebError::Service(ServiceError::Validation(msg)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                msg,
                VALIDATION_FAILED.to_string(),
            ),
            WebError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "not_found".to_string()),
            WebError::Service(ServiceError::Storage(msg)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg,
                "storage_error".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: message,
            code,
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WebError>;
