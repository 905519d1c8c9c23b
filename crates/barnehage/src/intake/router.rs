use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;

use super::domain::{ApplicationForm, ApplicationId};
use super::repository::IntakeRepository;
use super::service::IntakeService;

/// Router builder exposing the intake endpoints over an injected service.
pub fn intake_router<R>(service: Arc<IntakeService<R>>) -> Router
where
    R: IntakeRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/applications",
            get(list_handler::<R>).post(submit_handler::<R>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(status_handler::<R>),
        )
        .route("/api/v1/facilities", get(facilities_handler::<R>))
        .route("/api/v1/registry", get(registry_handler::<R>))
        .with_state(service)
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<IntakeService<R>>>,
    axum::Json(form): axum::Json<ApplicationForm>,
) -> Response
where
    R: IntakeRepository + 'static,
{
    match service.submit(form) {
        Ok(receipt) => (StatusCode::CREATED, axum::Json(receipt)).into_response(),
        Err(error) => internal_error(error),
    }
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<IntakeService<R>>>,
    Path(application_id): Path<u32>,
) -> Response
where
    R: IntakeRepository + 'static,
{
    match service.decision_for(ApplicationId(application_id)) {
        Ok(Some(view)) => (StatusCode::OK, axum::Json(view)).into_response(),
        Ok(None) => {
            let payload = json!({
                "error": format!("application {application_id} not found"),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error) => internal_error(error),
    }
}

pub(crate) async fn list_handler<R>(State(service): State<Arc<IntakeService<R>>>) -> Response
where
    R: IntakeRepository + 'static,
{
    match service.status_views() {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(error) => internal_error(error),
    }
}

pub(crate) async fn facilities_handler<R>(State(service): State<Arc<IntakeService<R>>>) -> Response
where
    R: IntakeRepository + 'static,
{
    match service.facilities() {
        Ok(facilities) => (StatusCode::OK, axum::Json(facilities)).into_response(),
        Err(error) => internal_error(error),
    }
}

pub(crate) async fn registry_handler<R>(State(service): State<Arc<IntakeService<R>>>) -> Response
where
    R: IntakeRepository + 'static,
{
    match service.registry() {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot)).into_response(),
        Err(error) => internal_error(error),
    }
}

fn internal_error(error: impl std::fmt::Display) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
