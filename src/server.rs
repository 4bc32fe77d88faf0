//! HTTP request adapter
//!
//! Thin boundary in front of the pipeline: one `POST /customizations` route
//! that deserializes the request envelope, runs the blocking pipeline on a
//! worker thread, and maps the outcome to a status plus body. The core only
//! distinguishes success from failure; stage detail stays in the logs, the
//! caller gets the error's message string.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use crate::pipeline::{CustomizationsRequest, Pipeline};

/// Shared state for the customizations route
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
}

/// Build the application router
pub fn router(pipeline: Pipeline) -> Router {
    let state = AppState {
        pipeline: Arc::new(pipeline),
    };

    Router::new()
        .route("/customizations", post(customizations_handler))
        .with_state(state)
}

/// Handler for POST /customizations
async fn customizations_handler(
    State(state): State<AppState>,
    Json(request): Json<CustomizationsRequest>,
) -> Response {
    if request.profile.is_empty() || request.datastream.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            "profile and datastream must be non-empty",
        )
            .into_response();
    }

    let pipeline = state.pipeline.clone();
    let profile = request.profile.clone();
    let result = tokio::task::spawn_blocking(move || pipeline.run(&request)).await;

    match result {
        Ok(Ok(body)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Ok(Err(err)) => {
            tracing::error!(
                profile = %profile,
                error = %err,
                "Customizations run failed"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
        Err(join_err) => {
            tracing::error!(
                profile = %profile,
                error = %join_err,
                "Customizations run aborted"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "customizations run aborted".to_string(),
            )
                .into_response()
        }
    }
}
