use axum::{
    Json, Router,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{HeaderValue, Method},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use super::create_story;
use crate::{
    actuators::story::dto::{CreateStoryRequest, CreateStoryResponse},
    service::{self, CoercibleResult},
};

#[derive(Clone)]
pub struct AppState {
    client: reqwest::Client,
}

impl AppState {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

pub fn build_router(state: AppState, static_dir: &str) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([http::header::CONTENT_TYPE]);

    // Build router
    Router::new()
        .route("/health", get(health_check))
        .route("/api/create-story", post(create_story_handler))
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Takes the raw body so malformed payloads still get the `{error}` shape
/// instead of axum's plain-text rejection.
pub async fn create_story_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> service::Result<Json<CreateStoryResponse>> {
    let body = body.into_service_result()?;
    let request = CreateStoryRequest::from_json(&body)?;
    create_story(&state.client, &request).await.map(Json)
}
