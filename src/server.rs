use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::Instrument;

use crate::fixtures::Fixtures;
use crate::intent::IntentParser;
use crate::pipeline::{self, DashboardResponse};
use crate::report::{CHARTS_JS, DASHBOARD_CSS};

const INDEX: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/index.html"));

#[derive(Clone)]
pub struct AppState {
    pub fixtures: Arc<Fixtures>,
    pub parser: Arc<dyn IntentParser>,
}

#[derive(Deserialize)]
pub struct DashboardRequest {
    #[serde(default)]
    query: String,
}

/// Error body `{"error": "..."}` with a non-2xx status.
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{err:#}"),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/charts.js", get(charts_js))
        .route("/dashboard.css", get(dashboard_css))
        .route("/health", get(health))
        .route("/generate-dashboard", post(generate_dashboard))
        .with_state(state)
}

pub async fn serve(state: AppState, bind_addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "dashboard server listening");
    axum::serve(listener, router(state))
        .await
        .context("server error")?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX)
}

async fn charts_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript; charset=utf-8")], CHARTS_JS)
}

async fn dashboard_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], DASHBOARD_CSS)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "vertex_ai_enabled": state.parser.ai_enabled(),
    }))
}

async fn generate_dashboard(
    State(state): State<AppState>,
    body: Result<Json<DashboardRequest>, JsonRejection>,
) -> Result<Json<DashboardResponse>, AppError> {
    let Json(request) = body?;
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("generate_dashboard", %request_id);

    let response = pipeline::generate_dashboard(
        state.parser.as_ref(),
        state.fixtures.clone(),
        &request.query,
        Utc::now().date_naive(),
    )
    .instrument(span)
    .await
    .map_err(|err| {
        tracing::error!(%request_id, error = %format!("{err:#}"), "dashboard generation failed");
        AppError::from(err)
    })?;

    Ok(Json(response))
}
