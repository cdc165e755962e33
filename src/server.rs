//! HTTP surface: the dashboard page, its layout, and the update endpoint.

use std::path::Path;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::services::ServeDir;

use crate::app::Dashboard;
use crate::error::DashboardError;
use crate::layout::PageLayout;
use crate::reactive::{Prop, Update};
use crate::state::SelectionState;

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Body of `POST /api/update`. Property ids stay strings here so an
/// unknown id is reported as a [`DashboardError::UnknownProperty`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateRequest {
    pub changed: Vec<String>,
    pub state: SelectionState,
}

impl UpdateRequest {
    pub fn props(&self) -> Result<Vec<Prop>, DashboardError> {
        self.changed.iter().map(|id| id.parse()).collect()
    }
}

/// A failed request, reported as `{ "error": message }`.
#[derive(Debug)]
pub enum ApiError {
    Dashboard(DashboardError),
    /// The body was not JSON, or did not match [`UpdateRequest`].
    Body(JsonRejection),
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        ApiError::Dashboard(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Dashboard(err) => {
                let status = match err {
                    DashboardError::MissingColumn { .. }
                    | DashboardError::ColumnTypeMismatch { .. }
                    | DashboardError::UnknownProperty(_)
                    | DashboardError::PropValueMismatch { .. } => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string())
            }
            ApiError::Body(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
        };
        if status.is_server_error() {
            log::error!("callback failed: {message}");
        } else {
            log::warn!("rejected update: {message}");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Routes over a shared, read-only dashboard.
pub fn router(dashboard: Arc<Dashboard>, assets_dir: &Path) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/layout", get(layout))
        .route("/api/update", post(update))
        .nest_service("/assets", ServeDir::new(assets_dir))
        .with_state(dashboard)
}

/// Bind and serve until the process stops.
pub async fn serve(dashboard: Arc<Dashboard>, addr: std::net::SocketAddr, assets_dir: &Path) -> anyhow::Result<()> {
    let app = router(dashboard, assets_dir);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Dashboard listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> &'static str {
    "ok"
}

/// Rebuilt on every request so a page reload starts from the defaults.
async fn layout(State(dashboard): State<Arc<Dashboard>>) -> Result<Json<PageLayout>, ApiError> {
    Ok(Json(dashboard.layout()?))
}

async fn update(
    State(dashboard): State<Arc<Dashboard>>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<Update>, ApiError> {
    let Json(request) = payload?;
    let changed = request.props()?;
    log::debug!("update for {changed:?}");
    Ok(Json(dashboard.update(&changed, request.state)?))
}
