mod aggregates;
mod dashboard;
mod options;

use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use cchc_analytics::{AnalyticsError, DashboardModel};
use cchc_core::FilterSelection;
use cchc_source::{DataSource, SourceError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{request_id, RequestId};

/// Shared handler state.
///
/// The model is rebuilt only when the source hands back a different dataset,
/// so the color scale is derived once per load.
#[derive(Clone)]
pub struct AppState {
    source: Arc<DataSource>,
    model: Arc<Mutex<Option<Arc<DashboardModel>>>>,
}

impl AppState {
    pub fn new(source: DataSource) -> Self {
        Self {
            source: Arc::new(source),
            model: Arc::new(Mutex::new(None)),
        }
    }

    /// The model for the currently cached dataset, loading it if needed.
    pub async fn model(&self) -> Result<Arc<DashboardModel>, SourceError> {
        let dataset = self.source.load().await?;
        let mut slot = self.model.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(model) = slot.as_ref() {
            if Arc::ptr_eq(model.dataset(), &dataset) {
                return Ok(Arc::clone(model));
            }
        }
        let model = Arc::new(DashboardModel::new(dataset));
        *slot = Some(Arc::clone(&model));
        Ok(model)
    }

    /// Refetches the dataset and swaps in a fresh model.
    pub async fn reload(&self) -> Result<Arc<DashboardModel>, SourceError> {
        let reloaded = self.source.reload().await;
        let mut slot = self.model.lock().unwrap_or_else(PoisonError::into_inner);
        match reloaded {
            Ok(dataset) => {
                let model = Arc::new(DashboardModel::new(dataset));
                *slot = Some(Arc::clone(&model));
                Ok(model)
            }
            Err(e) => {
                *slot = None;
                Err(e)
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    dataset: &'static str,
    rows: Option<usize>,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" | "empty_aggregate" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "schema_mismatch" => StatusCode::BAD_GATEWAY,
            "source_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_source_error(request_id: String, error: &SourceError) -> ApiError {
    tracing::error!(error = %error, "dataset load failed");
    let code = match error {
        SourceError::SchemaMismatch { .. } => "schema_mismatch",
        e if e.is_unavailable() => "source_unavailable",
        _ => "internal_error",
    };
    ApiError::new(request_id, code, error.to_string())
}

pub(super) fn map_analytics_error(request_id: String, error: &AnalyticsError) -> ApiError {
    match error {
        AnalyticsError::EmptyAggregate { view } => {
            tracing::info!(%view, "aggregate empty for selection");
            ApiError::new(request_id, "empty_aggregate", error.to_string())
        }
    }
}

/// Builds a selection from query pairs.
///
/// Keys repeat for multi-selections (`?region=A&region=B`); an absent key
/// leaves that level unconstrained. Blank values are ignored.
pub(super) fn selection_from_pairs(
    request_id: &str,
    pairs: Vec<(String, String)>,
) -> Result<FilterSelection, ApiError> {
    let mut selection = FilterSelection::new();
    for (key, value) in pairs {
        let value = value.trim();
        let level = match key.as_str() {
            "region" => &mut selection.regions,
            "comuna" => &mut selection.comunas,
            "topic" => &mut selection.topics,
            other => {
                return Err(ApiError::new(
                    request_id,
                    "validation_error",
                    format!("unknown query parameter '{other}'"),
                ));
            }
        };
        if !value.is_empty() {
            level.insert(value.to_owned());
        }
    }
    Ok(selection)
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/options", get(options::get_options))
        .route("/api/v1/domain", get(options::get_domain))
        .route("/api/v1/topics", get(aggregates::get_topic_counts))
        .route(
            "/api/v1/subtopics/counts",
            get(aggregates::get_subtopic_counts),
        )
        .route(
            "/api/v1/subtopics/relevance",
            get(aggregates::get_subtopic_relevance),
        )
        .route("/api/v1/dashboard", get(dashboard::get_dashboard))
        .route("/api/v1/dataset/reload", post(dashboard::reload_dataset))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match state.source.cached().await {
        Some(dataset) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    dataset: "loaded",
                    rows: Some(dataset.len()),
                },
                meta,
            }),
        ),
        None => {
            tracing::warn!("health check: dataset not loaded");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        dataset: "unavailable",
                        rows: None,
                    },
                    meta,
                }),
            )
        }
    }
}
