use axum::{
    extract::{Query, State},
    Extension, Json,
};
use cchc_analytics::Dashboard;
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_source_error, selection_from_pairs, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct ReloadData {
    rows: usize,
    topics: usize,
}

/// Every panel for the selection. Empty aggregates come back as empty-state
/// panels with `200`, and the selection is echoed unchanged.
pub(super) async fn get_dashboard(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ApiResponse<Dashboard>>, ApiError> {
    let selection = selection_from_pairs(&req_id.0, pairs)?;
    let model = state
        .model()
        .await
        .map_err(|e| map_source_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: model.dashboard(&selection),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn reload_dataset(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ReloadData>>, ApiError> {
    let model = state
        .reload()
        .await
        .map_err(|e| map_source_error(req_id.0.clone(), &e))?;
    tracing::info!(
        request_id = %req_id.0,
        rows = model.dataset().len(),
        "dataset reloaded"
    );

    Ok(Json(ApiResponse {
        data: ReloadData {
            rows: model.dataset().len(),
            topics: model.scale().entries().len(),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
