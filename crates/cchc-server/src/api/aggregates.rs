//! Single-aggregate endpoints. An empty aggregate answers `404`
//! `empty_aggregate`; the dashboard endpoint renders it as a panel instead.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use cchc_analytics::{
    apply_filters, build_chart, subtopic_counts, subtopic_relevance, topic_counts, BarChart,
    ValueFormat,
};

use crate::middleware::RequestId;

use super::{
    map_analytics_error, map_source_error, selection_from_pairs, ApiError, ApiResponse, AppState,
    ResponseMeta,
};

/// Distinct messages per topic. Topic keys are accepted but ignored.
pub(super) async fn get_topic_counts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ApiResponse<BarChart>>, ApiError> {
    let selection = selection_from_pairs(&req_id.0, pairs)?.without_topics();
    let model = state
        .model()
        .await
        .map_err(|e| map_source_error(req_id.0.clone(), &e))?;

    let filtered = apply_filters(model.dataset(), &selection);
    let counts = topic_counts(&filtered).map_err(|e| map_analytics_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: build_chart(&counts, model.scale(), ValueFormat::Count),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_subtopic_counts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ApiResponse<BarChart>>, ApiError> {
    let selection = selection_from_pairs(&req_id.0, pairs)?;
    let model = state
        .model()
        .await
        .map_err(|e| map_source_error(req_id.0.clone(), &e))?;

    let filtered = apply_filters(model.dataset(), &selection);
    let counts =
        subtopic_counts(&filtered).map_err(|e| map_analytics_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: build_chart(&counts, model.scale(), ValueFormat::Count),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Percentage shares per sub-topic, renormalized over the selection.
pub(super) async fn get_subtopic_relevance(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ApiResponse<BarChart>>, ApiError> {
    let selection = selection_from_pairs(&req_id.0, pairs)?;
    let model = state
        .model()
        .await
        .map_err(|e| map_source_error(req_id.0.clone(), &e))?;

    let filtered = apply_filters(model.dataset(), &selection);
    let shares =
        subtopic_relevance(&filtered).map_err(|e| map_analytics_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: build_chart(&shares, model.scale(), ValueFormat::Percent),
        meta: ResponseMeta::new(req_id.0),
    }))
}
