use axum::{
    extract::{Query, State},
    Extension, Json,
};
use cchc_analytics::{FilterOptions, TopicColor};

use crate::middleware::RequestId;

use super::{map_source_error, selection_from_pairs, ApiError, ApiResponse, AppState, ResponseMeta};

/// Region, comuna and topic choices. Comunas follow any `region` keys given.
pub(super) async fn get_options(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ApiResponse<FilterOptions>>, ApiError> {
    let selection = selection_from_pairs(&req_id.0, pairs)?;
    let model = state
        .model()
        .await
        .map_err(|e| map_source_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: model.options(&selection),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// The topic color domain of the full dataset, in domain order.
pub(super) async fn get_domain(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<TopicColor>>>, ApiError> {
    let model = state
        .model()
        .await
        .map_err(|e| map_source_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: model.scale().entries().to_vec(),
        meta: ResponseMeta::new(req_id.0),
    }))
}
