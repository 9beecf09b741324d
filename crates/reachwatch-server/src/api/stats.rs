use axum::{extract::State, Extension, Json};
use reachwatch_core::{render_report, Snapshot};

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

pub(super) async fn get_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Snapshot>> {
    let snapshot = state.collector.get_snapshot().await;
    Json(ApiResponse {
        data: Snapshot::clone(&snapshot),
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn get_report(State(state): State<AppState>) -> String {
    let snapshot = state.collector.get_snapshot().await;
    let profiles = state.settings.profiles().await;
    render_report(&snapshot, &profiles, state.collector.ttl().as_secs())
}
