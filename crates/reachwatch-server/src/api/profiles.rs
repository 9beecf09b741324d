use axum::{
    extract::{Path, State},
    Extension, Json,
};
use reachwatch_core::{ConfigError, Platform};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct ProfileItem {
    pub key: &'static str,
    pub platform: Platform,
    pub description: &'static str,
    pub value: Option<String>,
}

impl ProfileItem {
    fn new(platform: Platform, value: Option<String>) -> Self {
        Self {
            key: platform.profile_key(),
            platform,
            description: platform.profile_description(),
            value,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateProfileRequest {
    pub value: String,
}

pub(super) async fn list_profiles(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<ProfileItem>>> {
    let data = state
        .settings
        .profiles()
        .await
        .into_iter()
        .map(|(platform, value)| ProfileItem::new(platform, value))
        .collect();

    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn update_profile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(key): Path<String>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<ProfileItem>>, ApiError> {
    let platform = state
        .settings
        .update_profile(&key, &body.value)
        .await
        .map_err(|e| map_config_error(req_id.0.clone(), &e))?;

    // The cached snapshot describes the previous target.
    state.collector.invalidate().await;

    let value = state.settings.target(platform).await;
    Ok(Json(ApiResponse {
        data: ProfileItem::new(platform, value),
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn map_config_error(request_id: String, error: &ConfigError) -> ApiError {
    match error {
        ConfigError::UnknownProfileKey(key) => {
            let known: Vec<&str> = Platform::ALL.iter().map(|p| p.profile_key()).collect();
            ApiError::new(
                request_id,
                "validation_error",
                format!("unknown profile key '{key}'; expected one of: {}", known.join(", ")),
            )
        }
        other => {
            tracing::error!(error = %other, "failed to persist profile update");
            ApiError::new(request_id, "internal_error", "failed to save settings")
        }
    }
}
