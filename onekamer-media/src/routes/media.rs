use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use onekamer_shared::errors::{AppError, AppResult, ErrorCode};
use onekamer_shared::types::api::ApiResponse;
use onekamer_shared::types::auth::AuthUser;

use crate::buckets::Bucket;
use crate::resolver::ResolvedMedia;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    pub bucket: Option<String>,
    pub path: Option<String>,
}

/// GET /media/resolve
/// Resolve a stored media reference into a playable URL.
pub async fn resolve_media(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(params): Query<ResolveParams>,
) -> AppResult<Json<ApiResponse<ResolvedMedia>>> {
    let bucket = match params.bucket.as_deref().filter(|b| !b.trim().is_empty()) {
        Some(raw) => Some(raw.parse::<Bucket>().map_err(|_| {
            AppError::new(ErrorCode::UnknownBucket, format!("unknown bucket: {raw}"))
        })?),
        None => None,
    };

    let resolved = state.resolver.resolve(bucket, params.path.as_deref()).await;

    tracing::debug!(
        bucket = ?params.bucket,
        path = ?params.path,
        resolved_url = ?resolved.url,
        "media reference resolved"
    );

    Ok(Json(ApiResponse::ok(resolved)))
}
