use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use campus_shared::errors::AppResult;
use campus_shared::types::auth::AuthUser;
use campus_shared::types::ApiResponse;

use crate::services::swipe_service::{self, MatchView};
use crate::AppState;

/// GET /matches - the caller's matches, newest first
pub async fn list_matches(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<MatchView>>>> {
    let matches = swipe_service::list_matches(state.store.as_ref(), user.id)?;
    Ok(Json(ApiResponse::ok(matches)))
}

#[derive(Debug, Serialize)]
pub struct MatchCheckResponse {
    pub matched: bool,
}

/// GET /matches/check/:user_id - whether the caller and user_id are matched
pub async fn check_match(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(other_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MatchCheckResponse>>> {
    let matched = swipe_service::is_matched(state.store.as_ref(), user.id, other_id)?;
    Ok(Json(ApiResponse::ok(MatchCheckResponse { matched })))
}
