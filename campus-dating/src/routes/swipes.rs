use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use campus_shared::errors::AppResult;
use campus_shared::types::auth::AuthUser;
use campus_shared::types::ApiResponse;

use crate::services::swipe_service::{self, SwipeOutcome};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SwipeRequest {
    pub swiped_id: Uuid,
    pub is_like: bool,
}

/// POST /swipes - record a like/pass; the response carries the match when one formed
pub async fn create_swipe(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SwipeRequest>,
) -> AppResult<Json<ApiResponse<SwipeOutcome>>> {
    let outcome = swipe_service::record_swipe(
        state.store.as_ref(),
        state.events.as_ref(),
        user.id,
        req.swiped_id,
        req.is_like,
    )
    .await?;

    Ok(Json(ApiResponse::ok(outcome)))
}

#[derive(Debug, Serialize)]
pub struct SwipeCountResponse {
    pub count: u64,
}

/// GET /swipes/count
pub async fn swipe_count(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<SwipeCountResponse>>> {
    let count = swipe_service::swipe_count(state.store.as_ref(), user.id)?;
    Ok(Json(ApiResponse::ok(SwipeCountResponse { count })))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use campus_shared::types::event::routing_keys;

    use crate::test_support::{seed_profile, TestApp};

    #[tokio::test]
    async fn like_back_returns_match() {
        let app = TestApp::new();
        let u1 = seed_profile(app.store.as_ref(), "u1");
        let u2 = seed_profile(app.store.as_ref(), "u2");

        let (status, body) = app
            .request(Method::POST, "/swipes", Some(u1), Some(json!({ "swiped_id": u2, "is_like": true })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["match"].is_null());
        assert_eq!(body["data"]["swipe"]["swiper_id"], u1.to_string());

        let (_, body) = app.request(Method::GET, "/swipes/count", Some(u1), None).await;
        assert_eq!(body["data"]["count"], 1);

        let (status, body) = app
            .request(Method::POST, "/swipes", Some(u2), Some(json!({ "swiped_id": u1, "is_like": true })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["match"]["id"].is_string());

        assert_eq!(app.events.events_for(routing_keys::DATING_MATCH_CREATED).len(), 1);
        assert_eq!(app.events.events_for(routing_keys::DATING_SWIPE_RECORDED).len(), 2);
    }

    #[tokio::test]
    async fn duplicate_swipe_conflicts() {
        let app = TestApp::new();
        let u1 = seed_profile(app.store.as_ref(), "u1");
        let u2 = seed_profile(app.store.as_ref(), "u2");
        let body = json!({ "swiped_id": u2, "is_like": true });

        app.request(Method::POST, "/swipes", Some(u1), Some(body.clone())).await;
        let (status, resp) = app.request(Method::POST, "/swipes", Some(u1), Some(body)).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(resp["error"]["code"], "E2004");
    }

    #[tokio::test]
    async fn self_swipe_is_forbidden() {
        let app = TestApp::new();
        let u1 = seed_profile(app.store.as_ref(), "u1");

        let (status, resp) = app
            .request(Method::POST, "/swipes", Some(u1), Some(json!({ "swiped_id": u1, "is_like": true })))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(resp["error"]["code"], "E2003");
    }
}
