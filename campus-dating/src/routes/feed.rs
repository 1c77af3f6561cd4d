use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use campus_shared::errors::AppResult;
use campus_shared::types::auth::AuthUser;
use campus_shared::types::ApiResponse;

use crate::models::DatingProfile;
use crate::services::feed_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedParams {
    limit: Option<i64>,
}

/// GET /feed?limit=20
pub async fn get_feed(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<FeedParams>,
) -> AppResult<Json<ApiResponse<Vec<DatingProfile>>>> {
    let limit = feed_service::feed_limit(params.limit, state.config.feed_size);
    let feed = feed_service::candidate_feed(state.store.as_ref(), user.id, limit)?;
    Ok(Json(ApiResponse::ok(feed)))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::test_support::{seed_profile, TestApp};

    #[tokio::test]
    async fn feed_shrinks_as_the_caller_swipes() {
        let app = TestApp::new();
        let me = seed_profile(app.store.as_ref(), "me");
        let a = seed_profile(app.store.as_ref(), "a");
        seed_profile(app.store.as_ref(), "b");

        let (status, body) = app.request(Method::GET, "/feed", Some(me), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        app.request(
            Method::POST,
            "/swipes",
            Some(me),
            Some(json!({ "swiped_id": a, "is_like": false })),
        )
        .await;

        let (_, body) = app.request(Method::GET, "/feed?limit=5", Some(me), None).await;
        let feed = body["data"].as_array().unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0]["display_name"], "b");
    }
}
