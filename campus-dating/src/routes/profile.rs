use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;
use uuid::Uuid;

use campus_shared::errors::AppResult;
use campus_shared::types::auth::AuthUser;
use campus_shared::types::ApiResponse;

use crate::models::DatingProfile;
use crate::services::profile_service::{self, UpsertProfileRequest};
use crate::AppState;

/// PUT /profile - create or replace the caller's dating profile
pub async fn upsert_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpsertProfileRequest>,
) -> AppResult<Json<ApiResponse<DatingProfile>>> {
    let profile = profile_service::upsert_profile(state.store.as_ref(), user.id, req)?;
    Ok(Json(ApiResponse::ok(profile)))
}

/// GET /profile
pub async fn get_own_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<DatingProfile>>> {
    let profile = profile_service::get_profile(state.store.as_ref(), user.id)?;
    Ok(Json(ApiResponse::ok(profile)))
}

/// GET /profiles/:user_id
pub async fn get_profile(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DatingProfile>>> {
    let profile = profile_service::get_profile(state.store.as_ref(), user_id)?;
    Ok(Json(ApiResponse::ok(profile)))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use uuid::Uuid;

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn put_then_get_profile() {
        let app = TestApp::new();
        let me = Uuid::new_v4();

        let (status, body) = app
            .request(
                Method::PUT,
                "/profile",
                Some(me),
                Some(json!({
                    "display_name": "Naledi",
                    "age": 20,
                    "interests": ["chess", "Chess", "braai"],
                    "institution": "Stellenbosch",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["interests"], json!(["chess", "braai"]));

        let (status, body) = app.request(Method::GET, "/profile", Some(me), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["display_name"], "Naledi");

        let other = Uuid::new_v4();
        let (status, body) = app
            .request(Method::GET, &format!("/profiles/{me}"), Some(other), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["user_id"], me.to_string());
    }

    #[tokio::test]
    async fn invalid_profile_is_rejected_with_details() {
        let app = TestApp::new();
        let (status, body) = app
            .request(
                Method::PUT,
                "/profile",
                Some(Uuid::new_v4()),
                Some(json!({ "display_name": "Kid", "age": 16 })),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "E0002");
        assert!(body["error"]["details"].get("age").is_some());
    }

    #[tokio::test]
    async fn requires_authentication() {
        let app = TestApp::new();
        let (status, body) = app.request(Method::GET, "/profile", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "E0004");
    }
}
