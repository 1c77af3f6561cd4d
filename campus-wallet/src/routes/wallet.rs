use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use campus_shared::errors::AppResult;
use campus_shared::middleware::AdminUser;
use campus_shared::types::auth::AuthUser;
use campus_shared::types::{ApiResponse, Paginated, PaginationParams};

use crate::models::{LedgerTransaction, Wallet};
use crate::services::savings_service;
use crate::AppState;

/// POST /wallet - open the caller's wallet (no-op when it exists)
pub async fn open_wallet(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Wallet>>> {
    let wallet = savings_service::open_wallet(state.store.as_ref(), user.id)?;
    Ok(Json(ApiResponse::ok(wallet)))
}

/// GET /wallet/balance
pub async fn get_balance(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Wallet>>> {
    let wallet = savings_service::balance(state.store.as_ref(), user.id)?;
    Ok(Json(ApiResponse::ok(wallet)))
}

/// GET /wallet/transactions?page=&per_page=
pub async fn list_transactions(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<LedgerTransaction>>>> {
    let page = savings_service::transactions(state.store.as_ref(), user.id, &params)?;
    Ok(Json(ApiResponse::ok(page)))
}

#[derive(Debug, Deserialize)]
pub struct CreditRequest {
    pub amount: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct CreditResponse {
    pub wallet: Wallet,
    pub transaction: LedgerTransaction,
}

/// POST /admin/wallets/:user_id/credit
pub async fn credit_wallet(
    AdminUser(admin): AdminUser,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<CreditRequest>,
) -> AppResult<Json<ApiResponse<CreditResponse>>> {
    let (wallet, transaction) = savings_service::credit(state.store.as_ref(), user_id, &req.amount, &req.description)?;
    tracing::info!(admin_id = %admin.id, user_id = %user_id, "admin wallet credit");

    Ok(Json(ApiResponse::ok(CreditResponse { wallet, transaction })))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use uuid::Uuid;

    use crate::test_support::{admin_token, funded_wallet, TestApp};

    #[tokio::test]
    async fn balance_requires_open_wallet() {
        let app = TestApp::new();
        let user = Uuid::new_v4();

        let (status, body) = app.request(Method::GET, "/wallet/balance", Some(user), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "E8001");

        let (status, _) = app.request(Method::POST, "/wallet", Some(user), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app.request(Method::GET, "/wallet/balance", Some(user), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["balance"], "0.00");
        assert_eq!(body["data"]["currency"], "ZAR");
    }

    #[tokio::test]
    async fn unauthenticated_requests_are_rejected() {
        let app = TestApp::new();
        let (status, body) = app.request(Method::GET, "/wallet/balance", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "E0004");
    }

    #[tokio::test]
    async fn only_admins_credit_wallets() {
        let app = TestApp::new();
        let user = funded_wallet(app.store.as_ref(), "10");
        let uri = format!("/admin/wallets/{user}/credit");
        let body = json!({ "amount": "90", "description": "EFT top-up" });

        let (status, _) = app.request(Method::POST, &uri, Some(user), Some(body.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, resp) = app
            .request_with_token(Method::POST, &uri, Some(admin_token()), Some(body))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp["data"]["wallet"]["balance"], "100.00");
        assert_eq!(resp["data"]["transaction"]["kind"], "wallet_credit");
    }

    #[tokio::test]
    async fn transactions_are_paginated() {
        let app = TestApp::new();
        let user = funded_wallet(app.store.as_ref(), "10");
        app.request_with_token(
            Method::POST,
            &format!("/admin/wallets/{user}/credit"),
            Some(admin_token()),
            Some(json!({ "amount": "5" })),
        )
        .await;

        let (status, body) = app
            .request(Method::GET, "/wallet/transactions?page=1&per_page=1", Some(user), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 2);
        assert_eq!(body["data"]["total_pages"], 2);
        assert_eq!(body["data"]["items"][0]["description"], "Wallet top-up");
        assert_eq!(body["data"]["items"][0]["amount"], "5.00");
    }

    #[tokio::test]
    async fn page_far_past_the_end_is_empty() {
        let app = TestApp::new();
        let user = funded_wallet(app.store.as_ref(), "10");

        let uri = format!("/wallet/transactions?page={}&per_page=1", u64::MAX);
        let (status, body) = app.request(Method::GET, &uri, Some(user), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 1);
        assert_eq!(body["data"]["items"], json!([]));
        assert_eq!(body["data"]["has_more"], false);
    }
}
