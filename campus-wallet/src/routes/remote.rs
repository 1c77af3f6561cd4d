//! Pass-through routes to the external Wallet API, authenticated with the
//! caller's own session token.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use campus_shared::errors::{AppError, AppResult, ErrorCode};
use campus_shared::middleware::BearerToken;
use campus_shared::types::auth::AuthUser;
use campus_shared::types::ApiResponse;

use crate::clients::wallet_api::{
    DocumentKind, DocumentUpload, RegisterRequest, VoucherPurchase, VoucherPurchaseRequest, WalletBalance,
    WalletProfile, WalletTransaction,
};
use crate::services::savings_service::parse_amount;
use crate::AppState;

pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

const ACCEPTED_DOCUMENT_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "application/pdf"];

/// GET /wallet/remote/balance
pub async fn balance(
    _user: AuthUser,
    BearerToken(token): BearerToken,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<WalletBalance>>> {
    let balance = state.wallet_api.balance(&token).await?;
    Ok(Json(ApiResponse::ok(balance)))
}

/// GET /wallet/remote/transactions
pub async fn transactions(
    _user: AuthUser,
    BearerToken(token): BearerToken,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<WalletTransaction>>>> {
    let transactions = state.wallet_api.transactions(&token).await?;
    Ok(Json(ApiResponse::ok(transactions)))
}

/// GET /wallet/remote/profile
pub async fn profile(
    _user: AuthUser,
    BearerToken(token): BearerToken,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<WalletProfile>>> {
    let profile = state.wallet_api.profile(&token).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

/// POST /wallet/remote/register
pub async fn register(
    user: AuthUser,
    BearerToken(token): BearerToken,
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<WalletProfile>>> {
    req.validate()?;

    let profile = state.wallet_api.register(&token, &req).await?;
    tracing::info!(user_id = %user.id, kyc_status = ?profile.kyc_status, "wallet account registered");

    Ok(Json(ApiResponse::ok(profile)))
}

/// POST /wallet/remote/documents - multipart with a `kind` field and a `file` field
pub async fn upload_document(
    user: AuthUser,
    BearerToken(token): BearerToken,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<DocumentUpload>>> {
    let mut kind = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("failed to read multipart: {e}")))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("kind") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::bad_request(format!("failed to read kind: {e}")))?;
                kind = Some(raw.parse::<DocumentKind>().map_err(AppError::Validation)?);
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or("document").to_string();
                let content_type = field.content_type().unwrap_or("application/octet-stream").to_string();
                if !ACCEPTED_DOCUMENT_TYPES.contains(&content_type.as_str()) {
                    return Err(AppError::Validation(format!(
                        "unsupported document type {content_type}, accepted: jpeg, png, webp, pdf"
                    )));
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::bad_request(format!("failed to read file data: {e}")))?;
                file = Some((file_name, content_type, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let kind = kind.ok_or_else(|| AppError::Validation("kind is required".into()))?;
    let (file_name, content_type, bytes) = file.ok_or_else(|| AppError::Validation("file is required".into()))?;
    if bytes.is_empty() {
        return Err(AppError::Validation("file is empty".into()));
    }

    let size = bytes.len();
    let upload = state
        .wallet_api
        .upload_document(&token, kind, &file_name, &content_type, bytes)
        .await?;
    tracing::info!(user_id = %user.id, kind = %kind, size, "wallet document uploaded");

    Ok(Json(ApiResponse::ok(upload)))
}

#[derive(Debug, Deserialize)]
pub struct VoucherRequest {
    pub product_id: String,
    pub amount: String,
    pub recipient_phone: Option<String>,
}

/// POST /wallet/remote/vouchers
pub async fn purchase_voucher(
    user: AuthUser,
    BearerToken(token): BearerToken,
    State(state): State<Arc<AppState>>,
    Json(req): Json<VoucherRequest>,
) -> AppResult<Json<ApiResponse<VoucherPurchase>>> {
    let product_id = req.product_id.trim().to_string();
    if product_id.is_empty() {
        return Err(AppError::new(ErrorCode::ValidationError, "product_id is required"));
    }
    let amount = parse_amount(&req.amount)?;

    let purchase = state
        .wallet_api
        .purchase_voucher(
            &token,
            &VoucherPurchaseRequest {
                product_id,
                amount,
                recipient_phone: req.recipient_phone,
            },
        )
        .await?;
    tracing::info!(user_id = %user.id, voucher_id = %purchase.voucher_id, amount = %amount, "voucher purchased");

    Ok(Json(ApiResponse::ok(purchase)))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use uuid::Uuid;

    use crate::test_support::{fake_wallet_api, spawn_server, token_for, TestApp};

    async fn app() -> TestApp {
        TestApp::with_wallet_api(&spawn_server(fake_wallet_api()).await)
    }

    #[tokio::test]
    async fn proxies_balance() {
        let app = app().await;
        let (status, body) = app
            .request(Method::GET, "/wallet/remote/balance", Some(Uuid::new_v4()), None)
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["balance"], "500.00");
    }

    #[tokio::test]
    async fn expired_wallet_session_is_unauthorized() {
        let upstream = Router::new().route(
            "/wallet/balance",
            get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "message": "jwt expired" }))) }),
        );
        let app = TestApp::with_wallet_api(&spawn_server(upstream).await);

        let (status, body) = app
            .request(Method::GET, "/wallet/remote/balance", Some(Uuid::new_v4()), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "E8006");
    }

    #[tokio::test]
    async fn undecodable_upstream_is_bad_gateway() {
        let upstream = Router::new().route(
            "/profile",
            get(|| async { Json(json!({ "id": 7 })) }),
        );
        let app = TestApp::with_wallet_api(&spawn_server(upstream).await);

        let (status, body) = app
            .request(Method::GET, "/wallet/remote/profile", Some(Uuid::new_v4()), None)
            .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "E8008");
    }

    #[tokio::test]
    async fn register_validates_before_calling_upstream() {
        let app = app().await;
        let (status, body) = app
            .request(
                Method::POST,
                "/wallet/remote/register",
                Some(Uuid::new_v4()),
                Some(json!({
                    "first_name": "Naledi",
                    "last_name": "Dube",
                    "email": "not-an-email",
                    "phone": "0821234567",
                    "id_number": "0001015800085"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "E0002");
    }

    #[tokio::test]
    async fn voucher_rejection_is_passed_through() {
        let app = app().await;
        let (status, body) = app
            .request(
                Method::POST,
                "/wallet/remote/vouchers",
                Some(Uuid::new_v4()),
                Some(json!({ "product_id": "airtime-mtn", "amount": "900" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Insufficient balance");
        assert_eq!(body["error"]["details"]["upstream_status"], 422);

        let (status, body) = app
            .request(
                Method::POST,
                "/wallet/remote/vouchers",
                Some(Uuid::new_v4()),
                Some(json!({ "product_id": "airtime-mtn", "amount": "20" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["balance_after"], "480.00");
    }

    #[tokio::test]
    async fn uploads_multipart_document() {
        let app = app().await;
        let boundary = "campus-boundary";
        let payload = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"kind\"\r\n\r\nidentity\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"id.png\"\r\n\
             Content-Type: image/png\r\n\r\n0123456789\r\n--{b}--\r\n",
            b = boundary
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri("/wallet/remote/documents")
            .header("Authorization", format!("Bearer {}", token_for(Uuid::new_v4())))
            .header("Content-Type", format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(payload))
            .unwrap();

        let (status, body) = app.send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["kind"], "identity");
        assert_eq!(body["data"]["id"], "doc-10");
    }
}
