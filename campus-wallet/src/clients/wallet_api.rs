//! Typed client for the external Wallet API.
//!
//! Every call is authenticated with the caller's own bearer token. Responses
//! are decoded into the types below; a body that does not fit is a
//! [`WalletApiError::Decode`], never a default value.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use validator::Validate;

use campus_shared::errors::{AppError, ErrorCode};
use campus_shared::Money;

#[derive(Debug, thiserror::Error)]
pub enum WalletApiError {
    /// The wallet session is no longer valid; the user has to sign in again.
    #[error("wallet session expired")]
    Unauthorized,

    #[error("wallet api returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected wallet api response: {0}")]
    Decode(String),

    #[error("wallet api request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl WalletApiError {
    /// Classifies a non-success response. The provider reports some expired
    /// sessions with a non-401 status and "Unauthorized" in the message.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());

        if status == 401 || message.contains("Unauthorized") {
            return Self::Unauthorized;
        }

        let message = if message.is_empty() {
            format!("wallet api error (HTTP {status})")
        } else {
            message
        };
        Self::Api { status, message }
    }
}

impl From<WalletApiError> for AppError {
    fn from(err: WalletApiError) -> Self {
        match err {
            WalletApiError::Unauthorized => {
                AppError::new(ErrorCode::WalletSessionExpired, "wallet session expired, sign in again")
            }
            WalletApiError::Api { status: 404, message } => AppError::not_found(message),
            WalletApiError::Api { status, message } if (400..500).contains(&status) => AppError::with_details(
                ErrorCode::BadRequest,
                message,
                serde_json::json!({ "upstream_status": status }),
            ),
            WalletApiError::Api { status, message } => {
                tracing::error!(status, message = %message, "wallet api failure");
                AppError::with_details(
                    ErrorCode::WalletApiFailed,
                    "wallet provider error",
                    serde_json::json!({ "upstream_status": status }),
                )
            }
            WalletApiError::Decode(detail) => {
                tracing::error!(detail = %detail, "wallet api response did not decode");
                AppError::new(ErrorCode::WalletApiDecode, "unexpected response from wallet provider")
            }
            WalletApiError::Transport(e) => {
                tracing::error!(error = %e, "wallet api unreachable");
                AppError::new(ErrorCode::WalletApiFailed, "wallet provider unavailable")
            }
        }
    }
}

// --- Wire types ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletBalance {
    pub balance: Money,
    pub currency: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: Money,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    Pending,
    Verified,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub kyc_status: KycStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 60))]
    pub first_name: String,
    #[validate(length(min = 1, max = 60))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 10, max = 15))]
    pub phone: String,
    /// South African ID number.
    #[validate(length(equal = 13))]
    pub id_number: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Identity,
    ProofOfAddress,
    Selfie,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::ProofOfAddress => "proof_of_address",
            Self::Selfie => "selfie",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "identity" => Ok(Self::Identity),
            "proof_of_address" => Ok(Self::ProofOfAddress),
            "selfie" => Ok(Self::Selfie),
            other => Err(format!("unknown document kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentUpload {
    pub id: String,
    pub kind: DocumentKind,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherPurchaseRequest {
    pub product_id: String,
    pub amount: Money,
    #[serde(default)]
    pub recipient_phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherPurchase {
    pub voucher_id: String,
    #[serde(default)]
    pub pin: Option<String>,
    pub amount: Money,
    pub balance_after: Money,
}

// --- Client ---

#[derive(Clone)]
pub struct WalletApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl WalletApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, WalletApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn balance(&self, token: &str) -> Result<WalletBalance, WalletApiError> {
        self.send(self.http.get(self.url("/wallet/balance")), token).await
    }

    pub async fn transactions(&self, token: &str) -> Result<Vec<WalletTransaction>, WalletApiError> {
        self.send(self.http.get(self.url("/wallet/transactions")), token).await
    }

    pub async fn profile(&self, token: &str) -> Result<WalletProfile, WalletApiError> {
        self.send(self.http.get(self.url("/profile")), token).await
    }

    pub async fn register(&self, token: &str, req: &RegisterRequest) -> Result<WalletProfile, WalletApiError> {
        self.send(self.http.post(self.url("/register")).json(req), token).await
    }

    pub async fn upload_document(
        &self,
        token: &str,
        kind: DocumentKind,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<DocumentUpload, WalletApiError> {
        let file = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = Form::new().text("kind", kind.as_str()).part("file", file);

        self.send(self.http.post(self.url("/documents")).multipart(form), token).await
    }

    pub async fn purchase_voucher(
        &self,
        token: &str,
        req: &VoucherPurchaseRequest,
    ) -> Result<VoucherPurchase, WalletApiError> {
        self.send(self.http.post(self.url("/vouchers/purchase")).json(req), token).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, token: &str) -> Result<T, WalletApiError> {
        let response = request.bearer_auth(token).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let err = WalletApiError::from_response(status.as_u16(), &body);
            tracing::warn!(status = status.as_u16(), error = %err, "wallet api call rejected");
            return Err(err);
        }

        serde_json::from_slice(&body).map_err(|e| WalletApiError::Decode(e.to_string()))
    }
}
