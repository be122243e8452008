// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! API-boundary error type and mappings from the domain errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::AuthError;
use crate::custody::CustodyError;
use crate::ledger::{LedgerError, TransferError};
use crate::storage::WalletDbError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Stable machine-readable code; present where clients must branch on
    /// the failure kind (notably rejected vs. unknown submissions).
    pub code: Option<&'static str>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<&'static str>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.code,
        });
        (self.status, body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::new(StatusCode::UNAUTHORIZED, err.to_string()).with_code(err.error_code())
    }
}

impl From<CustodyError> for ApiError {
    fn from(err: CustodyError) -> Self {
        match err {
            // Secrets that fail to open are an operational fault, never a
            // caller fault; the detail stays in the logs.
            CustodyError::Envelope(_) | CustodyError::InvalidStoredKey(_) => {
                tracing::error!(error = %err, "custody key material error");
                ApiError::internal("Key custody error")
            }
            CustodyError::Db(db) => db.into(),
        }
    }
}

impl From<WalletDbError> for ApiError {
    fn from(err: WalletDbError) -> Self {
        tracing::error!(error = %err, "wallet database error");
        ApiError::internal("Storage error")
    }
}

impl From<TransferError> for ApiError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::InvalidAmount => ApiError::bad_request(err.to_string()),
            TransferError::InsufficientFunds { .. } => {
                ApiError::unprocessable(err.to_string()).with_code("insufficient_funds")
            }
            TransferError::Ledger(ledger) => ledger.into(),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Rejected(reason) => {
                ApiError::new(StatusCode::BAD_GATEWAY, format!("Ledger rejected: {reason}"))
                    .with_code("ledger_rejected")
            }
            // Distinct code: the transaction may still land, so clients
            // must not blindly retry.
            LedgerError::Unknown(detail) => ApiError::new(
                StatusCode::BAD_GATEWAY,
                format!("Submission outcome unknown: {detail}"),
            )
            .with_code("ledger_outcome_unknown"),
            LedgerError::Rpc(detail) => {
                ApiError::new(StatusCode::BAD_GATEWAY, format!("Ledger rpc failed: {detail}"))
            }
            LedgerError::InvalidRpcUrl(detail) => {
                ApiError::internal(format!("Ledger misconfigured: {detail}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data"}"#);
    }

    #[tokio::test]
    async fn rejected_and_unknown_submissions_are_distinguishable() {
        let rejected: ApiError = LedgerError::Rejected("bad blockhash".into()).into();
        let unknown: ApiError = LedgerError::Unknown("timed out".into()).into();

        assert_eq!(rejected.status, StatusCode::BAD_GATEWAY);
        assert_eq!(unknown.status, StatusCode::BAD_GATEWAY);
        assert_eq!(rejected.code, Some("ledger_rejected"));
        assert_eq!(unknown.code, Some("ledger_outcome_unknown"));
    }

    #[test]
    fn insufficient_funds_maps_to_422() {
        let err: ApiError = TransferError::InsufficientFunds {
            available: 100,
            required: 5_100,
        }
        .into();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code, Some("insufficient_funds"));
    }
}
