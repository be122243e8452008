// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization errors for the ownership-challenge protocol.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authorization error type.
///
/// Every variant means "authorization denied" to the caller; the variants
/// exist for logging and error-code reporting, not to leak verification
/// internals into response bodies.
#[derive(Debug)]
pub enum AuthError {
    /// Challenge text does not match the expected layout
    MalformedChallenge,
    /// Challenge was minted for a different owner identity
    IdentityMismatch,
    /// Challenge is older than the validity window
    ChallengeExpired,
    /// Challenge claims an issuance time too far in the future
    ChallengeFromFuture,
    /// Challenge nonce was already consumed by a prior authorization
    ChallengeReplayed,
    /// Owner identity is not a valid public key encoding
    InvalidIdentity,
    /// Signature does not verify against the owner's public key
    BadSignature,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MalformedChallenge => "malformed_challenge",
            AuthError::IdentityMismatch => "identity_mismatch",
            AuthError::ChallengeExpired => "challenge_expired",
            AuthError::ChallengeFromFuture => "challenge_from_future",
            AuthError::ChallengeReplayed => "challenge_replayed",
            AuthError::InvalidIdentity => "invalid_identity",
            AuthError::BadSignature => "bad_signature",
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MalformedChallenge => write!(f, "Challenge is malformed"),
            AuthError::IdentityMismatch => {
                write!(f, "Challenge was issued for a different identity")
            }
            AuthError::ChallengeExpired => write!(f, "Challenge has expired"),
            AuthError::ChallengeFromFuture => write!(f, "Challenge timestamp is in the future"),
            AuthError::ChallengeReplayed => write!(f, "Challenge was already used"),
            AuthError::InvalidIdentity => write!(f, "Owner identity is not a valid public key"),
            AuthError::BadSignature => write!(f, "Signature verification failed"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
