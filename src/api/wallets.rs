// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Custodial wallet endpoints: lazy provisioning and authorized key reveal.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::decode_signature;
use crate::{error::ApiError, state::AppState};

/// Request to ensure a custodial wallet exists.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EnsureWalletRequest {
    /// Primary wallet public key (base58).
    pub owner_identity: String,
}

/// The owner's custodial wallet. The private key never appears here.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EnsureWalletResponse {
    /// Custodial wallet public key (base58).
    pub proxy_public_key: String,
}

/// Request to reveal the custodial private key.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RevealRequest {
    /// Primary wallet public key (base58).
    pub owner_identity: String,
    /// Challenge text exactly as minted.
    pub challenge: String,
    /// Detached Ed25519 signature over the challenge bytes (base58).
    pub signature: String,
}

/// Revealed custodial keypair.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RevealResponse {
    /// Custodial wallet public key (base58).
    pub proxy_public_key: String,
    /// Plaintext custodial private key (base58 keypair). Never cached.
    pub private_key: String,
}

/// Ensure a custodial wallet exists for an owner identity.
///
/// Idempotent: the first call generates and seals a keypair, later calls
/// return the same wallet.
#[utoipa::path(
    post,
    path = "/v1/wallets/ensure",
    tag = "Wallets",
    request_body = EnsureWalletRequest,
    responses(
        (status = 200, description = "Custodial wallet for this owner", body = EnsureWalletResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn ensure_wallet(
    State(state): State<AppState>,
    Json(request): Json<EnsureWalletRequest>,
) -> Result<Json<EnsureWalletResponse>, ApiError> {
    let record = state.custody.ensure(&request.owner_identity)?;
    Ok(Json(EnsureWalletResponse {
        proxy_public_key: record.proxy_public_key,
    }))
}

/// Reveal the custodial private key to its proven owner.
///
/// Requires a signed, unexpired, unused challenge for the same identity.
/// The response is marked `Cache-Control: no-store`.
#[utoipa::path(
    post,
    path = "/v1/wallets/reveal",
    tag = "Wallets",
    request_body = RevealRequest,
    responses(
        (status = 200, description = "Custodial keypair", body = RevealResponse),
        (status = 401, description = "Challenge or signature rejected"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn reveal_wallet(
    State(state): State<AppState>,
    Json(request): Json<RevealRequest>,
) -> Result<Response, ApiError> {
    let signature = decode_signature(&request.signature)?;
    let proof = state
        .challenges
        .authorize(&request.owner_identity, &request.challenge, &signature)?;

    let revealed = state.custody.reveal_private_key(proof)?;
    let body = Json(RevealResponse {
        proxy_public_key: revealed.proxy_public_key,
        private_key: revealed.private_key,
    });
    Ok(([(header::CACHE_CONTROL, "no-store")], body).into_response())
}
