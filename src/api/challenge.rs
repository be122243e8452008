// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Challenge-minting endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::ApiError, state::AppState};

/// Request for a fresh ownership challenge.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChallengeRequest {
    /// Primary wallet public key (base58).
    pub owner_identity: String,
}

/// A freshly minted challenge.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChallengeResponse {
    /// Challenge text to sign with the primary wallet key, byte-exact.
    pub challenge: String,
}

/// Mint an ownership challenge for the given identity.
///
/// The caller signs the returned text with the primary wallet key and
/// submits the signature alongside one privileged request (reveal,
/// transfer, or withdrawal). Challenges expire after 5 minutes and are
/// single-use.
#[utoipa::path(
    post,
    path = "/v1/auth/challenge",
    tag = "Auth",
    request_body = ChallengeRequest,
    responses(
        (status = 200, description = "Challenge minted", body = ChallengeResponse)
    )
)]
pub async fn create_challenge(
    State(state): State<AppState>,
    Json(request): Json<ChallengeRequest>,
) -> Result<Json<ChallengeResponse>, ApiError> {
    let challenge = state.challenges.create_challenge(&request.owner_identity);
    tracing::debug!(owner = %request.owner_identity, "challenge minted");
    Ok(Json(ChallengeResponse { challenge }))
}
