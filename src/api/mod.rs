// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{error::ApiError, state::AppState};

pub mod challenge;
pub mod health;
pub mod transfers;
pub mod wallets;

/// Decode a base58 detached signature from a request body.
pub(crate) fn decode_signature(encoded: &str) -> Result<Vec<u8>, ApiError> {
    bs58::decode(encoded)
        .into_vec()
        .map_err(|_| ApiError::bad_request("signature is not valid base58"))
}

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/auth/challenge", post(challenge::create_challenge))
        .route("/wallets/ensure", post(wallets::ensure_wallet))
        .route("/wallets/reveal", post(wallets::reveal_wallet))
        .route("/transfers", post(transfers::create_transfer))
        .route("/withdrawals", post(transfers::create_withdrawal))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health::health))
        .with_state(state)
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        challenge::create_challenge,
        wallets::ensure_wallet,
        wallets::reveal_wallet,
        transfers::create_transfer,
        transfers::create_withdrawal
    ),
    components(
        schemas(
            health::HealthResponse,
            challenge::ChallengeRequest,
            challenge::ChallengeResponse,
            wallets::EnsureWalletRequest,
            wallets::EnsureWalletResponse,
            wallets::RevealRequest,
            wallets::RevealResponse,
            transfers::TransferRequest,
            transfers::TransferResponse,
            transfers::WithdrawalRequest,
            transfers::WithdrawalResponse
        )
    ),
    tags(
        (name = "Health", description = "Service liveness"),
        (name = "Auth", description = "Ownership challenges"),
        (name = "Wallets", description = "Custodial wallet provisioning and key reveal"),
        (name = "Transfers", description = "Fee-split transfers and sweep withdrawals")
    )
)]
struct ApiDoc;
