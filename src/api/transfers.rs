// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Value-movement endpoints: fee-split transfers between custodial wallets
//! and sweep withdrawals back to the primary wallet.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::decode_signature;
use crate::{error::ApiError, state::AppState};

/// Request to move funds from one owner's custodial wallet to another's.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransferRequest {
    /// Sender's primary wallet public key (base58).
    pub from_identity: String,
    /// Recipient's primary wallet public key (base58).
    pub to_identity: String,
    /// Amount in base units; strictly positive.
    pub amount: u64,
    /// In-app action this payment belongs to (like, tip, boost, ...).
    pub action: String,
    /// Challenge text exactly as minted for `from_identity`.
    pub challenge: String,
    /// Detached Ed25519 signature over the challenge bytes (base58).
    pub signature: String,
}

/// Completed transfer.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransferResponse {
    /// Ledger transaction signature.
    pub transaction_signature: String,
    /// Total amount debited from the sender.
    pub amount: u64,
    /// Portion credited to the recipient's custodial wallet.
    pub recipient_amount: u64,
    /// Portion skimmed into the platform fee wallet.
    pub fee_amount: u64,
}

/// Request to sweep a custodial wallet back to its owner.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WithdrawalRequest {
    /// Owner's primary wallet public key (base58); also the destination.
    pub owner_identity: String,
    /// Challenge text exactly as minted.
    pub challenge: String,
    /// Detached Ed25519 signature over the challenge bytes (base58).
    pub signature: String,
}

/// Completed sweep withdrawal.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WithdrawalResponse {
    /// Ledger transaction signature.
    pub transaction_signature: String,
    /// Amount moved back to the primary wallet.
    pub amount_swept: u64,
}

/// Transfer between custodial wallets with the platform fee split.
///
/// Both identities are resolved to their custodial wallets (provisioning
/// the recipient's lazily), the sender's challenge proof is verified, and
/// the movement rides in one atomic ledger transaction.
#[utoipa::path(
    post,
    path = "/v1/transfers",
    tag = "Transfers",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Transfer submitted", body = TransferResponse),
        (status = 400, description = "Invalid amount or signature encoding"),
        (status = 401, description = "Challenge or signature rejected"),
        (status = 422, description = "Insufficient funds"),
        (status = 502, description = "Ledger rejected or outcome unknown")
    )
)]
pub async fn create_transfer(
    State(state): State<AppState>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<TransferResponse>, ApiError> {
    let recipient = state.custody.ensure(&request.to_identity)?;

    let signature = decode_signature(&request.signature)?;
    let proof = state
        .challenges
        .authorize(&request.from_identity, &request.challenge, &signature)?;
    let (_, sender_key) = state.custody.unlock_for_transfer(proof)?;

    let outcome = state
        .transfers
        .transfer(
            &sender_key,
            &recipient.proxy_public_key,
            request.amount,
            state.fee_wallet.as_deref(),
            state.fee_percent,
        )
        .await?;
    state.custody.touch(&request.from_identity)?;

    tracing::info!(
        from = %request.from_identity,
        to = %request.to_identity,
        action = %request.action,
        amount = outcome.amount,
        fee = outcome.fee_amount,
        "in-app transfer completed"
    );
    Ok(Json(TransferResponse {
        transaction_signature: outcome.transaction_signature,
        amount: outcome.amount,
        recipient_amount: outcome.recipient_amount,
        fee_amount: outcome.fee_amount,
    }))
}

/// Sweep a custodial wallet's full balance back to the primary wallet.
#[utoipa::path(
    post,
    path = "/v1/withdrawals",
    tag = "Transfers",
    request_body = WithdrawalRequest,
    responses(
        (status = 200, description = "Sweep submitted", body = WithdrawalResponse),
        (status = 401, description = "Challenge or signature rejected"),
        (status = 422, description = "Balance cannot cover the network fee"),
        (status = 502, description = "Ledger rejected or outcome unknown")
    )
)]
pub async fn create_withdrawal(
    State(state): State<AppState>,
    Json(request): Json<WithdrawalRequest>,
) -> Result<Json<WithdrawalResponse>, ApiError> {
    let signature = decode_signature(&request.signature)?;
    let proof = state
        .challenges
        .authorize(&request.owner_identity, &request.challenge, &signature)?;
    let (_, custodial_key) = state.custody.unlock_for_transfer(proof)?;

    let outcome = state
        .transfers
        .sweep_withdraw(&custodial_key, &request.owner_identity)
        .await?;
    state.custody.touch(&request.owner_identity)?;

    tracing::info!(
        owner = %request.owner_identity,
        amount_swept = outcome.amount_swept,
        "sweep withdrawal completed"
    );
    Ok(Json(WithdrawalResponse {
        transaction_signature: outcome.transaction_signature,
        amount_swept: outcome.amount_swept,
    }))
}
