// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Liveness endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::ApiError, state::AppState};

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"ok"` when the service can answer.
    pub status: String,
    /// Number of provisioned custodial wallets; proves the database is
    /// reachable.
    pub wallets: u64,
}

/// Service liveness and database reachability.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 500, description = "Database unreachable")
    )
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let wallets = state.db.count()?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        wallets,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::test_state;

    #[tokio::test]
    async fn health_reports_wallet_count() {
        let (_dir, state) = test_state(0);
        state.custody.ensure("some-owner").unwrap();

        let response = health(State(state)).await.unwrap();
        assert_eq!(response.status, "ok");
        assert_eq!(response.wallets, 1);
    }
}
