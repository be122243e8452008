// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON-RPC ledger client.
//!
//! The [`LedgerClient`] trait is the seam between the transfer engine and
//! the network: production uses [`RpcLedgerClient`] against the configured
//! ledger node, tests use an in-memory ledger. The trait intentionally
//! exposes only what the custody core needs — a balance read and an atomic
//! transfer submission.

use async_trait::async_trait;
use base64ct::{Base64, Encoding};
use serde_json::{json, Value};

use super::types::{LedgerError, SignedTransfer};

/// Submission retry budget. Transport-level failures are retried up to this
/// many attempts; an explicit ledger rejection is terminal on first sight.
const MAX_SUBMIT_ATTEMPTS: u32 = 3;

/// Minimal ledger interface consumed by the transfer engine.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Spendable balance of a public key, in base units.
    async fn get_balance(&self, public_key: &str) -> Result<u64, LedgerError>;

    /// Submit a signed transfer, returning the transaction signature.
    async fn submit_transfer(&self, transfer: &SignedTransfer) -> Result<String, LedgerError>;
}

/// HTTP JSON-RPC client for a ledger node.
pub struct RpcLedgerClient {
    http: reqwest::Client,
    endpoint: url::Url,
}

impl RpcLedgerClient {
    /// Create a client for the given RPC endpoint.
    pub fn new(rpc_url: &str) -> Result<Self, LedgerError> {
        let endpoint: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| LedgerError::InvalidRpcUrl(e.to_string()))?;
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint,
        })
    }

    /// Issue a single JSON-RPC call and return the `result` field.
    async fn call(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError::Rpc(e.to_string()))?;

        let payload: Value = response
            .json()
            .await
            .map_err(|e| LedgerError::Rpc(e.to_string()))?;

        extract_rpc_result(payload)
    }
}

/// Pull `result` out of a JSON-RPC response, mapping `error` to a rejection.
fn extract_rpc_result(payload: Value) -> Result<Value, LedgerError> {
    if let Some(error) = payload.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unspecified error");
        return Err(LedgerError::Rejected(message.to_string()));
    }
    payload
        .get("result")
        .cloned()
        .ok_or_else(|| LedgerError::Rpc("response carried neither result nor error".to_string()))
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn get_balance(&self, public_key: &str) -> Result<u64, LedgerError> {
        let result = self.call("getBalance", json!([public_key])).await?;
        // Node returns either a bare number or {"value": n}.
        let value = result.get("value").cloned().unwrap_or(result);
        value
            .as_u64()
            .ok_or_else(|| LedgerError::Rpc("balance is not an unsigned integer".to_string()))
    }

    async fn submit_transfer(&self, transfer: &SignedTransfer) -> Result<String, LedgerError> {
        let encoded = Base64::encode_string(
            &serde_json::to_vec(transfer).map_err(|e| LedgerError::Rpc(e.to_string()))?,
        );

        let mut last_transport_error = String::new();
        for attempt in 1..=MAX_SUBMIT_ATTEMPTS {
            match self.call("sendTransaction", json!([encoded])).await {
                Ok(result) => {
                    return result
                        .as_str()
                        .map(str::to_string)
                        .ok_or_else(|| {
                            LedgerError::Rpc("transaction signature missing from response".into())
                        });
                }
                // Explicit rejection: the ledger saw the transaction and
                // refused it. Retrying cannot change the outcome.
                Err(LedgerError::Rejected(reason)) => {
                    return Err(LedgerError::Rejected(reason));
                }
                Err(other) => {
                    tracing::warn!(
                        attempt,
                        error = %other,
                        "transfer submission attempt failed"
                    );
                    last_transport_error = other.to_string();
                }
            }
        }

        // The transaction was put on the wire at least once; its fate is
        // genuinely unknown.
        Err(LedgerError::Unknown(format!(
            "{MAX_SUBMIT_ATTEMPTS} attempts exhausted, last error: {last_transport_error}"
        )))
    }
}
