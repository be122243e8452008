// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transfer-intent types and ledger error taxonomy.

use serde::{Deserialize, Serialize};

/// Flat network fee charged by the ledger per signed transaction, in base
/// units. Used as the sweep estimate and the spendable-balance margin.
pub const NETWORK_FEE_LAMPORTS: u64 = 5_000;

/// A single credit within a transfer: `lamports` to `to`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credit {
    /// Recipient public key (base58).
    pub to: String,
    /// Amount in base units.
    pub lamports: u64,
}

/// Transfer intent: one or more credits debited from a single sender,
/// applied atomically by the ledger as one transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferIntent {
    /// Sender public key (base58); the custodial wallet being debited.
    pub from: String,
    /// Credits applied in order. All succeed or none do.
    pub credits: Vec<Credit>,
}

/// A transfer intent signed by the sender's key.
///
/// `signature` is the detached Ed25519 signature over the canonical JSON
/// encoding of `intent`, base58-encoded. It doubles as the transaction
/// signature reported back to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedTransfer {
    pub intent: TransferIntent,
    pub signature: String,
}

impl SignedTransfer {
    /// Canonical message bytes the signature covers.
    pub fn message_bytes(intent: &TransferIntent) -> Vec<u8> {
        serde_json::to_vec(intent).expect("transfer intent serializes")
    }
}

/// Error type for ledger interaction.
///
/// Submission failures deliberately distinguish a definite rejection from
/// an unknown outcome: a transaction that timed out in flight may still
/// land, and callers must not blindly retry it.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The ledger explicitly rejected the transaction. Terminal.
    #[error("ledger rejected transaction: {0}")]
    Rejected(String),

    /// Transport failed after the retry budget; the transaction may or may
    /// not have landed.
    #[error("transaction outcome unknown: {0}")]
    Unknown(String),

    /// A balance read or other non-submission RPC call failed.
    #[error("ledger rpc error: {0}")]
    Rpc(String),

    /// The configured RPC endpoint is not a valid URL.
    #[error("invalid ledger rpc url: {0}")]
    InvalidRpcUrl(String),
}
