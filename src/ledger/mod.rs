// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger-network integration: transfer intents, the RPC client, and the
//! transfer engine.

pub mod client;
pub mod transfer;
pub mod types;

pub use client::{LedgerClient, RpcLedgerClient};
pub use transfer::{SweepOutcome, TransferEngine, TransferError, TransferOutcome};
pub use types::{Credit, LedgerError, SignedTransfer, TransferIntent, NETWORK_FEE_LAMPORTS};
