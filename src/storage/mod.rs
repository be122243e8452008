// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Durable state for the custody core.
//!
//! The only table this service owns is the custodial-wallet table, kept in
//! an embedded redb database under `DATA_DIR`. Private keys inside it are
//! envelope-sealed by [`crate::crypto::EnvelopeCipher`] before they are
//! written; the database itself stores opaque strings.

pub mod wallet_db;

pub use wallet_db::{
    InsertOutcome, ProxyWalletRecord, WalletDatabase, WalletDbError, WalletDbResult,
};
