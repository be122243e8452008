// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Proxy Wallet - Custodial Keypair & Authorization Service
//!
//! This crate custodies a server-side "proxy" keypair per user so the app can
//! make small in-app payments without prompting for a wallet signature, while
//! keeping every privileged operation gated on a signed ownership challenge.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Challenge/response ownership proofs
//! - `crypto` - Envelope encryption under the service master key
//! - `custody` - Proxy wallet lifecycle (provision, reveal, unlock)
//! - `ledger` - Ledger RPC client and fee-split transfer engine
//! - `storage` - Wallet records (redb)
//! - `vault` - Client-side recovery-phrase vault (password-encrypted backups)

pub mod api;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod custody;
pub mod error;
pub mod ledger;
pub mod state;
pub mod storage;
pub mod vault;
