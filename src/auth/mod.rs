// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Ownership-Challenge Authorization
//!
//! Privileged operations (revealing a custodial private key, moving funds
//! out of custody) require proof that the caller controls the owning
//! primary wallet.
//!
//! ## Flow
//!
//! 1. Client requests a challenge for its owner identity
//! 2. Server mints a tagged, timestamped, nonced challenge message
//! 3. Client signs the exact challenge bytes with the primary wallet key
//! 4. Client submits `{owner_identity, challenge, signature}` with the
//!    privileged request
//! 5. Server validates freshness and signature, consumes the nonce, and
//!    mints an [`AuthProof`] that authorizes exactly one operation
//!
//! ## Security
//!
//! - Challenges expire 5 minutes after issuance
//! - Timestamps more than 30 seconds ahead of server time are rejected
//! - A consumed challenge cannot be replayed inside the window
//! - Verification failures never leak parse or crypto internals

pub mod challenge;
pub mod error;

pub use challenge::{decode_identity, AuthProof, ChallengeService};
pub use error::AuthError;
