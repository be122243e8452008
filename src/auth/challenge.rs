// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stateless ownership-proof challenges.
//!
//! Before any custodial secret is revealed or moved, the caller must prove
//! control of the owning primary wallet: the service mints a short-lived
//! challenge message, the owner signs it with their primary key, and the
//! signed message comes back alongside the privileged request.
//!
//! A successful verification mints an [`AuthProof`], the only value the
//! privileged custody and transfer entry points accept. The proof is not
//! `Clone` and is consumed by value, so one proof authorizes exactly one
//! operation.
//!
//! Challenge layout (newline-delimited):
//!
//! ```text
//! proxy-wallet-auth-v1
//! owner:<base58 primary public key>
//! issued-at:<milliseconds since epoch>
//! nonce:<16 random bytes, base58>
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use rand::RngCore;

use super::error::AuthError;

/// Fixed protocol tag; the first line of every challenge.
const CHALLENGE_TAG: &str = "proxy-wallet-auth-v1";

/// How long a challenge stays valid after issuance.
const VALIDITY_WINDOW_MS: i64 = 5 * 60 * 1000;

/// Clock-skew allowance for challenges stamped ahead of server time.
const FUTURE_SKEW_MS: i64 = 30 * 1000;

/// Proof that a caller demonstrated control of `owner_identity`'s primary
/// key within the validity window.
///
/// Constructible only via [`ChallengeService::authorize`]. Deliberately not
/// `Clone`: privileged operations take it by value.
#[derive(Debug)]
pub struct AuthProof {
    owner_identity: String,
}

impl AuthProof {
    /// The identity this proof authorizes operations for.
    pub fn owner(&self) -> &str {
        &self.owner_identity
    }

    /// Test-only constructor so custody/transfer tests can exercise
    /// privileged paths without running the full signature dance.
    #[cfg(test)]
    pub fn for_tests(owner: &str) -> Self {
        Self {
            owner_identity: owner.to_string(),
        }
    }
}

/// Parsed fields of a challenge message.
struct ParsedChallenge<'a> {
    owner: &'a str,
    issued_at_ms: i64,
    nonce: &'a str,
}

/// Challenge minting and verification service.
///
/// Verification itself is pure; the only state is the consumed-nonce set
/// that rejects exact replays of an already-authorized challenge. Entries
/// expire with the validity window, so the set stays small.
pub struct ChallengeService {
    consumed: Mutex<HashMap<String, i64>>,
}

impl Default for ChallengeService {
    fn default() -> Self {
        Self::new()
    }
}

impl ChallengeService {
    pub fn new() -> Self {
        Self {
            consumed: Mutex::new(HashMap::new()),
        }
    }

    /// Mint a fresh challenge for the given owner identity.
    pub fn create_challenge(&self, owner_identity: &str) -> String {
        let mut nonce = [0u8; 16];
        rand::rngs::OsRng.fill_bytes(&mut nonce);
        format!(
            "{CHALLENGE_TAG}\nowner:{owner_identity}\nissued-at:{}\nnonce:{}",
            Utc::now().timestamp_millis(),
            bs58::encode(nonce).into_string(),
        )
    }

    /// Check a challenge against an expected owner, without consuming it.
    ///
    /// All failures return `false`; this never surfaces parse internals.
    pub fn is_challenge_valid(&self, challenge: &str, expected_owner: &str) -> bool {
        validate_at(challenge, expected_owner, Utc::now().timestamp_millis()).is_ok()
    }

    /// Verify a detached Ed25519 signature over the exact challenge bytes.
    ///
    /// The public key is the base58-decoded owner identity. Pure
    /// verification; any decode or verify failure returns `false`.
    pub fn verify_signature(owner_identity: &str, message: &str, signature: &[u8]) -> bool {
        let Ok(key) = decode_identity(owner_identity) else {
            return false;
        };
        let Ok(sig) = Signature::from_slice(signature) else {
            return false;
        };
        key.verify(message.as_bytes(), &sig).is_ok()
    }

    /// Validate a signed challenge end to end and mint an [`AuthProof`].
    ///
    /// Consumes the challenge nonce: a second `authorize` with the same
    /// challenge is rejected even inside the validity window.
    pub fn authorize(
        &self,
        owner_identity: &str,
        challenge: &str,
        signature: &[u8],
    ) -> Result<AuthProof, AuthError> {
        let now_ms = Utc::now().timestamp_millis();
        let parsed = validate_at(challenge, owner_identity, now_ms)?;

        if !Self::verify_signature(owner_identity, challenge, signature) {
            return Err(AuthError::BadSignature);
        }

        self.consume_nonce(parsed.nonce, now_ms)?;

        Ok(AuthProof {
            owner_identity: owner_identity.to_string(),
        })
    }

    /// Record a nonce as consumed, pruning entries past the window.
    fn consume_nonce(&self, nonce: &str, now_ms: i64) -> Result<(), AuthError> {
        let mut consumed = self.consumed.lock().expect("consumed-nonce lock poisoned");
        consumed.retain(|_, stamped| now_ms - *stamped <= VALIDITY_WINDOW_MS);
        if consumed.insert(nonce.to_string(), now_ms).is_some() {
            return Err(AuthError::ChallengeReplayed);
        }
        Ok(())
    }
}

/// Parse and validate a challenge at a given reference time.
fn validate_at<'a>(
    challenge: &'a str,
    expected_owner: &str,
    now_ms: i64,
) -> Result<ParsedChallenge<'a>, AuthError> {
    let parsed = parse_challenge(challenge)?;

    if parsed.owner != expected_owner {
        return Err(AuthError::IdentityMismatch);
    }
    if now_ms - parsed.issued_at_ms > VALIDITY_WINDOW_MS {
        return Err(AuthError::ChallengeExpired);
    }
    if parsed.issued_at_ms - now_ms > FUTURE_SKEW_MS {
        return Err(AuthError::ChallengeFromFuture);
    }
    Ok(parsed)
}

/// Split a challenge into its four fixed lines.
fn parse_challenge(challenge: &str) -> Result<ParsedChallenge<'_>, AuthError> {
    let mut lines = challenge.lines();

    if lines.next() != Some(CHALLENGE_TAG) {
        return Err(AuthError::MalformedChallenge);
    }
    let owner = lines
        .next()
        .and_then(|l| l.strip_prefix("owner:"))
        .ok_or(AuthError::MalformedChallenge)?;
    let issued_at_ms = lines
        .next()
        .and_then(|l| l.strip_prefix("issued-at:"))
        .and_then(|v| v.parse::<i64>().ok())
        .ok_or(AuthError::MalformedChallenge)?;
    let nonce = lines
        .next()
        .and_then(|l| l.strip_prefix("nonce:"))
        .ok_or(AuthError::MalformedChallenge)?;
    if nonce.is_empty() || lines.next().is_some() {
        return Err(AuthError::MalformedChallenge);
    }

    Ok(ParsedChallenge {
        owner,
        issued_at_ms,
        nonce,
    })
}

/// Decode a base58 owner identity into an Ed25519 verifying key.
pub fn decode_identity(owner_identity: &str) -> Result<VerifyingKey, AuthError> {
    let bytes = bs58::decode(owner_identity)
        .into_vec()
        .map_err(|_| AuthError::InvalidIdentity)?;
    let array: [u8; 32] = bytes
        .try_into()
        .map_err(|_| AuthError::InvalidIdentity)?;
    VerifyingKey::from_bytes(&array).map_err(|_| AuthError::InvalidIdentity)
}
