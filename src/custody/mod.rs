// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Custodial proxy-wallet provisioning and key custody.
//!
//! Each primary wallet identity owns exactly one custodial keypair, created
//! lazily on first request. The private half is envelope-sealed before it
//! is persisted and only leaves custody through [`CustodyService::reveal_private_key`],
//! which requires an [`AuthProof`] minted by the challenge protocol.
//!
//! Early deployments stored private keys as plaintext base58; those rows
//! are converged by re-sealing on first read (see [`CustodyService::ensure`]).

use std::sync::Arc;

use chrono::Utc;
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::auth::AuthProof;
use crate::crypto::{EnvelopeCipher, EnvelopeError, EnvelopeKind};
use crate::storage::{InsertOutcome, ProxyWalletRecord, WalletDatabase, WalletDbError};

/// Error type for custody operations.
#[derive(Debug, thiserror::Error)]
pub enum CustodyError {
    #[error("wallet database error: {0}")]
    Db(#[from] WalletDbError),

    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    /// Stored key material did not decode to an Ed25519 keypair.
    #[error("stored private key for {0} is not a valid keypair")]
    InvalidStoredKey(String),
}

/// A revealed custodial keypair, returned only through the authorized
/// reveal path. Callers must treat the private key as non-cacheable.
#[derive(Debug)]
pub struct RevealedKey {
    pub proxy_public_key: String,
    pub private_key: String,
}

/// Custody service owning the owner → custodial-keypair mapping.
pub struct CustodyService {
    db: Arc<WalletDatabase>,
    cipher: EnvelopeCipher,
}

impl CustodyService {
    pub fn new(db: Arc<WalletDatabase>, cipher: EnvelopeCipher) -> Self {
        Self { db, cipher }
    }

    /// Return the custodial wallet for an owner, creating it on first call.
    ///
    /// Idempotent: repeated calls return the same record. Two concurrent
    /// first-time calls race on the database's uniqueness guard; the loser
    /// reads back the winner's record instead of provisioning a duplicate.
    pub fn ensure(&self, owner_identity: &str) -> Result<ProxyWalletRecord, CustodyError> {
        if let Some(record) = self.db.get(owner_identity)? {
            return self.migrate_if_legacy(record);
        }

        let keypair = SigningKey::generate(&mut OsRng);
        let proxy_public_key = bs58::encode(keypair.verifying_key().to_bytes()).into_string();
        let plaintext_key = Zeroizing::new(bs58::encode(keypair.to_keypair_bytes()).into_string());
        let sealed = self.cipher.seal(EnvelopeKind::ProxyKey, &plaintext_key)?;

        let now = Utc::now();
        let record = ProxyWalletRecord {
            owner_identity: owner_identity.to_string(),
            proxy_public_key,
            encrypted_private_key: sealed,
            created_at: now,
            updated_at: now,
        };

        match self.db.insert_new(&record)? {
            InsertOutcome::Created => {
                tracing::info!(
                    owner = %owner_identity,
                    proxy = %record.proxy_public_key,
                    "provisioned custodial wallet"
                );
                Ok(record)
            }
            InsertOutcome::Lost(winner) => {
                tracing::debug!(
                    owner = %owner_identity,
                    "lost provisioning race, returning existing wallet"
                );
                Ok(winner)
            }
        }
    }

    /// Re-seal a legacy plaintext private key in place.
    fn migrate_if_legacy(
        &self,
        mut record: ProxyWalletRecord,
    ) -> Result<ProxyWalletRecord, CustodyError> {
        if EnvelopeCipher::is_sealed(EnvelopeKind::ProxyKey, &record.encrypted_private_key) {
            return Ok(record);
        }

        let sealed = self
            .cipher
            .seal(EnvelopeKind::ProxyKey, &record.encrypted_private_key)?;
        record.encrypted_private_key = sealed;
        record.updated_at = Utc::now();
        self.db.update(&record)?;

        tracing::info!(
            owner = %record.owner_identity,
            "re-sealed legacy plaintext private key"
        );
        Ok(record)
    }

    /// Reveal the plaintext custodial private key.
    ///
    /// The `AuthProof` argument is the authorization: it can only come from
    /// a completed challenge for this owner, and it is consumed here.
    pub fn reveal_private_key(&self, proof: AuthProof) -> Result<RevealedKey, CustodyError> {
        let record = self.ensure(proof.owner())?;
        let plaintext = self
            .cipher
            .open(EnvelopeKind::ProxyKey, &record.encrypted_private_key)?;

        tracing::warn!(
            owner = %proof.owner(),
            proxy = %record.proxy_public_key,
            "custodial private key revealed to owner"
        );
        Ok(RevealedKey {
            proxy_public_key: record.proxy_public_key,
            private_key: plaintext,
        })
    }

    /// Unlock an owner's custodial signing key for a single transfer or
    /// sweep.
    ///
    /// Like [`Self::reveal_private_key`], this consumes the proof: moving
    /// funds twice takes two completed challenges.
    pub fn unlock_for_transfer(
        &self,
        proof: AuthProof,
    ) -> Result<(ProxyWalletRecord, SigningKey), CustodyError> {
        let record = self.ensure(proof.owner())?;
        let key = self.decode_signing_key(&record)?;
        Ok((record, key))
    }

    /// Bump a wallet's `updated_at` after funds moved out of it.
    ///
    /// Missing records are a no-op: activity on a wallet that was never
    /// provisioned has nothing to stamp.
    pub fn touch(&self, owner_identity: &str) -> Result<(), CustodyError> {
        if let Some(mut record) = self.db.get(owner_identity)? {
            record.updated_at = Utc::now();
            self.db.update(&record)?;
        }
        Ok(())
    }

    /// Open a record's envelope and decode the base58 keypair.
    fn decode_signing_key(&self, record: &ProxyWalletRecord) -> Result<SigningKey, CustodyError> {
        let plaintext = Zeroizing::new(
            self.cipher
                .open(EnvelopeKind::ProxyKey, &record.encrypted_private_key)?,
        );
        let bytes = Zeroizing::new(
            bs58::decode(plaintext.as_bytes())
                .into_vec()
                .map_err(|_| CustodyError::InvalidStoredKey(record.owner_identity.clone()))?,
        );
        let keypair: [u8; 64] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CustodyError::InvalidStoredKey(record.owner_identity.clone()))?;
        SigningKey::from_keypair_bytes(&keypair)
            .map_err(|_| CustodyError::InvalidStoredKey(record.owner_identity.clone()))
    }
}
