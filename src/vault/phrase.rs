// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password-based encryption of a wallet recovery phrase.
//!
//! The user's primary-wallet recovery phrase can be backed up locally,
//! sealed under a key derived from a password of their choosing:
//! PBKDF2-HMAC-SHA256 with a fresh 16-byte salt, then AES-256-GCM with a
//! fresh 12-byte nonce. The payload records the iteration count actually
//! used, so decryption keeps working if the default is raised later.
//!
//! A wrong password and a tampered payload are indistinguishable by
//! design: both fail the authentication tag and surface as the single
//! generic [`VaultError::BadPasswordOrCorrupt`].

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Key, Nonce,
};
use base64ct::{Base64, Encoding};
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

/// PBKDF2 work factor for new backups.
const DEFAULT_ITERATIONS: u32 = 250_000;

/// Minimum backup password length.
const MIN_PASSWORD_LEN: usize = 8;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// Error type for phrase-vault operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VaultError {
    #[error("recovery phrase must not be empty")]
    EmptyPhrase,

    #[error("backup password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,

    /// Deliberately generic: wrong password and corrupted payload are not
    /// distinguished.
    #[error("incorrect password or corrupted backup")]
    BadPasswordOrCorrupt,
}

/// Encrypted recovery-phrase backup, stored client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseBackupPayload {
    /// AES-256-GCM ciphertext with the 16-byte tag appended, base64.
    pub ciphertext: String,
    /// 12-byte nonce, base64.
    pub iv: String,
    /// 16-byte PBKDF2 salt, base64.
    pub salt: String,
    /// PBKDF2 iteration count used for this payload.
    pub iterations: u32,
    /// When the backup was created.
    pub created_at: DateTime<Utc>,
}

/// Encrypt a recovery phrase under a password-derived key.
pub fn encrypt_phrase(phrase: &str, password: &str) -> Result<PhraseBackupPayload, VaultError> {
    encrypt_with_iterations(phrase, password, DEFAULT_ITERATIONS)
}

/// Decrypt a backup payload with the supplied password.
pub fn decrypt_phrase(payload: &PhraseBackupPayload, password: &str) -> Result<String, VaultError> {
    let salt = Base64::decode_vec(&payload.salt).map_err(|_| VaultError::BadPasswordOrCorrupt)?;
    let nonce = Base64::decode_vec(&payload.iv).map_err(|_| VaultError::BadPasswordOrCorrupt)?;
    let ciphertext =
        Base64::decode_vec(&payload.ciphertext).map_err(|_| VaultError::BadPasswordOrCorrupt)?;
    if nonce.len() != NONCE_LEN {
        return Err(VaultError::BadPasswordOrCorrupt);
    }

    let key = derive_key(password, &salt, payload.iterations);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&*key));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce), Payload::from(ciphertext.as_slice()))
        .map_err(|_| VaultError::BadPasswordOrCorrupt)?;

    String::from_utf8(plaintext).map_err(|_| VaultError::BadPasswordOrCorrupt)
}

/// Work-factor-parameterized encryption; tests pass a low count.
fn encrypt_with_iterations(
    phrase: &str,
    password: &str,
    iterations: u32,
) -> Result<PhraseBackupPayload, VaultError> {
    if phrase.is_empty() {
        return Err(VaultError::EmptyPhrase);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(VaultError::WeakPassword);
    }

    let mut salt = [0u8; SALT_LEN];
    let mut nonce = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    rand::rngs::OsRng.fill_bytes(&mut nonce);

    let key = derive_key(password, &salt, iterations);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&*key));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), Payload::from(phrase.as_bytes()))
        .map_err(|_| VaultError::BadPasswordOrCorrupt)?;

    Ok(PhraseBackupPayload {
        ciphertext: Base64::encode_string(&ciphertext),
        iv: Base64::encode_string(&nonce),
        salt: Base64::encode_string(&salt),
        iterations,
        created_at: Utc::now(),
    })
}

/// PBKDF2-HMAC-SHA256 → 32-byte AES key.
fn derive_key(password: &str, salt: &[u8], iterations: u32) -> Zeroizing<[u8; 32]> {
    let mut key = Zeroizing::new([0u8; 32]);
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, key.as_mut());
    key
}
