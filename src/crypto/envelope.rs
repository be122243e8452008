// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Envelope encryption for secrets at rest.
//!
//! Every custodial private key (and every stored chat message body) is
//! sealed with AES-256-GCM under a single operator-supplied master key and
//! serialized as a versioned, delimited string:
//!
//! ```text
//! <prefix>base64(nonce).base64(tag).base64(ciphertext)
//! ```
//!
//! The version prefix allows future algorithm migration and lets callers
//! detect legacy plaintext values (strings lacking the prefix) that still
//! need sealing. The two payload classes use distinct prefixes so a chat
//! envelope can never be opened as a private key or vice versa.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Key, Nonce,
};
use base64ct::{Base64, Encoding};
use rand::RngCore;

/// AES-256-GCM nonce length in bytes.
const NONCE_LEN: usize = 12;

/// AES-256-GCM authentication tag length in bytes.
const TAG_LEN: usize = 16;

/// Error type for envelope operations.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// The configured master key did not decode to exactly 32 bytes.
    /// Fatal at startup, never a per-request condition.
    #[error("master key must decode to exactly 32 bytes (base64, hex, or raw)")]
    Configuration,

    /// The envelope string is malformed (wrong prefix or field count).
    #[error("malformed envelope: {0}")]
    Format(String),

    /// Authentication tag verification failed: tampered data or wrong key.
    #[error("envelope decryption failed")]
    Decrypt,

    /// Encryption itself failed (should not happen with a valid key).
    #[error("envelope encryption failed")]
    Encrypt,
}

/// Payload class of an envelope. Each class has its own version prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKind {
    /// Custodial proxy-wallet private keys.
    ProxyKey,
    /// Chat message bodies.
    ChatMessage,
}

impl EnvelopeKind {
    /// Versioned prefix marking sealed values of this class.
    pub fn prefix(self) -> &'static str {
        match self {
            EnvelopeKind::ProxyKey => "pwk1:",
            EnvelopeKind::ChatMessage => "pmsg1:",
        }
    }
}

/// 32-byte symmetric master key loaded from configuration.
///
/// The secret is operator-supplied and formats vary, so the loader tries
/// base64, then hex, then raw UTF-8 bytes, accepting the first decoding
/// that yields exactly 32 bytes. A wrong-length key is never used silently.
#[derive(Clone)]
pub struct MasterKey([u8; 32]);

impl MasterKey {
    /// Decode the configured secret into a 32-byte key.
    pub fn from_configured(secret: &str) -> Result<Self, EnvelopeError> {
        if let Ok(bytes) = Base64::decode_vec(secret) {
            if bytes.len() == 32 {
                return Ok(Self(to_array(&bytes)));
            }
        }
        if let Ok(bytes) = hex::decode(secret) {
            if bytes.len() == 32 {
                return Ok(Self(to_array(&bytes)));
            }
        }
        let raw = secret.as_bytes();
        if raw.len() == 32 {
            return Ok(Self(to_array(raw)));
        }
        Err(EnvelopeError::Configuration)
    }

    #[cfg(test)]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.write_str("MasterKey(..)")
    }
}

fn to_array(bytes: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(bytes);
    out
}

/// Authenticated envelope cipher bound to one master key.
///
/// Constructed once at startup and injected into the services that persist
/// secrets; tests build their own instances with throwaway keys.
#[derive(Clone)]
pub struct EnvelopeCipher {
    cipher: Aes256Gcm,
}

impl EnvelopeCipher {
    /// Create a cipher from the loaded master key.
    pub fn new(key: &MasterKey) -> Self {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.0));
        Self { cipher }
    }

    /// Seal a plaintext secret into a versioned envelope string.
    ///
    /// A fresh 12-byte nonce is generated per call.
    pub fn seal(&self, kind: EnvelopeKind, plaintext: &str) -> Result<String, EnvelopeError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let sealed = self
            .cipher
            .encrypt(nonce, Payload::from(plaintext.as_bytes()))
            .map_err(|_| EnvelopeError::Encrypt)?;

        // aes-gcm appends the 16-byte tag to the ciphertext; split it out so
        // the wire format carries nonce, tag, and ciphertext as distinct fields.
        let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_LEN);

        Ok(format!(
            "{}{}.{}.{}",
            kind.prefix(),
            Base64::encode_string(&nonce_bytes),
            Base64::encode_string(tag),
            Base64::encode_string(ciphertext),
        ))
    }

    /// Open a sealed envelope, verifying the authentication tag.
    ///
    /// Any tampering or wrong key yields [`EnvelopeError::Decrypt`], never
    /// garbage plaintext.
    pub fn open(&self, kind: EnvelopeKind, envelope: &str) -> Result<String, EnvelopeError> {
        let body = envelope.strip_prefix(kind.prefix()).ok_or_else(|| {
            EnvelopeError::Format(format!("missing {} prefix", kind.prefix()))
        })?;

        let mut fields = body.split('.');
        let nonce_b64 = fields
            .next()
            .ok_or_else(|| EnvelopeError::Format("missing nonce field".into()))?;
        let tag_b64 = fields
            .next()
            .ok_or_else(|| EnvelopeError::Format("missing tag field".into()))?;
        let ct_b64 = fields
            .next()
            .ok_or_else(|| EnvelopeError::Format("missing ciphertext field".into()))?;
        if fields.next().is_some() {
            return Err(EnvelopeError::Format("too many fields".into()));
        }

        let nonce_bytes = Base64::decode_vec(nonce_b64)
            .map_err(|_| EnvelopeError::Format("nonce is not valid base64".into()))?;
        let tag = Base64::decode_vec(tag_b64)
            .map_err(|_| EnvelopeError::Format("tag is not valid base64".into()))?;
        let ciphertext = Base64::decode_vec(ct_b64)
            .map_err(|_| EnvelopeError::Format("ciphertext is not valid base64".into()))?;

        if nonce_bytes.len() != NONCE_LEN {
            return Err(EnvelopeError::Format("nonce must be 12 bytes".into()));
        }
        if tag.len() != TAG_LEN {
            return Err(EnvelopeError::Format("tag must be 16 bytes".into()));
        }

        // Recombine ciphertext || tag for aes-gcm's combined-buffer API.
        let mut combined = ciphertext;
        combined.extend_from_slice(&tag);

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), Payload::from(&combined[..]))
            .map_err(|_| EnvelopeError::Decrypt)?;

        String::from_utf8(plaintext).map_err(|_| EnvelopeError::Decrypt)
    }

    /// Whether a stored value carries this class's envelope prefix.
    ///
    /// Values without the prefix are legacy plaintext that the custody layer
    /// re-seals on first read.
    pub fn is_sealed(kind: EnvelopeKind, value: &str) -> bool {
        value.starts_with(kind.prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cipher() -> EnvelopeCipher {
        EnvelopeCipher::new(&MasterKey::from_bytes([7u8; 32]))
    }

    #[test]
    fn master_key_accepts_base64() {
        let encoded = Base64::encode_string(&[42u8; 32]);
        assert!(MasterKey::from_configured(&encoded).is_ok());
    }

    #[test]
    fn master_key_accepts_hex() {
        let encoded = hex::encode([42u8; 32]);
        assert!(MasterKey::from_configured(&encoded).is_ok());
    }

    #[test]
    fn master_key_accepts_raw_32_bytes() {
        let raw = "0123456789abcdefghijklmnopqrstuv";
        assert_eq!(raw.len(), 32);
        assert!(MasterKey::from_configured(raw).is_ok());
    }

    #[test]
    fn master_key_rejects_wrong_length() {
        assert!(matches!(
            MasterKey::from_configured("too-short"),
            Err(EnvelopeError::Configuration)
        ));
    }

    #[test]
    fn seal_open_round_trip() {
        let cipher = test_cipher();
        let envelope = cipher
            .seal(EnvelopeKind::ProxyKey, "super-secret-key-material")
            .unwrap();
        assert!(envelope.starts_with("pwk1:"));

        let plaintext = cipher.open(EnvelopeKind::ProxyKey, &envelope).unwrap();
        assert_eq!(plaintext, "super-secret-key-material");
    }

    #[test]
    fn seal_produces_fresh_nonce_per_call() {
        let cipher = test_cipher();
        let a = cipher.seal(EnvelopeKind::ProxyKey, "same input").unwrap();
        let b = cipher.seal(EnvelopeKind::ProxyKey, "same input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn open_rejects_wrong_kind_prefix() {
        let cipher = test_cipher();
        let envelope = cipher.seal(EnvelopeKind::ChatMessage, "hi there").unwrap();
        assert!(matches!(
            cipher.open(EnvelopeKind::ProxyKey, &envelope),
            Err(EnvelopeError::Format(_))
        ));
    }

    #[test]
    fn open_rejects_missing_fields() {
        let cipher = test_cipher();
        assert!(matches!(
            cipher.open(EnvelopeKind::ProxyKey, "pwk1:only-one-field"),
            Err(EnvelopeError::Format(_))
        ));
        assert!(matches!(
            cipher.open(EnvelopeKind::ProxyKey, "pwk1:a.b"),
            Err(EnvelopeError::Format(_))
        ));
    }

    #[test]
    fn tampering_any_field_fails_open() {
        let cipher = test_cipher();
        let envelope = cipher
            .seal(EnvelopeKind::ProxyKey, "tamper detection target")
            .unwrap();

        let body = envelope.strip_prefix("pwk1:").unwrap();
        let fields: Vec<&str> = body.split('.').collect();
        assert_eq!(fields.len(), 3);

        for i in 0..3 {
            let mut mutated: Vec<String> = fields.iter().map(|s| s.to_string()).collect();
            // Flip the first character of the field to a different base64 char.
            let flipped = if mutated[i].starts_with('A') { "B" } else { "A" };
            mutated[i].replace_range(0..1, flipped);
            let forged = format!("pwk1:{}", mutated.join("."));
            assert!(
                cipher.open(EnvelopeKind::ProxyKey, &forged).is_err(),
                "mutated field {i} must not open"
            );
        }
    }

    #[test]
    fn wrong_key_fails_open() {
        let cipher = test_cipher();
        let envelope = cipher.seal(EnvelopeKind::ProxyKey, "sealed under key A").unwrap();

        let other = EnvelopeCipher::new(&MasterKey::from_bytes([8u8; 32]));
        assert!(matches!(
            other.open(EnvelopeKind::ProxyKey, &envelope),
            Err(EnvelopeError::Decrypt)
        ));
    }

    #[test]
    fn is_sealed_detects_legacy_plaintext() {
        assert!(!EnvelopeCipher::is_sealed(
            EnvelopeKind::ProxyKey,
            "4rLegacyBase58Seed"
        ));
        let cipher = test_cipher();
        let envelope = cipher.seal(EnvelopeKind::ProxyKey, "x").unwrap();
        assert!(EnvelopeCipher::is_sealed(EnvelopeKind::ProxyKey, &envelope));
    }
}
