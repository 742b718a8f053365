// ============================
// crates/secure-lib/src/crypto.rs
// ============================
//! Authenticated encryption for values at rest.
//!
//! Every value is serialized to JSON, sealed with AES-256-GCM and
//! shipped as a single base64 string. The cipher key is derived from a
//! passphrase with scrypt, so the same passphrase always opens blobs
//! written by earlier runs. Tampering with a blob does not produce
//! garbage plaintext, it produces a decryption failure.
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use metrics::counter;
use rand::{rngs::OsRng, RngCore};
use scrypt::{scrypt, Params};
use serde::{de::DeserializeOwned, Serialize};
use zeroize::Zeroizing;

use crate::error::SecureError;
use crate::metrics::DECRYPT_FAILED;

/// Format marker prepended to every blob before base64 encoding.
const MAGIC: &[u8] = b"BRS1";

/// AES-GCM nonce length in bytes
const NONCE_LEN: usize = 12;

/// Fixed scrypt salt. The passphrase is an app-level secret rather
/// than a per-user credential, so a domain-separation constant is
/// enough and keeps old blobs readable across restarts.
const KDF_SALT: &[u8] = b"brushline.secure-store.v1";

/// scrypt cost for deriving the cipher key (interactive parameters:
/// N = 2^14, r = 8, p = 1). Paid once per codec, not per blob.
const SCRYPT_LOG_N: u8 = 14;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;

/// Symmetric codec shared by everything that touches the store.
#[derive(Clone)]
pub struct CipherCodec {
    cipher: Aes256Gcm,
}

impl CipherCodec {
    /// Derive the cipher key from `passphrase` and build the codec.
    pub fn new(passphrase: &str) -> Result<Self, SecureError> {
        let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, 32)
            .map_err(|err| SecureError::Encryption(format!("invalid scrypt parameters: {err}")))?;

        let mut key = Zeroizing::new([0u8; 32]);
        scrypt(passphrase.as_bytes(), KDF_SALT, &params, &mut *key)
            .map_err(|err| SecureError::Encryption(format!("key derivation failed: {err}")))?;

        let cipher = Aes256Gcm::new_from_slice(&key[..])
            .map_err(|err| SecureError::Encryption(format!("invalid key length: {err}")))?;

        Ok(Self { cipher })
    }

    /// Serialize `value` to JSON and seal it.
    ///
    /// The returned string is base64 over `MAGIC || nonce || ciphertext`
    /// with a fresh random nonce, so encrypting the same value twice
    /// yields different blobs.
    pub fn encrypt_value<T: Serialize>(&self, value: &T) -> Result<String, SecureError> {
        let json = serde_json::to_vec(value)?;

        let nonce_bytes = generate_nonce();
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, json.as_slice())
            .map_err(|_| SecureError::Encryption("cipher rejected payload".to_string()))?;

        let mut combined = Vec::with_capacity(MAGIC.len() + NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(MAGIC);
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        Ok(STANDARD.encode(combined))
    }

    /// Open a blob produced by [`encrypt_value`](Self::encrypt_value).
    ///
    /// Any failure along the way (bad base64, unknown format, wrong
    /// key, flipped bits, JSON that no longer matches `T`) collapses to
    /// `None`. Callers treat an unreadable value exactly like a missing
    /// one.
    pub fn decrypt_value<T: DeserializeOwned>(&self, blob: &str) -> Option<T> {
        let combined = match STANDARD.decode(blob) {
            Ok(bytes) => bytes,
            Err(_) => {
                self.note_failure("blob is not valid base64");
                return None;
            },
        };

        if combined.len() < MAGIC.len() + NONCE_LEN {
            self.note_failure("blob too short");
            return None;
        }

        let (magic, rest) = combined.split_at(MAGIC.len());
        if magic != MAGIC {
            self.note_failure("unknown blob format");
            return None;
        }

        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = match self.cipher.decrypt(nonce, ciphertext) {
            Ok(bytes) => bytes,
            Err(_) => {
                self.note_failure("authentication failed");
                return None;
            },
        };

        match serde_json::from_slice(&plaintext) {
            Ok(value) => Some(value),
            Err(_) => {
                self.note_failure("plaintext did not match expected shape");
                None
            },
        }
    }

    fn note_failure(&self, reason: &'static str) {
        counter!(DECRYPT_FAILED).increment(1);
        tracing::warn!(reason, "discarding unreadable stored value");
    }
}

/// Generate a random nonce for AES-GCM
fn generate_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    nonce
}
