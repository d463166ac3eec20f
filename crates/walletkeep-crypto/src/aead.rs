//! XChaCha20-Poly1305 authenticated encryption.
//!
//! Nonces are 192 bits, drawn from OS entropy for every seal, so
//! collisions under one key are negligible. Tag verification is done
//! in constant time by the `chacha20poly1305` crate.

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use rand::rngs::OsRng;
use rand::RngCore;
use walletkeep_types::{Result, WalletkeepError};

/// Length of the Poly1305 tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

// ---------------------------------------------------------------------------
// AeadNonce
// ---------------------------------------------------------------------------

/// 192-bit (24-byte) XChaCha20-Poly1305 nonce.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AeadNonce([u8; 24]);

impl AeadNonce {
    /// Fixed byte length of an XChaCha20-Poly1305 nonce.
    pub const LEN: usize = 24;

    /// Creates an [`AeadNonce`] from raw bytes.
    pub fn from_bytes(bytes: [u8; 24]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying 24-byte array.
    pub fn as_bytes(&self) -> &[u8; 24] {
        &self.0
    }
}

/// Draws a fresh nonce from OS entropy.
pub fn generate_aead_nonce() -> AeadNonce {
    let mut bytes = [0u8; 24];
    OsRng.fill_bytes(&mut bytes);
    AeadNonce(bytes)
}

// ---------------------------------------------------------------------------
// Seal / open
// ---------------------------------------------------------------------------

/// Encrypts `plaintext`, binding `aad`. Returns ciphertext ‖ tag.
pub fn encrypt_xchacha20(
    key: &[u8; 32],
    nonce: &AeadNonce,
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    let payload = Payload { msg: plaintext, aad };

    cipher
        .encrypt(XNonce::from_slice(&nonce.0), payload)
        .map_err(|e| WalletkeepError::CryptoError {
            reason: format!("XChaCha20-Poly1305 encryption failed: {e}"),
        })
}

/// Decrypts ciphertext ‖ tag.
///
/// # Errors
///
/// [`WalletkeepError::InvalidPassword`] if the tag does not verify.
/// With a password-derived key, a wrong password, a tampered ciphertext
/// and mismatched `aad` are indistinguishable here; callers that can
/// detect structural damage must do so before calling.
pub fn decrypt_xchacha20(
    key: &[u8; 32],
    nonce: &AeadNonce,
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    let payload = Payload {
        msg: ciphertext,
        aad,
    };

    cipher
        .decrypt(XNonce::from_slice(&nonce.0), payload)
        .map_err(|_| WalletkeepError::InvalidPassword {
            reason: "authentication tag mismatch".into(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
