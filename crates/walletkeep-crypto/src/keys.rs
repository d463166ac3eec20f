//! sr25519 key pairs.
//!
//! A [`KeyPair`] is expanded from a 32-byte mini secret with
//! schnorrkel's Ed25519 expansion mode, the Substrate convention.
//! Construction goes through [`crate::backend::CryptoBackend`], so no
//! key pair exists before the backend has passed its self-test.

use schnorrkel::{signing_context, ExpansionMode, MiniSecretKey, SecretKey};
use walletkeep_types::{Result, WalletkeepError};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::mnemonic::Seed;

/// Signing context for [`KeyPair::sign`] and [`verify`].
pub const SIGNING_CONTEXT: &[u8] = b"substrate";

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// sr25519 public key (32 bytes, compressed Ristretto point).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    /// Fixed byte length of an sr25519 public key.
    pub const LEN: usize = 32;

    /// Creates a [`PublicKey`] from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying 32-byte array.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// KeyPair
// ---------------------------------------------------------------------------

/// sr25519 key pair.
///
/// The 64-byte secret (32-byte scalar followed by the 32-byte signing
/// nonce, Ed25519 byte order) is zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyPair {
    #[zeroize(skip)]
    public: PublicKey,
    secret: [u8; 64],
}

// KeyPair does not implement Clone/Debug to prevent leakage.

impl KeyPair {
    /// Fixed byte length of the encoded secret key.
    pub const SECRET_LEN: usize = 64;

    /// Expands a mini secret into a key pair.
    pub(crate) fn from_seed(seed: &Seed) -> Result<Self> {
        let mini = MiniSecretKey::from_bytes(seed.as_bytes()).map_err(|e| {
            WalletkeepError::CryptoError {
                reason: format!("invalid sr25519 mini secret: {e}"),
            }
        })?;
        let expanded = mini.expand_to_keypair(ExpansionMode::Ed25519);

        Ok(Self {
            public: PublicKey(expanded.public.to_bytes()),
            secret: expanded.secret.to_ed25519_bytes(),
        })
    }

    /// Returns the public half of this key pair.
    pub fn public_key(&self) -> PublicKey {
        self.public
    }

    /// Returns the 64-byte secret key.
    ///
    /// # Security
    ///
    /// Sensitive key material. Do not copy it out of a zeroizing
    /// container.
    pub fn secret_key_bytes(&self) -> &[u8; 64] {
        &self.secret
    }

    /// Returns the secret key as a `0x`-prefixed lowercase hex string
    /// held in a zeroizing buffer.
    pub fn secret_key_hex(&self) -> Result<Zeroizing<String>> {
        let mut buf = Zeroizing::new([0u8; 128]);
        hex::encode_to_slice(&self.secret, &mut buf[..]).map_err(|e| {
            WalletkeepError::CryptoError {
                reason: format!("secret key hex encoding failed: {e}"),
            }
        })?;

        let mut out = Zeroizing::new(String::with_capacity(130));
        out.push_str("0x");
        // Hex output is always ASCII.
        for &byte in buf.iter() {
            out.push(char::from(byte));
        }
        Ok(out)
    }

    /// Signs `message` under [`SIGNING_CONTEXT`].
    pub fn sign(&self, message: &[u8]) -> Result<[u8; 64]> {
        let secret = SecretKey::from_ed25519_bytes(&self.secret).map_err(|e| {
            WalletkeepError::CryptoError {
                reason: format!("invalid sr25519 secret key: {e}"),
            }
        })?;
        let keypair = secret.to_keypair();
        let signature = keypair.sign(signing_context(SIGNING_CONTEXT).bytes(message));
        Ok(signature.to_bytes())
    }
}

/// Verifies an sr25519 signature produced by [`KeyPair::sign`].
///
/// # Errors
///
/// [`WalletkeepError::CryptoError`] if the key or signature is
/// malformed or verification fails.
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &[u8; 64]) -> Result<()> {
    let public = schnorrkel::PublicKey::from_bytes(public_key.as_bytes()).map_err(|e| {
        WalletkeepError::CryptoError {
            reason: format!("invalid sr25519 public key: {e}"),
        }
    })?;
    let signature = schnorrkel::Signature::from_bytes(signature).map_err(|e| {
        WalletkeepError::CryptoError {
            reason: format!("malformed sr25519 signature: {e}"),
        }
    })?;

    public
        .verify_simple(SIGNING_CONTEXT, message, &signature)
        .map_err(|e| WalletkeepError::CryptoError {
            reason: format!("signature verification failed: {e}"),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
