//! Password-sealed secrets.
//!
//! An [`EncryptedBlob`] is a self-describing string: opening it needs
//! only the blob and the password.
//!
//! ```text
//! xchacha20poly1305-argon2id$v=1$m=65536,t=3,p=1$<salt>$<nonce>$<ciphertext+tag>
//! \_______________________ header ______________/
//! ```
//!
//! Salt (16 bytes), nonce (24 bytes) and ciphertext are lowercase hex.
//! The header is bound as AEAD associated data, so rewriting the
//! algorithm or cost fields is caught by the tag check.
//!
//! Failures are split in two:
//!
//! - [`WalletkeepError::CorruptBlob`]: the string does not parse (wrong
//!   algorithm or version, cost fields out of bounds, bad hex, wrong
//!   lengths) or the plaintext is not what the caller expected.
//! - [`WalletkeepError::InvalidPassword`]: the blob is well formed but
//!   the tag does not verify under the derived key.

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use walletkeep_types::{Result, WalletkeepError};
use zeroize::Zeroizing;

use crate::aead::{decrypt_xchacha20, encrypt_xchacha20, generate_aead_nonce, AeadNonce, TAG_LEN};
use crate::kdf::{argon2id_derive_key, Argon2Params};
use crate::secret::Password;

/// Algorithm identifier, first header field.
pub const ALGORITHM: &str = "xchacha20poly1305-argon2id";

/// Blob format version, second header field.
pub const VERSION: u32 = 1;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Number of `$`-separated fields in a blob.
const FIELD_COUNT: usize = 6;

// ---------------------------------------------------------------------------
// EncryptedBlob
// ---------------------------------------------------------------------------

/// Opaque password-sealed ciphertext.
///
/// Serializes as a plain JSON string.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedBlob(String);

impl EncryptedBlob {
    /// Wraps a string read from storage. Nothing is checked until
    /// [`decrypt`] parses it.
    pub fn from_string(blob: String) -> Self {
        Self(blob)
    }

    /// Returns the blob text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EncryptedBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Encrypt
// ---------------------------------------------------------------------------

/// Seals `plaintext` under `password`.
///
/// Each call draws its own salt and nonce, so sealing the same
/// plaintext twice never yields the same blob.
///
/// # Errors
///
/// [`WalletkeepError::ConfigError`] if `params` are out of bounds.
pub fn encrypt(password: &Password, plaintext: &[u8], params: &Argon2Params) -> Result<EncryptedBlob> {
    if !params.within_bounds() {
        return Err(WalletkeepError::ConfigError {
            reason: format!("Argon2 parameters out of bounds: {params:?}"),
        });
    }

    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let nonce = generate_aead_nonce();

    let header = header(params);
    let key = argon2id_derive_key(password.as_bytes(), &salt, params)?;
    let ciphertext = encrypt_xchacha20(key.as_bytes(), &nonce, plaintext, header.as_bytes())?;

    Ok(EncryptedBlob(format!(
        "{header}${}${}${}",
        hex::encode(salt),
        hex::encode(nonce.as_bytes()),
        hex::encode(ciphertext),
    )))
}

/// Seals a UTF-8 secret.
pub fn encrypt_str(password: &Password, plaintext: &str, params: &Argon2Params) -> Result<EncryptedBlob> {
    encrypt(password, plaintext.as_bytes(), params)
}

// ---------------------------------------------------------------------------
// Decrypt
// ---------------------------------------------------------------------------

/// Opens `blob` with `password`.
///
/// # Errors
///
/// - [`WalletkeepError::CorruptBlob`] if the blob is malformed.
/// - [`WalletkeepError::InvalidPassword`] if the tag does not verify.
pub fn decrypt(password: &Password, blob: &EncryptedBlob) -> Result<Zeroizing<Vec<u8>>> {
    let parsed = ParsedBlob::parse(blob.as_str())?;

    let key = argon2id_derive_key(password.as_bytes(), &parsed.salt, &parsed.params)
        .map_err(|e| corrupt(format!("key derivation rejected blob parameters: {e}")))?;

    let plaintext = decrypt_xchacha20(
        key.as_bytes(),
        &parsed.nonce,
        &parsed.ciphertext,
        parsed.header.as_bytes(),
    )?;

    Ok(Zeroizing::new(plaintext))
}

/// Opens `blob` and interprets the plaintext as UTF-8.
///
/// # Errors
///
/// As [`decrypt`], plus [`WalletkeepError::CorruptBlob`] if the
/// plaintext is not valid UTF-8.
pub fn decrypt_string(password: &Password, blob: &EncryptedBlob) -> Result<Zeroizing<String>> {
    let mut bytes = decrypt(password, blob)?;
    let taken = std::mem::take(&mut *bytes);
    match String::from_utf8(taken) {
        Ok(text) => Ok(Zeroizing::new(text)),
        Err(e) => {
            // Scrub the rejected buffer before reporting.
            let _ = Zeroizing::new(e.into_bytes());
            Err(corrupt("plaintext is not valid UTF-8".into()))
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

struct ParsedBlob<'a> {
    header: &'a str,
    params: Argon2Params,
    salt: [u8; SALT_LEN],
    nonce: AeadNonce,
    ciphertext: Vec<u8>,
}

impl<'a> ParsedBlob<'a> {
    fn parse(blob: &'a str) -> Result<Self> {
        let fields: Vec<&str> = blob.split('$').collect();
        if fields.len() != FIELD_COUNT {
            return Err(corrupt(format!(
                "expected {FIELD_COUNT} fields, got {}",
                fields.len()
            )));
        }

        if fields[0] != ALGORITHM {
            return Err(corrupt("unknown algorithm".into()));
        }
        if fields[1] != format!("v={VERSION}") {
            return Err(corrupt("unsupported version".into()));
        }

        let params = parse_params(fields[2])?;
        if !params.within_bounds() {
            return Err(corrupt("cost parameters out of bounds".into()));
        }

        let header_len = fields[0].len() + fields[1].len() + fields[2].len() + 2;
        let header = &blob[..header_len];

        let salt = decode_fixed::<SALT_LEN>(fields[3], "salt")?;
        let nonce = AeadNonce::from_bytes(decode_fixed::<{ AeadNonce::LEN }>(fields[4], "nonce")?);

        let ciphertext =
            hex::decode(fields[5]).map_err(|e| corrupt(format!("invalid ciphertext hex: {e}")))?;
        if ciphertext.len() < TAG_LEN {
            return Err(corrupt("ciphertext shorter than authentication tag".into()));
        }

        Ok(Self {
            header,
            params,
            salt,
            nonce,
            ciphertext,
        })
    }
}

fn header(params: &Argon2Params) -> String {
    format!(
        "{ALGORITHM}$v={VERSION}$m={},t={},p={}",
        params.m_cost, params.t_cost, params.p_cost
    )
}

fn parse_params(field: &str) -> Result<Argon2Params> {
    let mut parts = field.split(',');
    let mut next = |name: &str| -> Result<u32> {
        let part = parts
            .next()
            .ok_or_else(|| corrupt(format!("missing {name} parameter")))?;
        let value = part
            .strip_prefix(name)
            .and_then(|rest| rest.strip_prefix('='))
            .ok_or_else(|| corrupt(format!("malformed {name} parameter")))?;
        value
            .parse::<u32>()
            .map_err(|_| corrupt(format!("non-numeric {name} parameter")))
    };

    let m_cost = next("m")?;
    let t_cost = next("t")?;
    let p_cost = next("p")?;

    if parts.next().is_some() {
        return Err(corrupt("unexpected extra parameter".into()));
    }

    Ok(Argon2Params {
        m_cost,
        t_cost,
        p_cost,
    })
}

fn decode_fixed<const N: usize>(field: &str, what: &str) -> Result<[u8; N]> {
    let mut out = [0u8; N];
    hex::decode_to_slice(field, &mut out)
        .map_err(|e| corrupt(format!("invalid {what}: {e}")))?;
    Ok(out)
}

fn corrupt(reason: String) -> WalletkeepError {
    WalletkeepError::CorruptBlob { reason }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
