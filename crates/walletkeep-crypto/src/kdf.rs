//! Argon2id password key derivation.
//!
//! Turns a wallet password and a per-blob random salt into the 256-bit
//! key that seals one secret. Parameters travel inside every
//! [`crate::cipher::EncryptedBlob`], so a blob sealed under one
//! configuration still opens after the configuration changes.

use walletkeep_types::config::{
    WalletConfig, MAX_ARGON2_M_COST, MAX_ARGON2_P_COST, MAX_ARGON2_T_COST,
};
use walletkeep_types::{Result, WalletkeepError};
use zeroize::{Zeroize, ZeroizeOnDrop};

// ---------------------------------------------------------------------------
// Argon2Params
// ---------------------------------------------------------------------------

/// Argon2id cost parameters.
///
/// | Parameter | Default | Meaning |
/// |-----------|---------|---------|
/// | `m_cost`  | 65 536  | Memory usage in KiB (64 MiB) |
/// | `t_cost`  | 3       | Number of iterations |
/// | `p_cost`  | 1       | Degree of parallelism |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Argon2Params {
    /// Memory cost in KiB. Must be ≥ 8 × `p_cost`.
    pub m_cost: u32,
    /// Time cost (number of passes). Must be ≥ 1.
    pub t_cost: u32,
    /// Parallelism degree. Must be ≥ 1.
    pub p_cost: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            m_cost: 65_536,
            t_cost: 3,
            p_cost: 1,
        }
    }
}

impl Argon2Params {
    /// Reads the Argon2id costs out of a wallet configuration.
    pub fn from_config(config: &WalletConfig) -> Self {
        Self {
            m_cost: config.argon2_m_cost,
            t_cost: config.argon2_t_cost,
            p_cost: config.argon2_p_cost,
        }
    }

    /// Returns `true` if the parameters lie inside the accepted bounds.
    ///
    /// Applied to parameters parsed from untrusted blobs before any
    /// memory is allocated for the derivation.
    pub fn within_bounds(&self) -> bool {
        (1..=MAX_ARGON2_T_COST).contains(&self.t_cost)
            && (1..=MAX_ARGON2_P_COST).contains(&self.p_cost)
            && self.m_cost >= 8 * self.p_cost
            && self.m_cost <= MAX_ARGON2_M_COST
    }
}

// ---------------------------------------------------------------------------
// DerivedKey
// ---------------------------------------------------------------------------

/// 256-bit key derived by Argon2id, zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; 32]);

impl DerivedKey {
    /// Fixed byte length of the derived key.
    pub const LEN: usize = 32;

    /// Returns the raw 32-byte key material.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

// DerivedKey does not implement Clone/Debug to prevent leakage.

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

/// Minimum salt length accepted by the argon2 crate.
const MIN_SALT_LEN: usize = 8;

/// Derives a 256-bit key from `password` and `salt` using Argon2id
/// (version 0x13).
///
/// # Errors
///
/// - [`WalletkeepError::ConfigError`] if the salt is shorter than 8
///   bytes or the parameters are rejected by Argon2.
/// - [`WalletkeepError::CryptoError`] if the computation itself fails.
pub fn argon2id_derive_key(
    password: &[u8],
    salt: &[u8],
    params: &Argon2Params,
) -> Result<DerivedKey> {
    if salt.len() < MIN_SALT_LEN {
        return Err(WalletkeepError::ConfigError {
            reason: format!(
                "salt must be at least {MIN_SALT_LEN} bytes, got {}",
                salt.len()
            ),
        });
    }

    let argon2_params = argon2::Params::new(
        params.m_cost,
        params.t_cost,
        params.p_cost,
        Some(DerivedKey::LEN),
    )
    .map_err(|e| WalletkeepError::ConfigError {
        reason: format!("invalid Argon2 parameters: {e}"),
    })?;

    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2_params,
    );

    let mut key = DerivedKey([0u8; 32]);
    argon2
        .hash_password_into(password, salt, &mut key.0)
        .map_err(|e| WalletkeepError::CryptoError {
            reason: format!("Argon2id derivation failed: {e}"),
        })?;

    Ok(key)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
