//! Core shared types for the walletkeep key management workspace.
//!
//! This crate defines the error taxonomy, configuration and session
//! state shared by the crypto, wallet and CLI crates. It holds no
//! cryptographic code and no secret material.

pub mod config;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Position of a wallet creation/import session in its lifecycle.
///
/// ```text
/// Draft -> Drafted -> KeyBound -> AwaitingPassword -> Encrypting -> Persisted
/// ```
///
/// A rejected password keeps the session in `AwaitingPassword`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// Nothing entered yet.
    Draft,
    /// Name and/or address type filled in, no key material bound.
    Drafted,
    /// A valid mnemonic is bound and the key pair has been derived.
    KeyBound,
    /// Save requested; waiting for the password gate.
    AwaitingPassword,
    /// Password accepted; secrets are being sealed and handed to storage.
    Encrypting,
    /// The encrypted record was accepted by the persistence collaborator.
    Persisted,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Drafted => write!(f, "drafted"),
            Self::KeyBound => write!(f, "key-bound"),
            Self::AwaitingPassword => write!(f, "awaiting-password"),
            Self::Encrypting => write!(f, "encrypting"),
            Self::Persisted => write!(f, "persisted"),
        }
    }
}

// ---------------------------------------------------------------------------
// WalletkeepError
// ---------------------------------------------------------------------------

/// Central error type for the walletkeep workspace.
///
/// Every variant carries a human-readable `reason`. Reasons never
/// contain mnemonic words, secret keys or passwords.
#[derive(Debug, Error)]
pub enum WalletkeepError {
    /// The mnemonic phrase is malformed or fails its checksum.
    #[error("invalid mnemonic: {reason}")]
    InvalidMnemonic {
        /// Why the phrase was rejected.
        reason: String,
    },

    /// A required wallet field is missing before save.
    #[error("incomplete wallet data: {reason}")]
    IncompleteWalletData {
        /// Which field is missing.
        reason: String,
    },

    /// The login collaborator or the cipher rejected the password.
    #[error("invalid password: {reason}")]
    InvalidPassword {
        /// Where the rejection happened.
        reason: String,
    },

    /// An encrypted blob is structurally malformed.
    #[error("corrupt encrypted blob: {reason}")]
    CorruptBlob {
        /// Which part of the blob failed to parse.
        reason: String,
    },

    /// An import file is not valid JSON or lacks a valid mnemonic.
    #[error("invalid import file: {reason}")]
    InvalidImportFile {
        /// What was wrong with the file.
        reason: String,
    },

    /// The persistence collaborator reported a failure.
    #[error("persistence failure: {reason}")]
    PersistenceFailure {
        /// Description of the storage failure.
        reason: String,
    },

    /// An address string is malformed or fails its checksum.
    #[error("invalid address: {reason}")]
    InvalidAddress {
        /// Why the address was rejected.
        reason: String,
    },

    /// A session operation was attempted from a state that does not allow it.
    #[error("invalid transition: {reason}")]
    InvalidTransition {
        /// The attempted operation and the current state.
        reason: String,
    },

    /// A cryptographic primitive failed unexpectedly.
    #[error("crypto error: {reason}")]
    CryptoError {
        /// Description of the failure.
        reason: String,
    },

    /// A configuration value is invalid.
    #[error("config error: {reason}")]
    ConfigError {
        /// Description of the configuration problem.
        reason: String,
    },
}

impl WalletkeepError {
    /// Returns `true` if the user can recover by retrying an action
    /// (re-entering a password, re-uploading a file, regenerating a
    /// mnemonic, or retrying the save).
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::CryptoError { .. } | Self::ConfigError { .. })
    }
}

// ---------------------------------------------------------------------------
// Result alias
// ---------------------------------------------------------------------------

/// Convenience result type using [`WalletkeepError`].
pub type Result<T> = std::result::Result<T, WalletkeepError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
