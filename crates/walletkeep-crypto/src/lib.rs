//! Cryptographic primitives for walletkeep.
//!
//! This crate is the **sole** location for cryptographic operations.
//! The wallet and CLI crates never touch raw key material or ciphers
//! directly.
//!
//! # Modules
//!
//! - [`mnemonic`]: BIP39 phrase generation, validation, mini-secret seed
//! - [`backend`]: one-time readiness barrier guarding key derivation
//! - [`keys`]: sr25519 key pair expanded from a seed
//! - [`address`]: SS58 address encoding and decoding
//! - [`kdf`]: Argon2id password key derivation
//! - [`aead`]: XChaCha20-Poly1305 authenticated encryption
//! - [`cipher`]: self-describing password-sealed [`cipher::EncryptedBlob`]s
//! - [`secret`]: scoped [`secret::Password`] handle

pub mod address;
pub mod aead;
pub mod backend;
pub mod cipher;
pub mod kdf;
pub mod keys;
pub mod mnemonic;
pub mod secret;
