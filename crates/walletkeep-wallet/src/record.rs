//! Persisted wallet record.

use serde::{Deserialize, Serialize};
use walletkeep_crypto::cipher::EncryptedBlob;

/// A wallet as handed to and returned by the persistence collaborator.
///
/// The mnemonic and secret key only exist here as [`EncryptedBlob`]s;
/// there is no field that could carry them in plaintext. `public_key`
/// holds the SS58 address of the wallet's sr25519 public key.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct WalletRecord {
    /// Identifier assigned by the store. `0` until persisted.
    pub id: u64,
    /// User-chosen name, unique per user.
    pub name: String,
    /// Network or key-type label.
    pub address_type: String,
    /// Sealed BIP39 phrase.
    pub mnemonic_phrase: EncryptedBlob,
    /// Sealed `0x`-prefixed hex of the 64-byte sr25519 secret key.
    pub secret_key: EncryptedBlob,
    /// SS58 address.
    pub public_key: String,
}
