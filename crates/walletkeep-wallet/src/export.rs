//! Export of a persisted wallet back to plaintext.
//!
//! The mirror image of import: both blobs are opened with the same
//! cipher that sealed them, the key pair is re-derived from the
//! opened mnemonic, and the result must reproduce the stored address
//! and secret key before anything is handed out.

use serde::Serialize;
use subtle::ConstantTimeEq;
use walletkeep_crypto::address::{decode_address, encode_address};
use walletkeep_crypto::backend::CryptoBackend;
use walletkeep_crypto::cipher::decrypt_string;
use walletkeep_crypto::secret::Password;
use walletkeep_types::{Result, WalletkeepError};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::record::WalletRecord;

/// Decrypted wallet, the counterpart of an import file.
///
/// Zeroized on drop. Serializes with the same field names an import
/// file uses, so an export can be imported again.
#[derive(Serialize, Zeroize, ZeroizeOnDrop)]
pub struct ExportFile {
    name: String,
    address_type: String,
    mnemonic_phrase: String,
    secret_key: String,
    public_key: String,
}

// ExportFile does not implement Clone/Debug to prevent leakage.

impl ExportFile {
    /// Wallet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Address type label.
    pub fn address_type(&self) -> &str {
        &self.address_type
    }

    /// Plaintext mnemonic phrase.
    pub fn mnemonic_phrase(&self) -> &str {
        &self.mnemonic_phrase
    }

    /// Plaintext `0x`-prefixed secret key hex.
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    /// SS58 address.
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Pretty-printed JSON held in a zeroizing buffer.
    pub fn to_json(&self) -> Result<Zeroizing<String>> {
        serde_json::to_string_pretty(self)
            .map(Zeroizing::new)
            .map_err(|e| WalletkeepError::CryptoError {
                reason: format!("export serialization failed: {e}"),
            })
    }
}

/// Opens `record` with `password` and cross-checks it.
///
/// # Errors
///
/// - [`WalletkeepError::InvalidPassword`] if the blobs do not open.
/// - [`WalletkeepError::CorruptBlob`] if a blob is malformed, the
///   stored address is unreadable, or the opened secrets do not
///   reproduce the stored address and secret key.
pub fn open_record(
    backend: &CryptoBackend,
    record: &WalletRecord,
    password: &Password,
) -> Result<ExportFile> {
    let (prefix, stored_key) =
        decode_address(&record.public_key).map_err(|e| WalletkeepError::CorruptBlob {
            reason: format!("stored public key is unreadable: {e}"),
        })?;

    let mnemonic = decrypt_string(password, &record.mnemonic_phrase)?;
    let secret_key = decrypt_string(password, &record.secret_key)?;

    let keypair = backend.keypair_from_mnemonic(&mnemonic).map_err(|_| {
        WalletkeepError::CorruptBlob {
            reason: "sealed mnemonic is not a valid phrase".into(),
        }
    })?;

    let key_matches: bool = keypair.public_key().as_bytes()[..].ct_eq(&stored_key[..]).into();
    if !key_matches {
        return Err(WalletkeepError::CorruptBlob {
            reason: "sealed mnemonic does not derive the stored public key".into(),
        });
    }

    let derived_secret = keypair.secret_key_hex()?;
    let secret_matches: bool = derived_secret.as_bytes().ct_eq(secret_key.as_bytes()).into();
    if !secret_matches {
        return Err(WalletkeepError::CorruptBlob {
            reason: "sealed secret key does not match the sealed mnemonic".into(),
        });
    }

    Ok(ExportFile {
        name: record.name.clone(),
        address_type: record.address_type.clone(),
        mnemonic_phrase: mnemonic.as_str().to_owned(),
        secret_key: secret_key.as_str().to_owned(),
        public_key: encode_address(&stored_key, prefix)?.into_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use walletkeep_crypto::backend::crypto_ready;
    use walletkeep_crypto::cipher::encrypt_str;
    use walletkeep_crypto::kdf::Argon2Params;

    const DEV_PHRASE: &str =
        "bottom drive obey lake curtain smoke basket hold race lonely fit walk";
    const DEV_ADDRESS: &str = "5DfhGyQdFobKM8NsWvEeAKk5EQQgYe9AydgJ7rMB6E1EqRzV";

    fn light() -> Argon2Params {
        Argon2Params {
            m_cost: 256,
            t_cost: 1,
            p_cost: 1,
        }
    }

    async fn sealed(
        phrase: &str,
        secret: Option<&str>,
        password: &Password,
    ) -> std::result::Result<WalletRecord, WalletkeepError> {
        let backend = crypto_ready().await?;
        let keypair = backend.keypair_from_mnemonic(phrase)?;
        let derived = keypair.secret_key_hex()?;
        Ok(WalletRecord {
            id: 1,
            name: "My Wallet".into(),
            address_type: "sr25519".into(),
            mnemonic_phrase: encrypt_str(password, phrase, &light())?,
            secret_key: encrypt_str(password, secret.unwrap_or(derived.as_str()), &light())?,
            public_key: DEV_ADDRESS.into(),
        })
    }

    #[tokio::test]
    async fn opens_consistent_record() -> std::result::Result<(), WalletkeepError> {
        let password = Password::new("Secret123");
        let record = sealed(DEV_PHRASE, None, &password).await?;
        let export = open_record(crypto_ready().await?, &record, &password)?;

        assert_eq!(export.name(), "My Wallet");
        assert_eq!(export.mnemonic_phrase(), DEV_PHRASE);
        assert_eq!(export.public_key(), DEV_ADDRESS);
        assert!(export.secret_key().starts_with("0x"));

        let json = export.to_json()?;
        assert!(json.contains("\"mnemonic_phrase\""));
        Ok(())
    }

    #[tokio::test]
    async fn wrong_password_rejected() -> std::result::Result<(), WalletkeepError> {
        let record = sealed(DEV_PHRASE, None, &Password::new("Secret123")).await?;
        let result = open_record(crypto_ready().await?, &record, &Password::new("nope"));
        assert!(matches!(result, Err(WalletkeepError::InvalidPassword { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn mismatched_secret_rejected() -> std::result::Result<(), WalletkeepError> {
        let password = Password::new("Secret123");
        let record = sealed(DEV_PHRASE, Some("0x00"), &password).await?;
        let result = open_record(crypto_ready().await?, &record, &password);
        assert!(matches!(result, Err(WalletkeepError::CorruptBlob { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn mismatched_address_rejected() -> std::result::Result<(), WalletkeepError> {
        let password = Password::new("Secret123");
        let mut record = sealed(DEV_PHRASE, None, &password).await?;
        record.public_key = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY".into();
        let result = open_record(crypto_ready().await?, &record, &password);
        assert!(matches!(result, Err(WalletkeepError::CorruptBlob { .. })));
        Ok(())
    }
}
