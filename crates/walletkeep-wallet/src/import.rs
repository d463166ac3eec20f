//! Import file parsing.
//!
//! An import file is a JSON object:
//!
//! ```json
//! { "mnemonic_phrase": "...", "secret_key": "0x...", "public_key": "5..." }
//! ```
//!
//! Only `mnemonic_phrase` is authoritative. `secret_key` and
//! `public_key` are kept for display until the session has re-derived
//! the real keys from the phrase; they never reach the cipher.

use serde::Deserialize;
use walletkeep_crypto::mnemonic::validate_mnemonic;
use walletkeep_types::{Result, WalletkeepError};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Parsed import file. Unknown fields are ignored.
#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct ImportFile {
    #[serde(default)]
    mnemonic_phrase: Option<String>,
    #[serde(default)]
    secret_key: Option<String>,
    #[serde(default)]
    public_key: Option<String>,
}

// ImportFile does not implement Clone/Debug to prevent leakage.

impl ImportFile {
    /// The validated mnemonic phrase.
    pub fn mnemonic_phrase(&self) -> &str {
        self.mnemonic_phrase.as_deref().unwrap_or_default()
    }

    /// Secret key embedded in the file, if any. Untrusted.
    pub fn embedded_secret_key(&self) -> Option<&str> {
        self.secret_key.as_deref().filter(|s| !s.is_empty())
    }

    /// Public key embedded in the file, if any. Untrusted.
    pub fn embedded_public_key(&self) -> Option<&str> {
        self.public_key.as_deref().filter(|s| !s.is_empty())
    }
}

/// Parses and validates an import file.
///
/// # Errors
///
/// [`WalletkeepError::InvalidImportFile`] if the text is not a JSON
/// object of the expected shape, or `mnemonic_phrase` is absent or
/// fails mnemonic validation.
pub fn parse_import_file(json: &str) -> Result<ImportFile> {
    let file: ImportFile =
        serde_json::from_str(json).map_err(|e| WalletkeepError::InvalidImportFile {
            reason: format!("failed to read JSON: line {} column {}", e.line(), e.column()),
        })?;

    match file.mnemonic_phrase.as_deref() {
        None | Some("") => Err(WalletkeepError::InvalidImportFile {
            reason: "mnemonic_phrase is missing".into(),
        }),
        Some(phrase) if !validate_mnemonic(phrase) => Err(WalletkeepError::InvalidImportFile {
            reason: "mnemonic_phrase is not a valid mnemonic".into(),
        }),
        Some(_) => Ok(file),
    }
}
