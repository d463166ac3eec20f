//! File-backed wallet store.
//!
//! # File format (v1)
//!
//! ```json
//! {
//!   "version": 1,
//!   "wallets": [
//!     {
//!       "id": 1,
//!       "name": "My Wallet",
//!       "address_type": "sr25519",
//!       "mnemonic_phrase": "xchacha20poly1305-argon2id$v=1$...",
//!       "secret_key": "xchacha20poly1305-argon2id$v=1$...",
//!       "public_key": "5Dfh..."
//!     }
//!   ]
//! }
//! ```
//!
//! Secrets only appear as sealed blobs. Writes go to a temporary file
//! that is then renamed over the original.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use walletkeep_types::{Result, WalletkeepError};
use walletkeep_wallet::collaborators::WalletStore;
use walletkeep_wallet::WalletRecord;

const CURRENT_VERSION: u32 = 1;

/// File name of the wallet store inside the data directory.
pub const WALLETS_FILE: &str = "wallets.json";

#[derive(Serialize, Deserialize)]
struct WalletsFileData {
    version: u32,
    wallets: Vec<WalletRecord>,
}

impl Default for WalletsFileData {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            wallets: Vec::new(),
        }
    }
}

/// [`WalletStore`] persisting every record to one JSON file.
pub struct JsonWalletStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonWalletStore {
    /// Store at `<data_dir>/wallets.json`.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(WALLETS_FILE),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<WalletsFileData> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(WalletsFileData::default())
            }
            Err(e) => return Err(failure(format!("failed to read wallet file: {e}"))),
        };

        let data: WalletsFileData = serde_json::from_str(&json)
            .map_err(|e| failure(format!("failed to parse wallet file: {e}")))?;

        if data.version != CURRENT_VERSION {
            return Err(failure(format!(
                "unsupported wallet file version {} (expected {CURRENT_VERSION})",
                data.version,
            )));
        }
        Ok(data)
    }

    async fn save(&self, data: &WalletsFileData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| failure(format!("failed to create data directory: {e}")))?;
        }

        let json = serde_json::to_string_pretty(data)
            .map_err(|e| failure(format!("JSON serialization failed: {e}")))?;

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json.as_bytes())
            .await
            .map_err(|e| failure(format!("failed to write wallet file: {e}")))?;

        if let Err(e) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(failure(format!("failed to rename wallet file: {e}")));
        }

        tracing::debug!(path = %self.path.display(), "wallet file saved");
        Ok(())
    }
}

#[async_trait]
impl WalletStore for JsonWalletStore {
    async fn create_wallet(&self, mut record: WalletRecord) -> Result<Option<WalletRecord>> {
        let _guard = self.lock.lock().await;
        let mut data = self.load().await?;

        if data.wallets.iter().any(|w| w.name == record.name) {
            tracing::warn!(name = %record.name, "a wallet with this name already exists");
            return Ok(None);
        }

        record.id = data.wallets.iter().map(|w| w.id).max().unwrap_or(0) + 1;
        data.wallets.push(record.clone());
        self.save(&data).await?;
        Ok(Some(record))
    }

    async fn find_wallet(&self, name: &str) -> Result<Option<WalletRecord>> {
        let _guard = self.lock.lock().await;
        let data = self.load().await?;
        Ok(data.wallets.into_iter().find(|w| w.name == name))
    }
}

fn failure(reason: String) -> WalletkeepError {
    WalletkeepError::PersistenceFailure { reason }
}
