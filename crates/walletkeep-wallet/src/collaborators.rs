//! External collaborators the wallet controller calls into.
//!
//! The controller never implements storage or authentication itself.
//! It is handed one instance of each trait at construction and calls
//! them through `Arc<dyn _>`.

use async_trait::async_trait;
use tokio::sync::Mutex;
use walletkeep_crypto::secret::Password;
use walletkeep_types::Result;

use crate::record::WalletRecord;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Persistence for finished wallet records.
#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Stores `record` and returns it as persisted (with its assigned
    /// id). `Ok(None)` is a generic refusal, e.g. a duplicate name.
    async fn create_wallet(&self, record: WalletRecord) -> Result<Option<WalletRecord>>;

    /// Looks up a persisted wallet by name.
    async fn find_wallet(&self, name: &str) -> Result<Option<WalletRecord>>;
}

/// Password gate in front of every save and export.
#[async_trait]
pub trait LoginProvider: Send + Sync {
    /// Returns `true` if `password` is the user's password.
    async fn login(&self, password: &Password) -> bool;
}

/// Source of the already-unlocked wallet password, used on import so
/// the user is not prompted again.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Returns the password, or `None` if it is unavailable.
    async fn get_wallet_password(&self) -> Option<Password>;
}

// ---------------------------------------------------------------------------
// MemoryWalletStore
// ---------------------------------------------------------------------------

/// In-process [`WalletStore`].
///
/// Assigns sequential ids starting at 1 and refuses duplicate names
/// with `Ok(None)`.
#[derive(Debug, Default)]
pub struct MemoryWalletStore {
    records: Mutex<Vec<WalletRecord>>,
}

impl MemoryWalletStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every stored record.
    pub async fn records(&self) -> Vec<WalletRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl WalletStore for MemoryWalletStore {
    async fn create_wallet(&self, mut record: WalletRecord) -> Result<Option<WalletRecord>> {
        let mut records = self.records.lock().await;
        if records.iter().any(|r| r.name == record.name) {
            tracing::debug!(name = %record.name, "duplicate wallet name refused");
            return Ok(None);
        }

        record.id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        records.push(record.clone());
        Ok(Some(record))
    }

    async fn find_wallet(&self, name: &str) -> Result<Option<WalletRecord>> {
        let records = self.records.lock().await;
        Ok(records.iter().find(|r| r.name == name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use walletkeep_crypto::cipher::EncryptedBlob;
    use walletkeep_types::WalletkeepError;

    fn record(name: &str) -> WalletRecord {
        WalletRecord {
            id: 0,
            name: name.into(),
            address_type: "sr25519".into(),
            mnemonic_phrase: EncryptedBlob::from_string("m".into()),
            secret_key: EncryptedBlob::from_string("s".into()),
            public_key: "addr".into(),
        }
    }

    #[tokio::test]
    async fn assigns_sequential_ids() -> std::result::Result<(), WalletkeepError> {
        let store = MemoryWalletStore::new();
        let a = store.create_wallet(record("a")).await?;
        let b = store.create_wallet(record("b")).await?;
        assert_eq!(a.map(|r| r.id), Some(1));
        assert_eq!(b.map(|r| r.id), Some(2));
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_name_refused() -> std::result::Result<(), WalletkeepError> {
        let store = MemoryWalletStore::new();
        assert!(store.create_wallet(record("a")).await?.is_some());
        assert!(store.create_wallet(record("a")).await?.is_none());
        assert_eq!(store.records().await.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn find_by_name() -> std::result::Result<(), WalletkeepError> {
        let store = MemoryWalletStore::new();
        store.create_wallet(record("a")).await?;
        assert!(store.find_wallet("a").await?.is_some());
        assert!(store.find_wallet("b").await?.is_none());
        Ok(())
    }
}
