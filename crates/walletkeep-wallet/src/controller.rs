//! Wallet lifecycle controller.
//!
//! [`WalletController`] is built once per process with its
//! collaborators and configuration, then drives any number of
//! [`WalletSession`]s and exports. It performs no I/O itself; storage
//! and authentication go through the injected traits, and failures are
//! propagated without retry.

use std::sync::Arc;

use walletkeep_crypto::backend::{crypto_ready, CryptoBackend};
use walletkeep_crypto::kdf::Argon2Params;
use walletkeep_crypto::mnemonic::generate_mnemonic;
use walletkeep_crypto::secret::Password;
use walletkeep_types::config::WalletConfig;
use walletkeep_types::{Result, SessionState, WalletkeepError};

use crate::collaborators::{LoginProvider, SecretProvider, WalletStore};
use crate::export::{open_record, ExportFile};
use crate::import::parse_import_file;
use crate::record::WalletRecord;
use crate::session::WalletSession;

/// Orchestrates create, import and export.
pub struct WalletController {
    store: Arc<dyn WalletStore>,
    login: Arc<dyn LoginProvider>,
    secrets: Arc<dyn SecretProvider>,
    config: WalletConfig,
    params: Argon2Params,
    backend: &'static CryptoBackend,
}

impl WalletController {
    /// Validates `config`, awaits the crypto readiness barrier and
    /// returns a controller bound to the given collaborators.
    pub async fn new(
        store: Arc<dyn WalletStore>,
        login: Arc<dyn LoginProvider>,
        secrets: Arc<dyn SecretProvider>,
        config: WalletConfig,
    ) -> Result<Self> {
        config.validate()?;
        let backend = crypto_ready().await?;
        let params = Argon2Params::from_config(&config);

        Ok(Self {
            store,
            login,
            secrets,
            config,
            params,
            backend,
        })
    }

    /// The configuration this controller was built with.
    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    /// Starts a new session.
    pub fn new_session(&self) -> WalletSession {
        WalletSession::new()
    }

    // -- Binding ----------------------------------------------------------

    /// Generates a fresh mnemonic and binds it to `session`.
    pub fn generate_mnemonic(&self, session: &mut WalletSession) -> Result<()> {
        let mnemonic = generate_mnemonic(self.config.mnemonic_words)?;
        session.bind_mnemonic(self.backend, mnemonic.as_str(), self.config.ss58_prefix)
    }

    /// Binds a user-supplied mnemonic to `session`.
    pub fn bind_mnemonic(&self, session: &mut WalletSession, phrase: &str) -> Result<()> {
        session.bind_mnemonic(self.backend, phrase, self.config.ss58_prefix)
    }

    /// Parses an import file and binds its mnemonic to `session`.
    ///
    /// # Errors
    ///
    /// [`WalletkeepError::InvalidImportFile`] for malformed files or an
    /// absent or invalid mnemonic; the session is left unchanged.
    pub fn import_file(&self, session: &mut WalletSession, json: &str) -> Result<()> {
        let file = parse_import_file(json)?;
        session.bind_import(self.backend, &file, self.config.ss58_prefix)
    }

    // -- Saving -----------------------------------------------------------

    /// Create path: gates on the login collaborator with `password`,
    /// then seals and persists.
    ///
    /// A session still in `KeyBound` (or earlier) goes through
    /// [`WalletSession::request_save`] first, so an incomplete session
    /// fails before any collaborator is called. `password` is dropped,
    /// and zeroized, on every return path.
    pub async fn save(&self, session: &mut WalletSession, password: Password) -> Result<WalletRecord> {
        self.ensure_awaiting_password(session)?;

        if !self.login.login(&password).await {
            session.password_rejected()?;
            return Err(WalletkeepError::InvalidPassword {
                reason: "login rejected the password".into(),
            });
        }

        self.seal_and_persist(session, password).await
    }

    /// Import path: takes the password from the secret provider
    /// instead of prompting. An unavailable password is treated like a
    /// rejected login.
    pub async fn save_import(&self, session: &mut WalletSession) -> Result<WalletRecord> {
        self.ensure_awaiting_password(session)?;

        let Some(password) = self.secrets.get_wallet_password().await else {
            session.password_rejected()?;
            return Err(WalletkeepError::InvalidPassword {
                reason: "wallet password is unavailable".into(),
            });
        };

        self.seal_and_persist(session, password).await
    }

    /// Hands the already sealed record of a session whose persistence
    /// failed to the store again. Holds no plaintext and needs no
    /// password.
    pub async fn retry_persist(&self, session: &mut WalletSession) -> Result<WalletRecord> {
        let record = session.pending_record()?;
        self.persist(session, record).await
    }

    async fn seal_and_persist(
        &self,
        session: &mut WalletSession,
        password: Password,
    ) -> Result<WalletRecord> {
        session.begin_encrypting()?;
        let record = session.seal(&password, &self.params, &self.config.address_type)?;
        drop(password);

        self.persist(session, record).await
    }

    async fn persist(&self, session: &mut WalletSession, record: WalletRecord) -> Result<WalletRecord> {
        let name = record.name.clone();
        match self.store.create_wallet(record).await {
            Ok(Some(stored)) => {
                tracing::info!(name = %stored.name, id = stored.id, "wallet persisted");
                session.mark_persisted(stored.clone())?;
                Ok(stored)
            }
            Ok(None) => {
                tracing::warn!(name = %name, "wallet store refused record");
                Err(WalletkeepError::PersistenceFailure {
                    reason: format!("store refused wallet '{name}'"),
                })
            }
            Err(e) => {
                tracing::warn!(name = %name, error = %e, "wallet store failed");
                Err(WalletkeepError::PersistenceFailure {
                    reason: e.to_string(),
                })
            }
        }
    }

    fn ensure_awaiting_password(&self, session: &mut WalletSession) -> Result<()> {
        match session.state() {
            SessionState::AwaitingPassword => Ok(()),
            SessionState::Draft | SessionState::Drafted | SessionState::KeyBound => {
                session.request_save()
            }
            state => Err(WalletkeepError::InvalidTransition {
                reason: format!("cannot save in state {state}"),
            }),
        }
    }

    // -- Export -----------------------------------------------------------

    /// Gates on the login collaborator, loads the wallet named `name`,
    /// decrypts both secrets and verifies they reproduce the stored
    /// address before returning them.
    ///
    /// The store is not consulted until login succeeds.
    ///
    /// # Errors
    ///
    /// - [`WalletkeepError::InvalidPassword`] if login or decryption
    ///   rejects the password.
    /// - [`WalletkeepError::PersistenceFailure`] if no such wallet
    ///   exists or the store fails.
    /// - [`WalletkeepError::CorruptBlob`] if the record is damaged.
    pub async fn export_wallet(&self, name: &str, password: Password) -> Result<ExportFile> {
        if !self.login.login(&password).await {
            return Err(WalletkeepError::InvalidPassword {
                reason: "login rejected the password".into(),
            });
        }

        let record = self
            .store
            .find_wallet(name)
            .await
            .map_err(|e| WalletkeepError::PersistenceFailure {
                reason: e.to_string(),
            })?
            .ok_or_else(|| WalletkeepError::PersistenceFailure {
                reason: format!("no wallet named '{name}'"),
            })?;

        let export = open_record(self.backend, &record, &password)?;
        tracing::info!(name = %record.name, "wallet exported");
        Ok(export)
    }
}
