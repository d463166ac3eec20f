//! Wallet creation session state machine.
//!
//! ```text
//! Draft ──details──▶ Drafted ──mnemonic──▶ KeyBound ──request_save──▶ AwaitingPassword
//!                                                                      │        ▲
//!                                                      password ok     │        │ rejected / cipher failed
//!                                                                      ▼        │
//!                                        Persisted ◀──stored── Encrypting ─────┘
//! ```
//!
//! The plaintext mnemonic and secret key live only in the session's
//! [`SecretDraft`], which is zeroized on drop. The draft is dropped the
//! moment [`WalletSession::seal`] has produced the encrypted record, so
//! a session in `Encrypting` or `Persisted` holds no plaintext at all.
//!
//! Every operation checks the current state first and fails with
//! [`WalletkeepError::InvalidTransition`] without side effects if the
//! state does not allow it.

use subtle::ConstantTimeEq;
use walletkeep_crypto::address::encode_address;
use walletkeep_crypto::backend::CryptoBackend;
use walletkeep_crypto::cipher::encrypt_str;
use walletkeep_crypto::kdf::Argon2Params;
use walletkeep_crypto::mnemonic::{parse_mnemonic, validate_mnemonic};
use walletkeep_crypto::secret::Password;
use walletkeep_types::{Result, SessionState, WalletkeepError};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::import::ImportFile;
use crate::record::WalletRecord;

// ---------------------------------------------------------------------------
// SecretDraft
// ---------------------------------------------------------------------------

/// Plaintext secrets of a session that has not been sealed yet.
#[derive(Zeroize, ZeroizeOnDrop)]
struct SecretDraft {
    mnemonic: String,
    secret_key: String,
}

// ---------------------------------------------------------------------------
// WalletSession
// ---------------------------------------------------------------------------

/// One wallet create or import flow.
pub struct WalletSession {
    state: SessionState,
    name: String,
    address_type: String,
    public_key: Option<String>,
    draft: Option<SecretDraft>,
    sealed: Option<WalletRecord>,
}

impl Default for WalletSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletSession {
    /// Starts an empty session in [`SessionState::Draft`].
    pub fn new() -> Self {
        Self {
            state: SessionState::Draft,
            name: String::new(),
            address_type: String::new(),
            public_key: None,
            draft: None,
            sealed: None,
        }
    }

    // -- Accessors --------------------------------------------------------

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Wallet name as entered.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Address type as entered (may be empty).
    pub fn address_type(&self) -> &str {
        &self.address_type
    }

    /// SS58 address of the bound key pair.
    pub fn public_key(&self) -> Option<&str> {
        self.public_key.as_deref()
    }

    /// Returns `true` while plaintext secrets are held.
    pub fn holds_plaintext(&self) -> bool {
        self.draft.is_some()
    }

    /// The sealed record awaiting persistence, if any.
    pub fn sealed_record(&self) -> Option<&WalletRecord> {
        self.sealed.as_ref()
    }

    // -- Draft / Drafted / KeyBound ---------------------------------------

    /// Sets the wallet name and address type.
    ///
    /// Moves `Draft` to `Drafted`; editing details later in `Drafted`
    /// or `KeyBound` keeps the state.
    pub fn set_details(&mut self, name: &str, address_type: &str) -> Result<()> {
        self.require(
            &[SessionState::Draft, SessionState::Drafted, SessionState::KeyBound],
            "set wallet details",
        )?;

        self.name = name.to_owned();
        self.address_type = address_type.to_owned();
        if self.state == SessionState::Draft {
            self.transition(SessionState::Drafted);
        }
        Ok(())
    }

    /// Validates `phrase`, derives its key pair and binds both to the
    /// session, replacing any previously bound phrase.
    ///
    /// # Errors
    ///
    /// [`WalletkeepError::InvalidMnemonic`] if the phrase is invalid;
    /// the session is left unchanged.
    pub fn bind_mnemonic(
        &mut self,
        backend: &CryptoBackend,
        phrase: &str,
        ss58_prefix: u16,
    ) -> Result<()> {
        self.require(
            &[SessionState::Draft, SessionState::Drafted, SessionState::KeyBound],
            "bind mnemonic",
        )?;

        let mnemonic = parse_mnemonic(phrase)?;
        let keypair = backend.keypair_from_mnemonic(mnemonic.as_str())?;
        let address = encode_address(keypair.public_key().as_bytes(), ss58_prefix)?;
        let secret_hex = keypair.secret_key_hex()?;

        self.draft = Some(SecretDraft {
            mnemonic: mnemonic.as_str().to_owned(),
            secret_key: secret_hex.as_str().to_owned(),
        });
        self.public_key = Some(address.into_string());
        self.transition(SessionState::KeyBound);
        Ok(())
    }

    /// Binds the mnemonic of an import file.
    ///
    /// Keys are always re-derived from the phrase. Embedded keys that
    /// disagree with the derived ones are logged and discarded.
    pub fn bind_import(
        &mut self,
        backend: &CryptoBackend,
        file: &ImportFile,
        ss58_prefix: u16,
    ) -> Result<()> {
        self.bind_mnemonic(backend, file.mnemonic_phrase(), ss58_prefix)
            .map_err(|e| match e {
                WalletkeepError::InvalidMnemonic { reason } => {
                    WalletkeepError::InvalidImportFile { reason }
                }
                other => other,
            })?;

        if let (Some(embedded), Some(derived)) = (file.embedded_public_key(), self.public_key()) {
            if embedded != derived {
                tracing::warn!(
                    embedded = %embedded,
                    derived = %derived,
                    "import file public key does not match its mnemonic; using derived key"
                );
            }
        }

        if let (Some(embedded), Some(draft)) = (file.embedded_secret_key(), self.draft.as_ref()) {
            let embedded = Zeroizing::new(embedded.to_ascii_lowercase());
            let matches: bool = embedded
                .as_bytes()
                .ct_eq(draft.secret_key.as_bytes())
                .into();
            if !matches {
                tracing::warn!("import file secret key does not match its mnemonic; using derived key");
            }
        }

        Ok(())
    }

    // -- Save -------------------------------------------------------------

    /// Applies the validation gate and moves `KeyBound` to
    /// `AwaitingPassword`.
    ///
    /// # Errors
    ///
    /// - [`WalletkeepError::IncompleteWalletData`] if the name is
    ///   blank, no valid mnemonic is bound, or either key is missing.
    ///   Also returned from `Draft` and `Drafted`, which by definition
    ///   lack a key pair.
    /// - [`WalletkeepError::InvalidTransition`] from any later state.
    pub fn request_save(&mut self) -> Result<()> {
        match self.state {
            SessionState::Draft | SessionState::Drafted => {
                return Err(WalletkeepError::IncompleteWalletData {
                    reason: "no mnemonic bound".into(),
                })
            }
            SessionState::KeyBound => {}
            _ => return Err(self.illegal("request save")),
        }

        self.check_complete()?;
        self.transition(SessionState::AwaitingPassword);
        Ok(())
    }

    /// Records a rejected password. The session stays in
    /// `AwaitingPassword` so the user can try again.
    pub(crate) fn password_rejected(&mut self) -> Result<()> {
        self.require(&[SessionState::AwaitingPassword], "reject password")?;
        tracing::debug!(name = %self.name, "password rejected");
        Ok(())
    }

    /// Moves `AwaitingPassword` to `Encrypting` after the password gate.
    pub(crate) fn begin_encrypting(&mut self) -> Result<()> {
        self.require(&[SessionState::AwaitingPassword], "begin encryption")?;
        self.transition(SessionState::Encrypting);
        Ok(())
    }

    /// Seals the draft under `password` and drops the plaintext.
    ///
    /// On success the sealed record is held by the session until
    /// [`WalletSession::mark_persisted`]. On failure the session
    /// returns to `AwaitingPassword` with the draft intact.
    pub(crate) fn seal(
        &mut self,
        password: &Password,
        params: &Argon2Params,
        default_address_type: &str,
    ) -> Result<WalletRecord> {
        self.require(&[SessionState::Encrypting], "seal wallet")?;

        let sealed = self.seal_draft(password, params, default_address_type);
        match sealed {
            Ok(record) => {
                self.draft = None;
                self.sealed = Some(record.clone());
                Ok(record)
            }
            Err(e) => {
                self.transition(SessionState::AwaitingPassword);
                Err(e)
            }
        }
    }

    /// Completes the session with the record as stored.
    pub(crate) fn mark_persisted(&mut self, stored: WalletRecord) -> Result<()> {
        self.require(&[SessionState::Encrypting], "mark persisted")?;
        self.sealed = Some(stored);
        self.transition(SessionState::Persisted);
        Ok(())
    }

    /// Returns the sealed record for another persistence attempt.
    pub(crate) fn pending_record(&self) -> Result<WalletRecord> {
        match (&self.state, &self.sealed) {
            (SessionState::Encrypting, Some(record)) => Ok(record.clone()),
            _ => Err(self.illegal("retry persistence")),
        }
    }

    // -- Internals --------------------------------------------------------

    fn seal_draft(
        &self,
        password: &Password,
        params: &Argon2Params,
        default_address_type: &str,
    ) -> Result<WalletRecord> {
        let draft = self.draft.as_ref().ok_or_else(|| WalletkeepError::IncompleteWalletData {
            reason: "no secrets to seal".into(),
        })?;
        let public_key = self.public_key.clone().ok_or_else(|| {
            WalletkeepError::IncompleteWalletData {
                reason: "public key missing".into(),
            }
        })?;

        // All-or-nothing: both blobs exist before the record does.
        let mnemonic_phrase = encrypt_str(password, &draft.mnemonic, params)?;
        let secret_key = encrypt_str(password, &draft.secret_key, params)?;

        let address_type = if self.address_type.trim().is_empty() {
            default_address_type.to_owned()
        } else {
            self.address_type.clone()
        };

        Ok(WalletRecord {
            id: 0,
            name: self.name.trim().to_owned(),
            address_type,
            mnemonic_phrase,
            secret_key,
            public_key,
        })
    }

    fn check_complete(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(WalletkeepError::IncompleteWalletData {
                reason: "wallet name is empty".into(),
            });
        }

        let draft = self.draft.as_ref().ok_or_else(|| WalletkeepError::IncompleteWalletData {
            reason: "mnemonic phrase is missing".into(),
        })?;
        if !validate_mnemonic(&draft.mnemonic) {
            return Err(WalletkeepError::IncompleteWalletData {
                reason: "mnemonic phrase is not valid".into(),
            });
        }
        if draft.secret_key.is_empty() {
            return Err(WalletkeepError::IncompleteWalletData {
                reason: "secret key is missing".into(),
            });
        }
        if self.public_key.as_deref().map_or(true, str::is_empty) {
            return Err(WalletkeepError::IncompleteWalletData {
                reason: "public key is missing".into(),
            });
        }
        Ok(())
    }

    fn require(&self, allowed: &[SessionState], operation: &str) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(self.illegal(operation))
        }
    }

    fn illegal(&self, operation: &str) -> WalletkeepError {
        WalletkeepError::InvalidTransition {
            reason: format!("cannot {operation} in state {}", self.state),
        }
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(from = %self.state, to = %next, "wallet session transition");
        self.state = next;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use walletkeep_crypto::backend::crypto_ready;
    use walletkeep_crypto::cipher::decrypt_string;

    const DEV_PHRASE: &str =
        "bottom drive obey lake curtain smoke basket hold race lonely fit walk";

    fn light() -> Argon2Params {
        Argon2Params {
            m_cost: 256,
            t_cost: 1,
            p_cost: 1,
        }
    }

    async fn key_bound(name: &str) -> std::result::Result<WalletSession, WalletkeepError> {
        let backend = crypto_ready().await?;
        let mut session = WalletSession::new();
        session.set_details(name, "")?;
        session.bind_mnemonic(backend, DEV_PHRASE, 42)?;
        Ok(session)
    }

    #[test]
    fn starts_in_draft() {
        let session = WalletSession::new();
        assert_eq!(session.state(), SessionState::Draft);
        assert!(!session.holds_plaintext());
    }

    #[test]
    fn details_move_to_drafted() -> std::result::Result<(), WalletkeepError> {
        let mut session = WalletSession::new();
        session.set_details("My Wallet", "sr25519")?;
        assert_eq!(session.state(), SessionState::Drafted);
        assert_eq!(session.name(), "My Wallet");
        Ok(())
    }

    #[tokio::test]
    async fn bind_moves_to_key_bound() -> std::result::Result<(), WalletkeepError> {
        let session = key_bound("My Wallet").await?;
        assert_eq!(session.state(), SessionState::KeyBound);
        assert_eq!(
            session.public_key(),
            Some("5DfhGyQdFobKM8NsWvEeAKk5EQQgYe9AydgJ7rMB6E1EqRzV")
        );
        assert!(session.holds_plaintext());
        Ok(())
    }

    #[tokio::test]
    async fn invalid_mnemonic_leaves_state() -> std::result::Result<(), WalletkeepError> {
        let backend = crypto_ready().await?;
        let mut session = WalletSession::new();
        session.set_details("My Wallet", "")?;
        let result = session.bind_mnemonic(backend, "not a real phrase", 42);
        assert!(matches!(result, Err(WalletkeepError::InvalidMnemonic { .. })));
        assert_eq!(session.state(), SessionState::Drafted);
        assert!(session.public_key().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn empty_name_blocks_save() -> std::result::Result<(), WalletkeepError> {
        let mut session = key_bound("   ").await?;
        let result = session.request_save();
        assert!(matches!(result, Err(WalletkeepError::IncompleteWalletData { .. })));
        assert_eq!(session.state(), SessionState::KeyBound);
        Ok(())
    }

    #[test]
    fn save_without_keys_is_incomplete() -> std::result::Result<(), WalletkeepError> {
        let mut session = WalletSession::new();
        session.set_details("My Wallet", "")?;
        let result = session.request_save();
        assert!(matches!(result, Err(WalletkeepError::IncompleteWalletData { .. })));
        assert_eq!(session.state(), SessionState::Drafted);
        Ok(())
    }

    #[tokio::test]
    async fn seal_wipes_plaintext() -> std::result::Result<(), WalletkeepError> {
        let mut session = key_bound("My Wallet").await?;
        session.request_save()?;
        session.begin_encrypting()?;

        let password = Password::new("Secret123");
        let record = session.seal(&password, &light(), "sr25519")?;

        assert!(!session.holds_plaintext());
        assert_eq!(session.state(), SessionState::Encrypting);
        assert_eq!(record.address_type, "sr25519");
        assert_ne!(record.mnemonic_phrase.as_str(), DEV_PHRASE);
        assert_eq!(decrypt_string(&password, &record.mnemonic_phrase)?.as_str(), DEV_PHRASE);

        session.mark_persisted(WalletRecord { id: 1, ..record })?;
        assert_eq!(session.state(), SessionState::Persisted);
        assert_eq!(session.sealed_record().map(|r| r.id), Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn cipher_failure_returns_to_awaiting_password() -> std::result::Result<(), WalletkeepError> {
        let mut session = key_bound("My Wallet").await?;
        session.request_save()?;
        session.begin_encrypting()?;

        let bad = Argon2Params { t_cost: 0, ..light() };
        assert!(session.seal(&Password::new("pw"), &bad, "sr25519").is_err());
        assert_eq!(session.state(), SessionState::AwaitingPassword);
        assert!(session.holds_plaintext());
        Ok(())
    }

    #[tokio::test]
    async fn illegal_transitions_rejected() -> std::result::Result<(), WalletkeepError> {
        let mut session = WalletSession::new();
        assert!(matches!(
            session.begin_encrypting(),
            Err(WalletkeepError::InvalidTransition { .. })
        ));
        assert!(matches!(
            session.password_rejected(),
            Err(WalletkeepError::InvalidTransition { .. })
        ));

        let mut session = key_bound("My Wallet").await?;
        session.request_save()?;
        assert!(matches!(
            session.request_save(),
            Err(WalletkeepError::InvalidTransition { .. })
        ));
        assert!(matches!(
            session.set_details("Other", ""),
            Err(WalletkeepError::InvalidTransition { .. })
        ));
        assert!(session.pending_record().is_err());
        assert_eq!(session.state(), SessionState::AwaitingPassword);
        Ok(())
    }
}
