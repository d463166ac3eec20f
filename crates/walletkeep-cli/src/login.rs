//! Local login and password retrieval.
//!
//! [`VerifierLogin`] checks a password by opening a sealed check value
//! stored at `<data_dir>/login.json`. The first successful `login`
//! with no verifier on disk enrolls the given password.
//!
//! [`PromptSecrets`] hands out the wallet password only after the same
//! verifier accepts it, and never enrolls. Without a verifier the
//! wallet password is unavailable.
//!
//! Passwords come from the `WALLETKEEP_PASSWORD` environment variable
//! when set (non-interactive use), otherwise from one line of stdin.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use walletkeep_crypto::cipher::{decrypt, encrypt, EncryptedBlob};
use walletkeep_crypto::kdf::Argon2Params;
use walletkeep_crypto::secret::Password;
use walletkeep_wallet::collaborators::{LoginProvider, SecretProvider};
use zeroize::Zeroizing;

/// Environment variable holding the wallet password.
pub const PASSWORD_ENV: &str = "WALLETKEEP_PASSWORD";

/// File name of the login verifier inside the data directory.
pub const LOGIN_FILE: &str = "login.json";

/// Plaintext sealed into the verifier.
const CHECK_VALUE: &[u8] = b"walletkeep-login-v1";

#[derive(Serialize, Deserialize)]
struct LoginFileData {
    verifier: EncryptedBlob,
}

// ---------------------------------------------------------------------------
// VerifierLogin
// ---------------------------------------------------------------------------

/// [`LoginProvider`] backed by a sealed verifier file.
pub struct VerifierLogin {
    path: PathBuf,
    params: Argon2Params,
}

impl VerifierLogin {
    /// Verifier at `<data_dir>/login.json`, enrolled with `params`.
    pub fn new(data_dir: &Path, params: Argon2Params) -> Self {
        Self {
            path: data_dir.join(LOGIN_FILE),
            params,
        }
    }

    /// Checks `password` against the verifier on disk. A missing or
    /// unreadable verifier rejects.
    pub async fn verify(&self, password: &Password) -> bool {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => self.check(password, &json),
            Err(e) => {
                tracing::debug!(error = %e, "no login verifier to check against");
                false
            }
        }
    }

    fn check(&self, password: &Password, json: &str) -> bool {
        let data: LoginFileData = match serde_json::from_str(json) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "unreadable login file");
                return false;
            }
        };

        match decrypt(password, &data.verifier) {
            Ok(plaintext) => plaintext.as_slice().ct_eq(CHECK_VALUE).into(),
            Err(e) => {
                tracing::debug!(error = %e, "login rejected");
                false
            }
        }
    }

    async fn enroll(&self, password: &Password) -> bool {
        let verifier = match encrypt(password, CHECK_VALUE, &self.params) {
            Ok(verifier) => verifier,
            Err(e) => {
                tracing::warn!(error = %e, "failed to seal login verifier");
                return false;
            }
        };

        let json = match serde_json::to_string_pretty(&LoginFileData { verifier }) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize login verifier");
                return false;
            }
        };

        if let Some(parent) = self.path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                tracing::warn!(error = %e, "failed to create data directory");
                return false;
            }
        }

        match tokio::fs::write(&self.path, json.as_bytes()).await {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "login password enrolled");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to write login file");
                false
            }
        }
    }
}

#[async_trait]
impl LoginProvider for VerifierLogin {
    async fn login(&self, password: &Password) -> bool {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => self.check(password, &json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => self.enroll(password).await,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read login file");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PromptSecrets
// ---------------------------------------------------------------------------

/// [`SecretProvider`] reading the password from the environment or
/// stdin and returning it only if the login verifier opens with it.
pub struct PromptSecrets {
    verifier: VerifierLogin,
}

impl PromptSecrets {
    /// Checks answers against the verifier in `data_dir`.
    pub fn new(data_dir: &Path, params: Argon2Params) -> Self {
        Self {
            verifier: VerifierLogin::new(data_dir, params),
        }
    }

    async fn confirm(&self, password: Password) -> Option<Password> {
        if self.verifier.verify(&password).await {
            Some(password)
        } else {
            tracing::warn!("wallet password does not match the login password");
            None
        }
    }
}

#[async_trait]
impl SecretProvider for PromptSecrets {
    async fn get_wallet_password(&self) -> Option<Password> {
        let password = read_password("Wallet password: ")?;
        self.confirm(password).await
    }
}

/// Reads a password from `WALLETKEEP_PASSWORD` or one stdin line.
///
/// Returns `None` if neither yields a non-empty password.
pub fn read_password(prompt: &str) -> Option<Password> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return non_empty(Password::new(password));
    }

    eprint!("{prompt}");
    let mut line = Zeroizing::new(String::new());
    std::io::stdin().lock().read_line(&mut line).ok()?;
    non_empty(Password::new(line.trim_end_matches(['\r', '\n'])))
}

fn non_empty(password: Password) -> Option<Password> {
    if password.is_empty() {
        None
    } else {
        Some(password)
    }
}
