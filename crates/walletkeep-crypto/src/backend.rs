//! One-time readiness barrier for the sr25519 backend.
//!
//! [`crypto_ready`] runs the backend self-test exactly once per
//! process. Every concurrent caller that arrives before it finishes
//! awaits the same initialization and receives the same
//! `&'static CryptoBackend`; later callers return immediately.
//!
//! [`CryptoBackend`] cannot be constructed outside this module, so
//! holding a reference to one is proof that the barrier has resolved.
//! All key derivation entry points take `&CryptoBackend`.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::OnceCell;
use walletkeep_types::{Result, WalletkeepError};

use crate::keys::{verify, KeyPair};
use crate::mnemonic::{mnemonic_to_seed, Seed};

static BACKEND: OnceCell<CryptoBackend> = OnceCell::const_new();

/// Number of times the self-test has run. Stays at 1 after success.
static INIT_RUNS: AtomicUsize = AtomicUsize::new(0);

/// Fixed mini secret used by the self-test.
const SELF_TEST_SEED: [u8; 32] = [0x5A; 32];

/// Message signed by the self-test.
const SELF_TEST_MESSAGE: &[u8] = b"walletkeep-backend-self-test";

// ---------------------------------------------------------------------------
// CryptoBackend
// ---------------------------------------------------------------------------

/// Handle to the initialized key derivation backend.
#[derive(Debug)]
pub struct CryptoBackend {
    _ready: (),
}

impl CryptoBackend {
    /// Expands `seed` into an sr25519 key pair.
    ///
    /// Deterministic: the same seed yields the same key pair on every
    /// call and every platform.
    pub fn derive_keypair(&self, seed: &Seed) -> Result<KeyPair> {
        KeyPair::from_seed(seed)
    }

    /// Validates `phrase`, derives its seed (empty passphrase) and
    /// expands the key pair.
    ///
    /// # Errors
    ///
    /// [`WalletkeepError::InvalidMnemonic`] if the phrase is invalid.
    pub fn keypair_from_mnemonic(&self, phrase: &str) -> Result<KeyPair> {
        let seed = mnemonic_to_seed(phrase, "")?;
        self.derive_keypair(&seed)
    }
}

// ---------------------------------------------------------------------------
// Barrier
// ---------------------------------------------------------------------------

/// Awaits backend readiness, initializing it on first use.
///
/// # Errors
///
/// [`WalletkeepError::CryptoError`] if the self-test fails. A failed
/// initialization is not cached; the next caller retries it.
pub async fn crypto_ready() -> Result<&'static CryptoBackend> {
    BACKEND
        .get_or_try_init(|| async {
            INIT_RUNS.fetch_add(1, Ordering::SeqCst);
            tracing::debug!("running sr25519 backend self-test");
            self_test()?;
            tracing::info!("crypto backend ready");
            Ok(CryptoBackend { _ready: () })
        })
        .await
}

/// Derivation must be deterministic and signatures must verify.
fn self_test() -> Result<()> {
    let seed = Seed::from_bytes(SELF_TEST_SEED);
    let first = KeyPair::from_seed(&seed)?;
    let second = KeyPair::from_seed(&seed)?;

    if first.public_key() != second.public_key()
        || first.secret_key_bytes() != second.secret_key_bytes()
    {
        return Err(WalletkeepError::CryptoError {
            reason: "backend self-test: key expansion is not deterministic".into(),
        });
    }

    let signature = first.sign(SELF_TEST_MESSAGE)?;
    verify(&second.public_key(), SELF_TEST_MESSAGE, &signature)?;

    if verify(&second.public_key(), b"tampered", &signature).is_ok() {
        return Err(WalletkeepError::CryptoError {
            reason: "backend self-test: forged signature accepted".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
