//! BIP39 mnemonic generation, validation, and seed derivation.
//!
//! Phrases use the BIP39 English wordlist and checksum scheme:
//!
//! 1. **Generation**: 128–256 bits of OS entropy → SHA-256 checksum →
//!    11-bit word indices (12, 15, 18, 21 or 24 words).
//! 2. **Validation**: every word in the wordlist, supported length,
//!    checksum recomputed from the reconstructed entropy.
//! 3. **Seed derivation**: PBKDF2-HMAC-SHA512 over the *entropy*
//!    (not the phrase text), 2048 rounds, salt = `"mnemonic"` +
//!    passphrase, truncated to a 32-byte mini secret. This is the
//!    Substrate convention, so a phrase yields the same sr25519 key
//!    pair here as in Substrate tooling.

use bip39::Language;
use hmac::Hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha512;
use walletkeep_types::config::MNEMONIC_WORD_COUNTS;
use walletkeep_types::{Result, WalletkeepError};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// PBKDF2 rounds fixed by BIP39.
const PBKDF2_ROUNDS: u32 = 2048;

// ---------------------------------------------------------------------------
// Mnemonic
// ---------------------------------------------------------------------------

/// A validated BIP39 mnemonic phrase.
///
/// Words are stored lowercase, separated by single spaces. The inner
/// string is zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Mnemonic(String);

// Mnemonic does not implement Clone/Debug to prevent leakage.

impl Mnemonic {
    /// Returns the phrase as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the number of words in the phrase.
    pub fn word_count(&self) -> usize {
        self.0.split(' ').count()
    }
}

// ---------------------------------------------------------------------------
// Seed
// ---------------------------------------------------------------------------

/// 32-byte mini secret derived from a mnemonic.
///
/// Input to [`crate::backend::CryptoBackend::derive_keypair`].
/// Automatically zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; 32]);

// Seed does not implement Clone/Debug to prevent leakage.

impl Seed {
    /// Fixed byte length of a mini secret.
    pub const LEN: usize = 32;

    /// Creates a [`Seed`] from raw bytes.
    ///
    /// Use this for test vectors. For normal operation, use
    /// [`mnemonic_to_seed`].
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw 32-byte seed.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generates a new random mnemonic of `word_count` words.
///
/// # Errors
///
/// - [`WalletkeepError::ConfigError`] if `word_count` is not one of
///   12, 15, 18, 21 or 24.
pub fn generate_mnemonic(word_count: usize) -> Result<Mnemonic> {
    if !MNEMONIC_WORD_COUNTS.contains(&word_count) {
        return Err(WalletkeepError::ConfigError {
            reason: format!("unsupported mnemonic length {word_count}"),
        });
    }

    // 11 bits per word, 1 checksum bit per 32 entropy bits.
    let entropy_len = word_count * 11 * 32 / 33 / 8;
    let mut entropy = Zeroizing::new(vec![0u8; entropy_len]);
    OsRng.fill_bytes(&mut entropy);

    entropy_to_mnemonic(&entropy)
}

/// Converts raw entropy (16, 20, 24, 28 or 32 bytes) into a mnemonic.
///
/// This is the deterministic core of generation, exposed for known
/// test vectors.
pub fn entropy_to_mnemonic(entropy: &[u8]) -> Result<Mnemonic> {
    let inner = bip39::Mnemonic::from_entropy_in(Language::English, entropy).map_err(|e| {
        WalletkeepError::CryptoError {
            reason: format!("BIP39 encoding failed: {e}"),
        }
    })?;

    Ok(Mnemonic(inner.to_string()))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Returns `true` if `phrase` is a well-formed BIP39 English mnemonic.
///
/// Checks word count, wordlist membership and checksum. Never fails:
/// malformed input simply yields `false`.
pub fn validate_mnemonic(phrase: &str) -> bool {
    parse_mnemonic(phrase).is_ok()
}

/// Parses and validates a phrase into a [`Mnemonic`].
///
/// Surrounding and repeated whitespace is collapsed. Words are matched
/// case-sensitively against the lowercase wordlist.
///
/// # Errors
///
/// [`WalletkeepError::InvalidMnemonic`] describing the failed check.
/// The offending words are not echoed back.
pub fn parse_mnemonic(phrase: &str) -> Result<Mnemonic> {
    let normalized = Zeroizing::new(phrase.split_whitespace().collect::<Vec<_>>().join(" "));
    let word_count = normalized.split(' ').filter(|w| !w.is_empty()).count();

    if !MNEMONIC_WORD_COUNTS.contains(&word_count) {
        return Err(WalletkeepError::InvalidMnemonic {
            reason: format!("expected 12, 15, 18, 21 or 24 words, got {word_count}"),
        });
    }

    bip39::Mnemonic::parse_in_normalized(Language::English, &normalized).map_err(|e| {
        let reason = match e {
            bip39::Error::UnknownWord(idx) => format!("word #{} is not in the wordlist", idx + 1),
            bip39::Error::InvalidChecksum => "checksum mismatch".to_string(),
            other => other.to_string(),
        };
        WalletkeepError::InvalidMnemonic { reason }
    })?;

    Ok(Mnemonic(String::from(normalized.as_str())))
}

// ---------------------------------------------------------------------------
// Seed derivation
// ---------------------------------------------------------------------------

/// Derives the 32-byte mini secret for `phrase` and optional `passphrase`.
///
/// The phrase is re-validated here even if the caller already did so.
/// Deterministic: the same phrase and passphrase always give the same
/// seed.
///
/// # Errors
///
/// - [`WalletkeepError::InvalidMnemonic`] if the phrase is invalid.
/// - [`WalletkeepError::CryptoError`] if PBKDF2 fails.
pub fn mnemonic_to_seed(phrase: &str, passphrase: &str) -> Result<Seed> {
    let mnemonic = parse_mnemonic(phrase)?;

    let inner = bip39::Mnemonic::parse_in_normalized(Language::English, mnemonic.as_str())
        .map_err(|e| WalletkeepError::InvalidMnemonic {
            reason: e.to_string(),
        })?;
    let entropy = Zeroizing::new(inner.to_entropy());

    let mut salt = Zeroizing::new(Vec::with_capacity(8 + passphrase.len()));
    salt.extend_from_slice(b"mnemonic");
    salt.extend_from_slice(passphrase.as_bytes());

    let mut output = Zeroizing::new([0u8; 64]);
    pbkdf2::pbkdf2::<Hmac<Sha512>>(&entropy, &salt, PBKDF2_ROUNDS, &mut output[..]).map_err(
        |e| WalletkeepError::CryptoError {
            reason: format!("PBKDF2-HMAC-SHA512 failed: {e}"),
        },
    )?;

    let mut seed = [0u8; 32];
    seed.copy_from_slice(&output[..32]);
    Ok(Seed(seed))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_12: &str = "abandon abandon abandon abandon abandon abandon \
                           abandon abandon abandon abandon abandon about";

    #[test]
    fn generate_produces_requested_length() -> std::result::Result<(), WalletkeepError> {
        for count in MNEMONIC_WORD_COUNTS {
            let mnemonic = generate_mnemonic(count)?;
            assert_eq!(mnemonic.word_count(), count);
        }
        Ok(())
    }

    #[test]
    fn generated_mnemonic_validates() -> std::result::Result<(), WalletkeepError> {
        for _ in 0..16 {
            let mnemonic = generate_mnemonic(12)?;
            assert!(validate_mnemonic(mnemonic.as_str()));
        }
        Ok(())
    }

    #[test]
    fn generated_mnemonics_differ() -> std::result::Result<(), WalletkeepError> {
        let a = generate_mnemonic(12)?;
        let b = generate_mnemonic(12)?;
        assert_ne!(a.as_str(), b.as_str());
        Ok(())
    }

    #[test]
    fn unsupported_length_rejected() {
        assert!(generate_mnemonic(13).is_err());
        assert!(generate_mnemonic(0).is_err());
    }

    /// BIP39 test vector: 128 bits of 0x00.
    #[test]
    fn entropy_all_zeros() -> std::result::Result<(), WalletkeepError> {
        let mnemonic = entropy_to_mnemonic(&[0x00; 16])?;
        assert_eq!(mnemonic.as_str(), ZERO_12);
        Ok(())
    }

    /// BIP39 test vector: 128 bits of 0x7F.
    #[test]
    fn entropy_all_7f() -> std::result::Result<(), WalletkeepError> {
        let mnemonic = entropy_to_mnemonic(&[0x7F; 16])?;
        assert_eq!(
            mnemonic.as_str(),
            "legal winner thank year wave sausage worth useful legal winner thank yellow"
        );
        Ok(())
    }

    /// BIP39 test vector: 256 bits of 0xFF.
    #[test]
    fn entropy_all_ff_24_words() -> std::result::Result<(), WalletkeepError> {
        let mnemonic = entropy_to_mnemonic(&[0xFF; 32])?;
        let words: Vec<&str> = mnemonic.as_str().split(' ').collect();
        assert_eq!(words.len(), 24);
        assert!(words[..23].iter().all(|w| *w == "zoo"));
        assert_eq!(words[23], "vote");
        Ok(())
    }

    #[test]
    fn validate_rejects_wrong_word_count() {
        assert!(!validate_mnemonic("abandon abandon abandon"));
        assert!(!validate_mnemonic(""));
    }

    #[test]
    fn validate_rejects_invalid_word() {
        let mut words = vec!["abandon"; 11];
        words.push("notaword");
        assert!(!validate_mnemonic(&words.join(" ")));
    }

    #[test]
    fn validate_rejects_bad_checksum() {
        let phrase = vec!["abandon"; 12].join(" ");
        assert!(!validate_mnemonic(&phrase));
    }

    #[test]
    fn validate_rejects_free_text() {
        assert!(!validate_mnemonic("not a real phrase"));
    }

    #[test]
    fn parse_collapses_whitespace() -> std::result::Result<(), WalletkeepError> {
        let messy = format!("  {}  ", ZERO_12.replace(' ', "   "));
        let mnemonic = parse_mnemonic(&messy)?;
        assert_eq!(mnemonic.as_str(), ZERO_12);
        Ok(())
    }

    #[test]
    fn parse_error_does_not_echo_words() {
        let mut words = vec!["abandon"; 11];
        words.push("hunter2");
        let err = parse_mnemonic(&words.join(" ")).err();
        let msg = err.map(|e| e.to_string()).unwrap_or_default();
        assert!(msg.contains("word #12"));
        assert!(!msg.contains("hunter2"));
    }

    #[test]
    fn seed_is_deterministic() -> std::result::Result<(), WalletkeepError> {
        let s1 = mnemonic_to_seed(ZERO_12, "")?;
        let s2 = mnemonic_to_seed(ZERO_12, "")?;
        assert_eq!(s1.as_bytes(), s2.as_bytes());
        Ok(())
    }

    #[test]
    fn passphrase_changes_seed() -> std::result::Result<(), WalletkeepError> {
        let plain = mnemonic_to_seed(ZERO_12, "")?;
        let salted = mnemonic_to_seed(ZERO_12, "Substrate")?;
        assert_ne!(plain.as_bytes(), salted.as_bytes());
        Ok(())
    }

    #[test]
    fn seed_rejects_invalid_phrase() {
        let result = mnemonic_to_seed("not a real phrase", "");
        assert!(matches!(result, Err(WalletkeepError::InvalidMnemonic { .. })));
    }
}
