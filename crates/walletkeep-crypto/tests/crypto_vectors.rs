//! Known-vector tests for the key derivation and sealing pipeline.
//!
//! Vectors:
//! - Substrate development phrase → sr25519 root public key and SS58
//!   address (`subkey inspect` output)
//! - SS58 generic (42) and Polkadot (0) encodings of the `//Alice` key
//! - Phrase → seal → open pipeline across the crate boundary

use walletkeep_crypto::address::{decode_address, encode_address};
use walletkeep_crypto::backend::crypto_ready;
use walletkeep_crypto::cipher::{decrypt_string, encrypt_str};
use walletkeep_crypto::kdf::Argon2Params;
use walletkeep_crypto::mnemonic::{generate_mnemonic, mnemonic_to_seed, validate_mnemonic};
use walletkeep_crypto::secret::Password;
use walletkeep_types::WalletkeepError;

const DEV_PHRASE: &str = "bottom drive obey lake curtain smoke basket hold race lonely fit walk";

const DEV_PUBLIC_KEY: &str = "46ebddef8cd9bb167dc30878d7113b7e168e6f0646beffd77d69d39bad76b47a";

const DEV_ADDRESS: &str = "5DfhGyQdFobKM8NsWvEeAKk5EQQgYe9AydgJ7rMB6E1EqRzV";

fn light_params() -> Argon2Params {
    Argon2Params {
        m_cost: 256,
        t_cost: 1,
        p_cost: 1,
    }
}

// ===================================================================
// Key derivation
// ===================================================================

#[tokio::test]
async fn dev_phrase_root_public_key() -> std::result::Result<(), WalletkeepError> {
    let backend = crypto_ready().await?;
    let keypair = backend.keypair_from_mnemonic(DEV_PHRASE)?;
    assert_eq!(hex::encode(keypair.public_key().as_bytes()), DEV_PUBLIC_KEY);
    Ok(())
}

#[tokio::test]
async fn dev_phrase_root_address() -> std::result::Result<(), WalletkeepError> {
    let backend = crypto_ready().await?;
    let keypair = backend.keypair_from_mnemonic(DEV_PHRASE)?;
    let address = encode_address(keypair.public_key().as_bytes(), 42)?;
    assert_eq!(address.as_str(), DEV_ADDRESS);
    Ok(())
}

#[tokio::test]
async fn derivation_is_stable_across_seed_roundtrips() -> std::result::Result<(), WalletkeepError> {
    let backend = crypto_ready().await?;
    let seed_a = mnemonic_to_seed(DEV_PHRASE, "")?;
    let seed_b = mnemonic_to_seed(DEV_PHRASE, "")?;
    assert_eq!(seed_a.as_bytes(), seed_b.as_bytes());

    let kp_a = backend.derive_keypair(&seed_a)?;
    let kp_b = backend.derive_keypair(&seed_b)?;
    assert_eq!(kp_a.public_key(), kp_b.public_key());
    assert_eq!(kp_a.secret_key_bytes(), kp_b.secret_key_bytes());
    Ok(())
}

#[test]
fn passphrase_changes_seed() -> std::result::Result<(), WalletkeepError> {
    let plain = mnemonic_to_seed(DEV_PHRASE, "")?;
    let salted = mnemonic_to_seed(DEV_PHRASE, "extra")?;
    assert_ne!(plain.as_bytes(), salted.as_bytes());
    Ok(())
}

// ===================================================================
// SS58
// ===================================================================

#[test]
fn alice_vectors() -> std::result::Result<(), WalletkeepError> {
    let mut alice = [0u8; 32];
    hex::decode_to_slice(
        "d43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d",
        &mut alice,
    )
    .map_err(|e| WalletkeepError::InvalidAddress { reason: e.to_string() })?;

    assert_eq!(
        encode_address(&alice, 42)?.as_str(),
        "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY"
    );
    assert_eq!(
        encode_address(&alice, 0)?.as_str(),
        "15oF4uVJwmo4TdGW7VfQxNLavjCXviqxT9S1MgbjMNHr6Sp5"
    );
    Ok(())
}

#[test]
fn dev_address_decodes_to_public_key() -> std::result::Result<(), WalletkeepError> {
    let (prefix, key) = decode_address(DEV_ADDRESS)?;
    assert_eq!(prefix, 42);
    assert_eq!(hex::encode(key), DEV_PUBLIC_KEY);
    Ok(())
}

// ===================================================================
// Pipeline
// ===================================================================

#[tokio::test]
async fn generated_phrase_seals_and_reopens() -> std::result::Result<(), WalletkeepError> {
    let backend = crypto_ready().await?;
    let mnemonic = generate_mnemonic(12)?;
    assert!(validate_mnemonic(mnemonic.as_str()));

    let keypair = backend.keypair_from_mnemonic(mnemonic.as_str())?;
    let secret_hex = keypair.secret_key_hex()?;

    let password = Password::new("Secret123");
    let sealed_phrase = encrypt_str(&password, mnemonic.as_str(), &light_params())?;
    let sealed_secret = encrypt_str(&password, &secret_hex, &light_params())?;
    assert_ne!(sealed_phrase.as_str(), mnemonic.as_str());
    assert_ne!(sealed_secret.as_str(), secret_hex.as_str());

    let phrase = decrypt_string(&password, &sealed_phrase)?;
    let reopened = backend.keypair_from_mnemonic(&phrase)?;
    assert_eq!(reopened.public_key(), keypair.public_key());
    assert_eq!(decrypt_string(&password, &sealed_secret)?.as_str(), secret_hex.as_str());
    Ok(())
}

#[test]
fn invalid_strings_do_not_validate() {
    for phrase in [
        "",
        "not a real phrase",
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon",
        "bottom drive obey lake curtain smoke basket hold race lonely fit",
        "bottom drive obey lake curtain smoke basket hold race lonely fit walks",
    ] {
        assert!(!validate_mnemonic(phrase), "{phrase:?} should not validate");
    }
}
