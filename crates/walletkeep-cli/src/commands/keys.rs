//! Stateless key commands: `generate` and `inspect`.

use walletkeep_crypto::address::{decode_address, encode_address};
use walletkeep_crypto::backend::crypto_ready;
use walletkeep_crypto::mnemonic::generate_mnemonic;

use crate::output;
use crate::GlobalOpts;

/// Generates a mnemonic and prints it with its address. Nothing is
/// stored.
pub async fn generate(words: Option<usize>, opts: &GlobalOpts) -> std::result::Result<(), String> {
    let words = words.unwrap_or(opts.config.wallet.mnemonic_words);
    let mnemonic = generate_mnemonic(words).map_err(|e| e.to_string())?;

    let backend = crypto_ready().await.map_err(|e| e.to_string())?;
    let keypair = backend
        .keypair_from_mnemonic(mnemonic.as_str())
        .map_err(|e| e.to_string())?;
    let address = encode_address(keypair.public_key().as_bytes(), opts.config.wallet.ss58_prefix)
        .map_err(|e| e.to_string())?;

    output::print_warning("anyone holding this phrase controls the wallet", opts.json);
    output::print_fields(
        &[
            ("mnemonic", mnemonic.as_str().to_owned()),
            ("address", address.into_string()),
        ],
        opts.json,
    );
    Ok(())
}

/// Decodes an SS58 address.
pub fn inspect(address: &str, opts: &GlobalOpts) -> std::result::Result<(), String> {
    let (prefix, public_key) = decode_address(address).map_err(|e| e.to_string())?;
    let generic = encode_address(&public_key, 42).map_err(|e| e.to_string())?;

    output::print_fields(
        &[
            ("address", address.to_owned()),
            ("ss58_prefix", prefix.to_string()),
            ("public_key", format!("0x{}", hex::encode(public_key))),
            ("generic_address", generic.into_string()),
        ],
        opts.json,
    );
    Ok(())
}
