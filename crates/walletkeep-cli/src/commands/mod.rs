//! Subcommand handlers.

pub mod keys;
pub mod wallet;

use std::sync::Arc;

use walletkeep_crypto::kdf::Argon2Params;
use walletkeep_wallet::WalletController;

use crate::login::{PromptSecrets, VerifierLogin};
use crate::store::JsonWalletStore;
use crate::GlobalOpts;

/// Builds the controller with the file-backed collaborators.
pub async fn build_controller(opts: &GlobalOpts) -> std::result::Result<WalletController, String> {
    let data_dir = &opts.config.data_dir;
    let params = Argon2Params::from_config(&opts.config.wallet);

    WalletController::new(
        Arc::new(JsonWalletStore::new(data_dir)),
        Arc::new(VerifierLogin::new(data_dir, params)),
        Arc::new(PromptSecrets::new(data_dir, params)),
        opts.config.wallet.clone(),
    )
    .await
    .map_err(|e| e.to_string())
}
