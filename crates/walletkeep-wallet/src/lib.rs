//! Wallet lifecycle for walletkeep.
//!
//! - **Create**: generate or enter a mnemonic, name the wallet, pass
//!   the login gate, seal the mnemonic and secret key, persist.
//! - **Import**: read a JSON file, re-derive keys from its mnemonic,
//!   seal with the stored wallet password, persist.
//! - **Export**: pass the login gate, open both secrets, verify them
//!   against the stored address, serialize.
//!
//! Storage, login and password retrieval are external collaborators
//! (see [`collaborators`]) injected into a single [`WalletController`].

pub mod collaborators;
pub mod controller;
pub mod export;
pub mod import;
pub mod record;
pub mod session;

pub use controller::WalletController;
pub use record::WalletRecord;
pub use session::WalletSession;
