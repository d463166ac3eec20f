//! Config file support.
//!
//! The CLI reads an optional JSON config file and applies CLI flags on
//! top of it (CLI overrides config file).
//!
//! Example `walletkeep.json`:
//! ```json
//! {
//!   "data_dir": "/home/alice/.walletkeep",
//!   "argon2_m_cost": 65536,
//!   "argon2_t_cost": 3,
//!   "argon2_p_cost": 1,
//!   "ss58_prefix": 0,
//!   "address_type": "polkadot",
//!   "mnemonic_words": 24
//! }
//! ```
//!
//! Every field is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walletkeep_types::config::WalletConfig;

// ---------------------------------------------------------------------------
// Config file (JSON)
// ---------------------------------------------------------------------------

/// JSON config file format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub data_dir: Option<String>,
    #[serde(flatten)]
    pub wallet: WalletConfig,
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

/// Values given on the command line, each overriding the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub ss58_prefix: Option<u16>,
}

// ---------------------------------------------------------------------------
// Resolved config
// ---------------------------------------------------------------------------

/// Fully resolved CLI configuration with all defaults applied.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub data_dir: PathBuf,
    pub wallet: WalletConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            wallet: WalletConfig::default(),
        }
    }
}

impl CliConfig {
    /// Loads config from a JSON file.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config file: {e}"))?;
        Self::parse(&text)
    }

    /// Parses config JSON.
    pub fn parse(text: &str) -> Result<Self, String> {
        let file: ConfigFile =
            serde_json::from_str(text).map_err(|e| format!("invalid config JSON: {e}"))?;

        Ok(Self {
            data_dir: file
                .data_dir
                .map(PathBuf::from)
                .unwrap_or_else(default_data_dir),
            wallet: file.wallet,
        })
    }

    /// Merges CLI overrides onto a config-file base and validates the
    /// result.
    pub fn merge(mut self, overrides: &Overrides) -> Result<Self, String> {
        if let Some(ref dir) = overrides.data_dir {
            self.data_dir = dir.clone();
        }
        if let Some(prefix) = overrides.ss58_prefix {
            self.wallet.ss58_prefix = prefix;
        }

        self.wallet.validate().map_err(|e| e.to_string())?;
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Platform-specific default data directory.
fn default_data_dir() -> PathBuf {
    if cfg!(target_os = "linux") {
        if let Some(home) = dirs::home_dir() {
            return home.join(".walletkeep");
        }
    }
    if let Some(data) = dirs::data_dir() {
        return data.join("Walletkeep");
    }
    PathBuf::from("walletkeep-data")
}
