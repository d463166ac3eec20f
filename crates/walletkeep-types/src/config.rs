//! Wallet configuration with sensible defaults.
//!
//! Every tunable of the key management core lives here: the Argon2id
//! cost used when sealing secrets, the SS58 network prefix used for
//! addresses, the default address type label and the mnemonic length
//! used for freshly generated phrases.

use serde::{Deserialize, Serialize};

use crate::{Result, WalletkeepError};

/// Largest SS58 prefix representable in the two-byte encoding.
pub const MAX_SS58_PREFIX: u16 = 16_383;

/// Word counts accepted by BIP39.
pub const MNEMONIC_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

/// Upper bound on Argon2id memory cost, in KiB (1 GiB).
///
/// Also applied to parameters read back from encrypted blobs so a
/// crafted blob cannot request unbounded memory.
pub const MAX_ARGON2_M_COST: u32 = 1 << 20;

/// Upper bound on Argon2id passes.
pub const MAX_ARGON2_T_COST: u32 = 64;

/// Upper bound on Argon2id lanes.
pub const MAX_ARGON2_P_COST: u32 = 16;

/// Configuration of the wallet key management core.
///
/// | Field | Default | Meaning |
/// |-------|---------|---------|
/// | `argon2_m_cost` | 65 536 | Argon2id memory in KiB (64 MiB) |
/// | `argon2_t_cost` | 3 | Argon2id passes |
/// | `argon2_p_cost` | 1 | Argon2id lanes |
/// | `ss58_prefix` | 42 | Generic Substrate network |
/// | `address_type` | `"sr25519"` | Label stored on new records |
/// | `mnemonic_words` | 12 | Length of generated phrases |
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Argon2id memory cost in KiB. Must be at least 8 × `argon2_p_cost`.
    pub argon2_m_cost: u32,
    /// Argon2id time cost (number of passes).
    pub argon2_t_cost: u32,
    /// Argon2id parallelism.
    pub argon2_p_cost: u32,
    /// SS58 network prefix used when encoding public keys.
    pub ss58_prefix: u16,
    /// Address type recorded on wallets whose draft leaves it empty.
    pub address_type: String,
    /// Number of words in generated mnemonics.
    pub mnemonic_words: usize,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            argon2_m_cost: 65_536,
            argon2_t_cost: 3,
            argon2_p_cost: 1,
            ss58_prefix: 42,
            address_type: "sr25519".into(),
            mnemonic_words: 12,
        }
    }
}

impl WalletConfig {
    /// Validates all configuration values.
    ///
    /// Returns [`WalletkeepError::ConfigError`] naming the first value
    /// outside its acceptable range.
    pub fn validate(&self) -> Result<()> {
        if self.argon2_t_cost == 0 || self.argon2_t_cost > MAX_ARGON2_T_COST {
            return Err(WalletkeepError::ConfigError {
                reason: format!("argon2_t_cost must be 1..={MAX_ARGON2_T_COST}"),
            });
        }

        if self.argon2_p_cost == 0 || self.argon2_p_cost > MAX_ARGON2_P_COST {
            return Err(WalletkeepError::ConfigError {
                reason: format!("argon2_p_cost must be 1..={MAX_ARGON2_P_COST}"),
            });
        }

        let min_m_cost = 8 * self.argon2_p_cost;
        if self.argon2_m_cost < min_m_cost || self.argon2_m_cost > MAX_ARGON2_M_COST {
            return Err(WalletkeepError::ConfigError {
                reason: format!("argon2_m_cost must be {min_m_cost}..={MAX_ARGON2_M_COST} KiB"),
            });
        }

        if self.ss58_prefix > MAX_SS58_PREFIX || matches!(self.ss58_prefix, 46 | 47) {
            return Err(WalletkeepError::ConfigError {
                reason: format!(
                    "ss58_prefix must be 0..={MAX_SS58_PREFIX} and not reserved (46, 47), got {}",
                    self.ss58_prefix
                ),
            });
        }

        if self.address_type.trim().is_empty() {
            return Err(WalletkeepError::ConfigError {
                reason: "address_type must not be empty".into(),
            });
        }

        if !MNEMONIC_WORD_COUNTS.contains(&self.mnemonic_words) {
            return Err(WalletkeepError::ConfigError {
                reason: format!(
                    "mnemonic_words must be one of {MNEMONIC_WORD_COUNTS:?}, got {}",
                    self.mnemonic_words
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(WalletConfig::default().validate().is_ok());
    }

    #[test]
    fn default_values() {
        let config = WalletConfig::default();
        assert_eq!(config.argon2_m_cost, 65_536);
        assert_eq!(config.argon2_t_cost, 3);
        assert_eq!(config.argon2_p_cost, 1);
        assert_eq!(config.ss58_prefix, 42);
        assert_eq!(config.address_type, "sr25519");
        assert_eq!(config.mnemonic_words, 12);
    }

    #[test]
    fn zero_t_cost_rejected() {
        let config = WalletConfig {
            argon2_t_cost: 0,
            ..WalletConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn m_cost_below_lane_minimum_rejected() {
        let config = WalletConfig {
            argon2_m_cost: 15,
            argon2_p_cost: 2,
            ..WalletConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn m_cost_above_cap_rejected() {
        let config = WalletConfig {
            argon2_m_cost: MAX_ARGON2_M_COST + 1,
            ..WalletConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn reserved_ss58_prefix_rejected() {
        for prefix in [46, 47, MAX_SS58_PREFIX + 1] {
            let config = WalletConfig {
                ss58_prefix: prefix,
                ..WalletConfig::default()
            };
            assert!(config.validate().is_err(), "prefix {prefix} accepted");
        }
    }

    #[test]
    fn polkadot_prefix_is_valid() {
        let config = WalletConfig {
            ss58_prefix: 0,
            ..WalletConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_address_type_rejected() {
        let config = WalletConfig {
            address_type: "   ".into(),
            ..WalletConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unsupported_word_count_rejected() {
        let config = WalletConfig {
            mnemonic_words: 13,
            ..WalletConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let parsed: WalletConfig = serde_json::from_str(r#"{ "ss58_prefix": 0 }"#)?;
        assert_eq!(parsed.ss58_prefix, 0);
        assert_eq!(parsed.argon2_m_cost, 65_536);
        assert_eq!(parsed.mnemonic_words, 12);
        Ok(())
    }
}
