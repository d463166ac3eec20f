//! SS58 address encoding.
//!
//! ```text
//! address = base58( prefix_bytes || public_key || checksum )
//! checksum = BLAKE2b-512( "SS58PRE" || prefix_bytes || public_key )[0..2]
//! ```
//!
//! Prefixes 0..=63 encode as one byte; 64..=16383 as two bytes. The
//! encoding is reversible only as far as the public key: the secret
//! key cannot be recovered from an address.

use std::fmt;
use std::str::FromStr;

use blake2::{Blake2b512, Digest};
use walletkeep_types::config::MAX_SS58_PREFIX;
use walletkeep_types::{Result, WalletkeepError};

/// Domain separator hashed in front of every SS58 checksum.
const SS58_CHECKSUM_DOMAIN: &[u8] = b"SS58PRE";

/// Checksum bytes appended for 32-byte public keys.
const CHECKSUM_LEN: usize = 2;

/// Public key length carried by an address.
const PUBLIC_KEY_LEN: usize = 32;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A checksummed SS58 address string.
///
/// Always holds a string produced by [`encode_address`] or verified by
/// [`decode_address`].
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Address(String);

impl Address {
    /// Returns the address text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the address, returning its text.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Recovers the network prefix and public key.
    pub fn decode(&self) -> Result<(u16, [u8; 32])> {
        decode_address(&self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = WalletkeepError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        decode_address(s)?;
        Ok(Self(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Encode / decode
// ---------------------------------------------------------------------------

/// Encodes a 32-byte public key as an SS58 address for `prefix`.
///
/// # Errors
///
/// [`WalletkeepError::InvalidAddress`] if `prefix` exceeds 16383 or is
/// one of the reserved values 46 and 47.
pub fn encode_address(public_key: &[u8; 32], prefix: u16) -> Result<Address> {
    let mut data = prefix_bytes(prefix)?;
    data.extend_from_slice(public_key);

    let checksum = ss58_hash(&data);
    data.extend_from_slice(&checksum[..CHECKSUM_LEN]);

    Ok(Address(bs58::encode(data).into_string()))
}

/// Decodes an SS58 address into its network prefix and public key.
///
/// # Errors
///
/// [`WalletkeepError::InvalidAddress`] for invalid base58, a prefix
/// outside the supported encodings, a wrong length, or a checksum
/// mismatch.
pub fn decode_address(address: &str) -> Result<(u16, [u8; 32])> {
    let data = bs58::decode(address)
        .into_vec()
        .map_err(|e| WalletkeepError::InvalidAddress {
            reason: format!("invalid base58: {e}"),
        })?;

    let first = *data.first().ok_or_else(|| WalletkeepError::InvalidAddress {
        reason: "empty address".into(),
    })?;

    let (prefix_len, prefix) = match first {
        0..=63 => (1, u16::from(first)),
        64..=127 => {
            let second = *data.get(1).ok_or_else(|| WalletkeepError::InvalidAddress {
                reason: "truncated two-byte prefix".into(),
            })?;
            let lower = (first << 2) | (second >> 6);
            let upper = second & 0b0011_1111;
            (2, u16::from(lower) | (u16::from(upper) << 8))
        }
        _ => {
            return Err(WalletkeepError::InvalidAddress {
                reason: format!("unsupported prefix byte {first:#04x}"),
            })
        }
    };

    let expected_len = prefix_len + PUBLIC_KEY_LEN + CHECKSUM_LEN;
    if data.len() != expected_len {
        return Err(WalletkeepError::InvalidAddress {
            reason: format!("expected {expected_len} bytes, got {}", data.len()),
        });
    }

    let body_len = prefix_len + PUBLIC_KEY_LEN;
    let checksum = ss58_hash(&data[..body_len]);
    if data[body_len..] != checksum[..CHECKSUM_LEN] {
        return Err(WalletkeepError::InvalidAddress {
            reason: "checksum mismatch".into(),
        });
    }

    let mut public_key = [0u8; 32];
    public_key.copy_from_slice(&data[prefix_len..body_len]);
    Ok((prefix, public_key))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn prefix_bytes(prefix: u16) -> Result<Vec<u8>> {
    if prefix > MAX_SS58_PREFIX || matches!(prefix, 46 | 47) {
        return Err(WalletkeepError::InvalidAddress {
            reason: format!("unsupported SS58 prefix {prefix}"),
        });
    }

    let mut out = Vec::with_capacity(2 + PUBLIC_KEY_LEN + CHECKSUM_LEN);
    if prefix < 64 {
        out.push(prefix as u8);
    } else {
        let first = ((prefix & 0b0000_0000_1111_1100) >> 2) as u8;
        let second = ((prefix >> 8) as u8) | (((prefix & 0b0000_0000_0000_0011) as u8) << 6);
        out.push(first | 0b0100_0000);
        out.push(second);
    }
    Ok(out)
}

fn ss58_hash(data: &[u8]) -> [u8; 64] {
    let mut hasher = Blake2b512::new();
    hasher.update(SS58_CHECKSUM_DOMAIN);
    hasher.update(data);
    let result = hasher.finalize();
    let mut out = [0u8; 64];
    out.copy_from_slice(&result);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Public key of the well-known `//Alice` development account.
    const ALICE: &str = "d43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d";

    fn alice() -> [u8; 32] {
        let mut out = [0u8; 32];
        hex::decode_to_slice(ALICE, &mut out).ok();
        out
    }

    #[test]
    fn alice_generic_substrate() -> std::result::Result<(), WalletkeepError> {
        let address = encode_address(&alice(), 42)?;
        assert_eq!(address.as_str(), "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY");
        Ok(())
    }

    #[test]
    fn alice_polkadot() -> std::result::Result<(), WalletkeepError> {
        let address = encode_address(&alice(), 0)?;
        assert_eq!(address.as_str(), "15oF4uVJwmo4TdGW7VfQxNLavjCXviqxT9S1MgbjMNHr6Sp5");
        Ok(())
    }

    #[test]
    fn decode_recovers_public_key() -> std::result::Result<(), WalletkeepError> {
        let (prefix, key) = decode_address("5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY")?;
        assert_eq!(prefix, 42);
        assert_eq!(key, alice());
        Ok(())
    }

    #[test]
    fn two_byte_prefix_roundtrip() -> std::result::Result<(), WalletkeepError> {
        for prefix in [64u16, 255, 1284, MAX_SS58_PREFIX] {
            let address = encode_address(&alice(), prefix)?;
            let (decoded_prefix, key) = address.decode()?;
            assert_eq!(decoded_prefix, prefix);
            assert_eq!(key, alice());
        }
        Ok(())
    }

    #[test]
    fn reserved_prefixes_rejected() {
        assert!(encode_address(&alice(), 46).is_err());
        assert!(encode_address(&alice(), 47).is_err());
        assert!(encode_address(&alice(), MAX_SS58_PREFIX + 1).is_err());
    }

    #[test]
    fn corrupted_checksum_rejected() -> std::result::Result<(), WalletkeepError> {
        let address = encode_address(&alice(), 42)?;
        let mut bytes = bs58::decode(address.as_str())
            .into_vec()
            .map_err(|e| WalletkeepError::InvalidAddress { reason: e.to_string() })?;
        if let Some(last) = bytes.last_mut() {
            *last ^= 0x01;
        }
        let tampered = bs58::encode(bytes).into_string();
        assert!(decode_address(&tampered).is_err());
        Ok(())
    }

    #[test]
    fn garbage_rejected() {
        assert!(decode_address("").is_err());
        assert!(decode_address("0OIl").is_err());
        assert!("not-an-address".parse::<Address>().is_err());
    }

    #[test]
    fn different_prefix_different_address() -> std::result::Result<(), WalletkeepError> {
        let generic = encode_address(&alice(), 42)?;
        let polkadot = encode_address(&alice(), 0)?;
        assert_ne!(generic, polkadot);
        Ok(())
    }
}
