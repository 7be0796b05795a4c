//! Network identity and the guard that gates every chain interaction.
//!
//! # Data Flow
//! ```text
//! ProviderGateway::get_network_id()   (re-queried on every call)
//!     → NetworkGuard::ensure_network(expected)
//!     → Ok(()) | SyncError::WrongNetwork { expected, actual }
//! ```

pub mod guard;

pub use guard::NetworkGuard;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Hex-encoded chain identifier as reported by `eth_chainId` (e.g. `0xaa36a7`).
///
/// Well-formed hex ids are stored in canonical `{:#x}` form, so `0xAA36A7`,
/// `0xaa36a7` and `0x00aa36a7` compare equal. Anything else is kept
/// trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct NetworkId(String);

impl NetworkId {
    /// Sepolia test network.
    pub const SEPOLIA: &'static str = "0xaa36a7";

    pub fn new(id: impl AsRef<str>) -> Self {
        let raw = Self(id.as_ref().trim().to_ascii_lowercase());
        match raw.chain_id() {
            Some(chain_id) => Self::from(chain_id),
            None => raw,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric chain id, if the identifier is well-formed `0x`-prefixed hex.
    pub fn chain_id(&self) -> Option<u64> {
        let digits = self.0.strip_prefix("0x")?;
        if digits.is_empty() {
            return None;
        }
        u64::from_str_radix(digits, 16).ok()
    }
}

impl From<String> for NetworkId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl From<&str> for NetworkId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<NetworkId> for String {
    fn from(id: NetworkId) -> Self {
        id.0
    }
}

impl From<u64> for NetworkId {
    fn from(chain_id: u64) -> Self {
        Self(format!("{:#x}", chain_id))
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_id_normalization() {
        assert_eq!(NetworkId::new(" 0xAA36A7 "), NetworkId::new(NetworkId::SEPOLIA));
        assert_eq!(NetworkId::from(11155111u64).as_str(), "0xaa36a7");
        assert_eq!(NetworkId::from(1u64).as_str(), "0x1");
    }

    #[test]
    fn test_leading_zeros_are_the_same_network() {
        assert_eq!(NetworkId::new("0x01"), NetworkId::new("0x1"));
        assert_eq!(NetworkId::new("0x00aa36a7").as_str(), NetworkId::SEPOLIA);
        assert_eq!(NetworkId::new("0x0").as_str(), "0x0");
        assert_ne!(NetworkId::new("0x01"), NetworkId::new("0x10"));
    }

    #[test]
    fn test_chain_id_parsing() {
        assert_eq!(NetworkId::new("0xaa36a7").chain_id(), Some(11_155_111));
        assert_eq!(NetworkId::new("0x").chain_id(), None);
        assert_eq!(NetworkId::new("sepolia").chain_id(), None);
    }
}
