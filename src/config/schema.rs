//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::network::NetworkId;

/// Deployed WavePortal used when no address is configured.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x47E7ead63474cEad996DA6B7aCEe2657896c1c37";

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PortalConfig {
    /// Wallet provider endpoint.
    pub wallet: WalletConfig,

    /// Required network.
    pub network: NetworkConfig,

    /// Contract address and interface.
    pub contract: ContractConfig,

    /// Polling intervals.
    pub sync: SyncConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Wallet provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WalletConfig {
    /// JSON-RPC endpoint of the wallet. `None` means no provider is installed.
    pub rpc_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Hex chain id every chain operation must run against.
    pub required_chain_id: String,
}

impl NetworkConfig {
    pub fn required(&self) -> NetworkId {
        NetworkId::new(&self.required_chain_id)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            required_chain_id: NetworkId::SEPOLIA.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Address of the deployed WavePortal contract.
    pub address: String,

    /// Optional ABI artifact checked against the compiled interface at startup.
    pub abi_path: Option<String>,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_CONTRACT_ADDRESS.to_string(),
            abi_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Interval between `NewWave` log polls.
    pub event_poll_interval_ms: u64,

    /// Interval between receipt polls while awaiting confirmation.
    pub receipt_poll_interval_ms: u64,

    /// Interval between account/network change checks in watch mode.
    pub wallet_poll_interval_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            event_poll_interval_ms: 4000,
            receipt_poll_interval_ms: 2000,
            wallet_poll_interval_ms: 3000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PortalConfig::default();
        assert!(config.wallet.rpc_url.is_none());
        assert_eq!(config.network.required().as_str(), "0xaa36a7");
        assert_eq!(config.contract.address, DEFAULT_CONTRACT_ADDRESS);
        assert_eq!(config.sync.receipt_poll_interval_ms, 2000);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_toml() {
        let config: PortalConfig = toml::from_str(
            r#"
            [wallet]
            rpc_url = "http://127.0.0.1:1248"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.wallet.rpc_url.as_deref(), Some("http://127.0.0.1:1248"));
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.sync.event_poll_interval_ms, 4000);
    }
}
