//! Configuration validation.
//!
//! Returns all validation errors, not just the first. Validation is a pure
//! function: `&PortalConfig → Result<(), Vec<ValidationError>>`.

use std::net::SocketAddr;

use alloy::primitives::Address;

use crate::config::schema::PortalConfig;

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &PortalConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(url) = &config.wallet.rpc_url {
        if url.parse::<url::Url>().is_err() {
            errors.push(ValidationError::new("wallet.rpc_url", format!("invalid URL '{}'", url)));
        }
    }

    if config.network.required().chain_id().is_none() {
        errors.push(ValidationError::new(
            "network.required_chain_id",
            format!("'{}' is not a 0x-prefixed hex chain id", config.network.required_chain_id),
        ));
    }

    if config.contract.address.parse::<Address>().is_err() {
        errors.push(ValidationError::new(
            "contract.address",
            format!("invalid address '{}'", config.contract.address),
        ));
    }

    let intervals = [
        ("sync.event_poll_interval_ms", config.sync.event_poll_interval_ms),
        ("sync.receipt_poll_interval_ms", config.sync.receipt_poll_interval_ms),
        ("sync.wallet_poll_interval_ms", config.sync.wallet_poll_interval_ms),
    ];
    for (field, value) in intervals {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than zero"));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&PortalConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_all_errors() {
        let mut config = PortalConfig::default();
        config.wallet.rpc_url = Some("::not a url".to_string());
        config.network.required_chain_id = "sepolia".to_string();
        config.contract.address = "0x1234".to_string();
        config.sync.event_poll_interval_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            [
                "wallet.rpc_url",
                "network.required_chain_id",
                "contract.address",
                "sync.event_poll_interval_ms",
            ]
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = PortalConfig::default();
        config.observability.metrics_address = "nowhere".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
