//! Required-network check.
//!
//! The result is never cached: the user can switch networks in the wallet
//! at any time, so each check re-queries the provider.

use crate::error::{SyncError, SyncResult};
use crate::network::NetworkId;
use crate::provider::ProviderGateway;

/// Validates the provider's active network against a required identifier.
#[derive(Debug, Clone)]
pub struct NetworkGuard {
    gateway: ProviderGateway,
    required: NetworkId,
}

impl NetworkGuard {
    pub fn new(gateway: ProviderGateway, required: NetworkId) -> Self {
        Self { gateway, required }
    }

    /// The network every chain operation must run against.
    pub fn required(&self) -> &NetworkId {
        &self.required
    }

    /// Check the configured required network.
    pub async fn ensure(&self) -> SyncResult<()> {
        self.ensure_network(&self.required).await
    }

    /// Compare the provider's current network id to `expected`.
    pub async fn ensure_network(&self, expected: &NetworkId) -> SyncResult<()> {
        let actual = self.gateway.get_network_id().await?;
        check_network(expected, &actual)?;
        tracing::debug!(network = %actual, "Network check passed");
        Ok(())
    }
}

/// Pure comparison used by the guard and by the session's change hook.
pub fn check_network(expected: &NetworkId, actual: &NetworkId) -> SyncResult<()> {
    if expected != actual {
        tracing::warn!(expected = %expected, actual = %actual, "Wallet is on the wrong network");
        return Err(SyncError::WrongNetwork {
            expected: expected.clone(),
            actual: actual.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_network_passes() {
        let id = NetworkId::new("0xaa36a7");
        assert!(check_network(&id, &id.clone()).is_ok());
    }

    #[test]
    fn test_mismatch_carries_both_ids() {
        let err = check_network(&NetworkId::new("0xaa36a7"), &NetworkId::new("0x1")).unwrap_err();
        assert_eq!(
            err,
            SyncError::WrongNetwork {
                expected: NetworkId::new("0xaa36a7"),
                actual: NetworkId::new("0x1"),
            }
        );
    }
}
