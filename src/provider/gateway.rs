//! Provider gateway: account discovery, connection request and network identity.

use std::fmt;
use std::sync::Arc;

use alloy::primitives::Address;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::{SyncError, SyncResult};
use crate::network::NetworkId;
use crate::observability::metrics;
use crate::provider::{methods, Eip1193Provider};

/// Wraps an (optional) wallet provider.
#[derive(Clone, Default)]
pub struct ProviderGateway {
    provider: Option<Arc<dyn Eip1193Provider>>,
}

impl ProviderGateway {
    pub fn new(provider: Arc<dyn Eip1193Provider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// A gateway with no wallet behind it.
    pub fn unavailable() -> Self {
        Self { provider: None }
    }

    /// Whether a provider is present. No side effects.
    pub fn detect(&self) -> bool {
        self.provider.is_some()
    }

    /// Accounts already authorized for this client, without prompting.
    pub async fn get_accounts(&self) -> SyncResult<Vec<Address>> {
        self.request(methods::ACCOUNTS, json!([])).await
    }

    /// Ask the wallet for account access. May prompt the user.
    pub async fn request_accounts(&self) -> SyncResult<Vec<Address>> {
        self.request_with(methods::REQUEST_ACCOUNTS, json!([]), SyncError::UserRejected)
            .await
    }

    /// Network the provider currently targets.
    pub async fn get_network_id(&self) -> SyncResult<NetworkId> {
        self.request(methods::CHAIN_ID, json!([])).await
    }

    /// Issue a request, reporting a user rejection as a plain RPC error.
    pub async fn request<R: DeserializeOwned>(&self, method: &str, params: Value) -> SyncResult<R> {
        let rejected = SyncError::Rpc(format!("{} rejected by user", method));
        self.request_with(method, params, rejected).await
    }

    /// Issue a request, reporting a user rejection (EIP-1193 code 4001) as `on_reject`.
    pub async fn request_with<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
        on_reject: SyncError,
    ) -> SyncResult<R> {
        let provider = self.provider.as_ref().ok_or(SyncError::ProviderUnavailable)?;

        let value = match provider.request(method, params).await {
            Ok(value) => value,
            Err(e) if e.is_user_rejection() => {
                tracing::info!(method, "Request rejected by user");
                return Err(on_reject);
            }
            Err(e) => {
                tracing::warn!(method, error = %e, "Provider request failed");
                metrics::record_rpc_error(method);
                return Err(e.into());
            }
        };

        serde_json::from_value(value).map_err(|e| {
            metrics::record_rpc_error(method);
            SyncError::Rpc(format!("Invalid response to {}: {}", method, e))
        })
    }
}

impl fmt::Debug for ProviderGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderGateway")
            .field("detected", &self.detect())
            .finish()
    }
}
