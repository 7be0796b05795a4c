//! JSON-RPC wallet bridge over HTTP.
//!
//! Targets wallets that expose an EIP-1193 compatible endpoint to local
//! clients (account prompts and signing happen inside the wallet), or a
//! development node with unlocked accounts.

use alloy::rpc::client::RpcClient;
use alloy::transports::TransportError;
use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ProviderRpcError, SyncError, SyncResult};
use crate::provider::Eip1193Provider;

/// Wallet provider reached through an HTTP JSON-RPC endpoint.
pub struct HttpWalletProvider {
    client: RpcClient,
    url: url::Url,
}

impl HttpWalletProvider {
    /// Create a provider for `rpc_url`. Does not contact the endpoint.
    pub fn new(rpc_url: &str) -> SyncResult<Self> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e| SyncError::Rpc(format!("Invalid RPC URL '{}': {}", rpc_url, e)))?;

        Ok(Self {
            client: RpcClient::new_http(url.clone()),
            url,
        })
    }

    pub fn url(&self) -> &url::Url {
        &self.url
    }
}

#[async_trait]
impl Eip1193Provider for HttpWalletProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
        tracing::trace!(method, "Wallet request");
        self.client
            .request::<Value, Value>(method.to_string(), params)
            .await
            .map_err(map_transport_error)
    }
}

impl std::fmt::Debug for HttpWalletProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpWalletProvider")
            .field("url", &self.url.as_str())
            .finish()
    }
}

fn map_transport_error(err: TransportError) -> ProviderRpcError {
    match err.as_error_resp() {
        Some(payload) => ProviderRpcError::Response {
            code: payload.code,
            message: payload.message.to_string(),
        },
        None => ProviderRpcError::Transport(err.to_string()),
    }
}
