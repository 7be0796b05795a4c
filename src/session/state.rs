//! Session state types.

use alloy::primitives::Address;
use serde::Serialize;

use crate::network::NetworkId;

/// Account and network the session is bound to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WalletSession {
    pub account: Option<Address>,
    pub network_id: Option<NetworkId>,
}

impl WalletSession {
    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }
}

/// Session controller state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
    /// Connected, but chain operations are refused until the wallet switches networks.
    NetworkMismatch { expected: NetworkId, actual: NetworkId },
}

impl SessionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected | Self::NetworkMismatch { .. })
    }
}
