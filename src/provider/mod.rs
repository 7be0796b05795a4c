//! Wallet provider subsystem.
//!
//! # Data Flow
//! ```text
//! Eip1193Provider (HTTP wallet bridge, or a fake in tests)
//!     → gateway.rs (account discovery, connection request, network id)
//!     → network guard, contract client
//! ```
//!
//! # Design Decisions
//! - The provider is an explicit trait object handed to the gateway; there
//!   is no ambient global handle
//! - "No provider" is a valid gateway state, reported as `ProviderUnavailable`

pub mod gateway;
pub mod http;

pub use gateway::ProviderGateway;
pub use http::HttpWalletProvider;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProviderRpcError;

/// Wire methods the gateway relies on.
pub mod methods {
    pub const ACCOUNTS: &str = "eth_accounts";
    pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
    pub const CHAIN_ID: &str = "eth_chainId";
    pub const BLOCK_NUMBER: &str = "eth_blockNumber";
    pub const CALL: &str = "eth_call";
    pub const SEND_TRANSACTION: &str = "eth_sendTransaction";
    pub const GET_TRANSACTION_RECEIPT: &str = "eth_getTransactionReceipt";
    pub const GET_LOGS: &str = "eth_getLogs";
}

/// Request/response interface of a wallet provider, keyed by method name.
#[async_trait]
pub trait Eip1193Provider: Send + Sync {
    /// Issue one JSON-RPC request. `params` is the positional parameter array.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError>;
}
