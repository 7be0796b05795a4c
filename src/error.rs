//! Error taxonomy for the chain-state synchronizer.
//!
//! Provider and contract layers surface raw failures; the network guard
//! and session controller translate them into user-facing, non-fatal
//! states. Nothing here is ever allowed to abort the process.

use alloy::primitives::TxHash;
use thiserror::Error;

use crate::network::NetworkId;

/// EIP-1193 `code` for "the user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;

/// Raw failure reported by an [`Eip1193Provider`](crate::provider::Eip1193Provider).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderRpcError {
    /// The provider answered with a JSON-RPC error object.
    #[error("provider error {code}: {message}")]
    Response { code: i64, message: String },

    /// The request never produced a response (connection, decoding, ...).
    #[error("transport error: {0}")]
    Transport(String),
}

impl ProviderRpcError {
    /// Whether the wallet reported an explicit user refusal.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::Response { code, .. } if *code == USER_REJECTED_CODE)
    }
}

/// Errors surfaced by the provider gateway, contract client, feed and session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// No wallet provider is installed/configured.
    #[error("no wallet provider detected")]
    ProviderUnavailable,

    /// The user declined the account access prompt.
    #[error("wallet connection request rejected by user")]
    UserRejected,

    /// The provider targets a different network than required.
    #[error("wrong network: expected {expected}, got {actual}")]
    WrongNetwork { expected: NetworkId, actual: NetworkId },

    /// Transient transport or RPC failure.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The user declined to sign the transaction.
    #[error("transaction signing rejected by user")]
    SubmissionRejected,

    /// The transaction was mined but reverted.
    #[error("transaction {hash} reverted")]
    TransactionReverted { hash: TxHash },

    /// Empty messages are refused before touching the network.
    #[error("message text must not be empty")]
    EmptyMessage,

    /// The wallet granted access but exposed no account.
    #[error("wallet returned no authorized account")]
    NoAuthorizedAccount,

    /// A chain write was attempted without a connected account.
    #[error("wallet is not connected")]
    NotConnected,
}

impl SyncError {
    /// Whether retrying the same action can succeed without outside changes
    /// beyond the user's own corrective action.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::ProviderUnavailable | Self::TransactionReverted { .. }
        )
    }

    /// What the user should do about it.
    pub fn corrective_action(&self) -> &'static str {
        match self {
            Self::ProviderUnavailable => "install or configure a wallet provider",
            Self::UserRejected | Self::NoAuthorizedAccount => "approve the connection request",
            Self::WrongNetwork { .. } => "switch the wallet to the required network",
            Self::Rpc(_) => "retry",
            Self::SubmissionRejected => "approve the transaction in the wallet",
            Self::TransactionReverted { .. } => "submit a new message",
            Self::EmptyMessage => "enter a message",
            Self::NotConnected => "connect the wallet",
        }
    }
}

impl From<ProviderRpcError> for SyncError {
    fn from(err: ProviderRpcError) -> Self {
        SyncError::Rpc(err.to_string())
    }
}

/// Result type for synchronizer operations.
pub type SyncResult<T> = Result<T, SyncError>;
