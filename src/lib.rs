//! Wave portal chain-state synchronizer.
//!
//! Connects to a wallet provider, loads every wave stored by the WavePortal
//! contract, submits new waves as transactions and merges live `NewWave`
//! events into an in-memory feed.

pub mod config;
pub mod contract;
pub mod error;
pub mod feed;
pub mod lifecycle;
pub mod network;
pub mod observability;
pub mod provider;
pub mod session;

pub use config::PortalConfig;
pub use contract::{Message, TransactionHandle, WaveContract};
pub use error::{SyncError, SyncResult};
pub use feed::{Feed, FeedSynchronizer, SyncState};
pub use network::{NetworkGuard, NetworkId};
pub use provider::{Eip1193Provider, ProviderGateway};
pub use session::{SessionController, SessionState};
