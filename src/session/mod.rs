//! Wallet session subsystem.
//!
//! # Data Flow
//! ```text
//! load() / connect()
//!     → ProviderGateway (eth_accounts / eth_requestAccounts, eth_chainId)
//!     → Connected → FeedSynchronizer::start()
//!
//! WrongNetwork from any chain operation
//!     → NetworkMismatch (account kept, feed stopped)
//!     → on_chain_changed(required) / resync() → Connected
//!
//! teardown()
//!     → FeedSynchronizer::stop() (always) → Disconnected
//! ```

pub mod controller;
pub mod state;

pub use controller::SessionController;
pub use state::{SessionState, WalletSession};
