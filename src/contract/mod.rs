//! WavePortal contract client.
//!
//! # Data Flow
//! ```text
//! abi.rs (sol! interface, optional ABI artifact check)
//!     → client.rs (eth_call / eth_sendTransaction / receipts through the gateway)
//!     → subscription.rs (NewWave log polling, cancellable handles)
//!     → types.rs (Message, TransactionHandle)
//! ```
//!
//! # Design Decisions
//! - The client is stateless with respect to the feed; it never stores messages
//! - `WaveContract` is the seam the feed synchronizer depends on, so the
//!   synchronizer can be driven by an in-memory contract in tests
//! - Live events are delivered through a callback registered with an opaque
//!   subscription handle; unsubscribing is idempotent

pub mod abi;
pub mod client;
pub mod subscription;
pub mod types;

pub use client::{ChainContract, ChainContractOptions, NewMessageCallback, WaveContract};
pub use subscription::{SubscriptionHandle, SubscriptionId, SubscriptionRegistry};
pub use types::{Message, TransactionHandle, TxStatus};
