//! Contract-facing value types.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use alloy::primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};

use crate::contract::abi::{NewWave, Wave};

/// One wave. Equality is the (author, timestamp, text) tuple; the contract
/// hands out no stable id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    pub author: Address,
    pub submitted_at_unix_seconds: u64,
    pub text: String,
}

impl Message {
    pub fn new(author: Address, submitted_at_unix_seconds: u64, text: impl Into<String>) -> Self {
        Self {
            author,
            submitted_at_unix_seconds,
            text: text.into(),
        }
    }

    /// Wall-clock submission time.
    pub fn submitted_at(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.submitted_at_unix_seconds)
    }
}

impl From<Wave> for Message {
    fn from(wave: Wave) -> Self {
        Self {
            author: wave.waver,
            submitted_at_unix_seconds: wave.timestamp.saturating_to::<u64>(),
            text: wave.message,
        }
    }
}

impl From<NewWave> for Message {
    fn from(event: NewWave) -> Self {
        Self {
            author: event.from,
            submitted_at_unix_seconds: event.timestamp.saturating_to::<u64>(),
            text: event.message,
        }
    }
}

/// Lifecycle of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    /// Accepted into the pending pool.
    Pending,
    /// Mined successfully.
    Confirmed { block_number: u64 },
    /// Mined but reverted.
    Failed(String),
}

/// A submitted wave transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionHandle {
    pub hash: TxHash,
    pub status: TxStatus,
}

impl TransactionHandle {
    pub fn pending(hash: TxHash) -> Self {
        Self {
            hash,
            status: TxStatus::Pending,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.status, TxStatus::Pending)
    }
}
