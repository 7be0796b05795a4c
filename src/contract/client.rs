//! Contract client: the three WavePortal operations plus the `NewWave` stream.
//!
//! # Responsibilities
//! - Read the full wave list and the wave count via `eth_call`
//! - Submit `wave(string)` through the wallet (`eth_sendTransaction`)
//! - Poll receipts until a submitted transaction is mined
//! - Poll `NewWave` logs and push decoded messages to subscribers

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash, TxKind, U64};
use alloy::rpc::types::{Filter, Log, TransactionInput, TransactionRequest};
use alloy::sol_types::{SolCall, SolEvent};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::{interval, MissedTickBehavior};

use crate::config::SyncConfig;
use crate::contract::abi::{getAllWavesCall, getTotalWavesCall, waveCall, NewWave};
use crate::contract::subscription::{SubscriptionHandle, SubscriptionRegistry};
use crate::contract::types::{Message, TransactionHandle, TxStatus};
use crate::error::{SyncError, SyncResult};
use crate::provider::{methods, ProviderGateway};

/// Invoked once per delivered `NewWave` event.
pub type NewMessageCallback = Arc<dyn Fn(Message) + Send + Sync>;

/// Public interface of the remote wave contract.
#[async_trait]
pub trait WaveContract: Send + Sync {
    /// Full contract state at call time, in ledger order.
    async fn list_all(&self) -> SyncResult<Vec<Message>>;

    /// Total waves recorded. Diagnostic only.
    async fn count(&self) -> SyncResult<u64>;

    /// Submit a wave. Returns once the transaction is in the pending pool.
    async fn submit(&self, text: &str) -> SyncResult<TransactionHandle>;

    /// Wait until the transaction is mined and record the outcome on `handle`.
    async fn await_confirmation(&self, handle: &mut TransactionHandle) -> SyncResult<()>;

    /// Deliver every new on-chain message to `callback`, in transport order.
    async fn subscribe_new_message(
        &self,
        callback: NewMessageCallback,
    ) -> SyncResult<SubscriptionHandle>;

    /// Release a subscription. Idempotent.
    fn unsubscribe(&self, handle: &SubscriptionHandle);
}

/// Polling intervals for the JSON-RPC backed client.
#[derive(Debug, Clone, Copy)]
pub struct ChainContractOptions {
    pub event_poll_interval: Duration,
    pub receipt_poll_interval: Duration,
}

impl Default for ChainContractOptions {
    fn default() -> Self {
        Self {
            event_poll_interval: Duration::from_secs(4),
            receipt_poll_interval: Duration::from_secs(2),
        }
    }
}

impl From<&SyncConfig> for ChainContractOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            event_poll_interval: Duration::from_millis(config.event_poll_interval_ms),
            receipt_poll_interval: Duration::from_millis(config.receipt_poll_interval_ms),
        }
    }
}

/// Just enough of a receipt to decide the outcome; wallets differ in the
/// extra fields they return.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptSummary {
    status: Option<U64>,
    block_number: Option<U64>,
}

/// WavePortal client bound to one contract address, talking through the wallet gateway.
pub struct ChainContract {
    gateway: ProviderGateway,
    address: Address,
    options: ChainContractOptions,
    subscriptions: SubscriptionRegistry,
    /// Block the last `list_all` read was pinned to, plus one; zero when unset.
    listed_through: AtomicU64,
}

impl ChainContract {
    pub fn new(gateway: ProviderGateway, address: Address, options: ChainContractOptions) -> Self {
        Self {
            gateway,
            address,
            options,
            subscriptions: SubscriptionRegistry::new(),
            listed_through: AtomicU64::new(0),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Number of live subscriptions.
    pub fn active_subscriptions(&self) -> usize {
        self.subscriptions.len()
    }

    async fn call(&self, calldata: Vec<u8>, block: Value) -> SyncResult<Bytes> {
        let request = json!({
            "to": self.address,
            "data": Bytes::from(calldata),
        });
        self.gateway.request(methods::CALL, json!([request, block])).await
    }

    fn listed_block(&self) -> Option<u64> {
        match self.listed_through.load(Ordering::SeqCst) {
            0 => None,
            n => Some(n - 1),
        }
    }
}

#[async_trait]
impl WaveContract for ChainContract {
    async fn list_all(&self) -> SyncResult<Vec<Message>> {
        let block = block_number(&self.gateway).await?;
        let data = self
            .call(getAllWavesCall {}.abi_encode(), json!(format!("{:#x}", block)))
            .await?;
        let waves = getAllWavesCall::abi_decode_returns(&data)
            .map_err(|e| SyncError::Rpc(format!("Failed to decode getAllWaves: {}", e)))?;

        self.listed_through.store(block + 1, Ordering::SeqCst);
        tracing::debug!(block, waves = waves.len(), "Fetched wave history");
        Ok(waves.into_iter().map(Message::from).collect())
    }

    async fn count(&self) -> SyncResult<u64> {
        let data = self
            .call(getTotalWavesCall {}.abi_encode(), json!("latest"))
            .await?;
        let total = getTotalWavesCall::abi_decode_returns(&data)
            .map_err(|e| SyncError::Rpc(format!("Failed to decode getTotalWaves: {}", e)))?;
        Ok(total.saturating_to::<u64>())
    }

    async fn submit(&self, text: &str) -> SyncResult<TransactionHandle> {
        let from = self
            .gateway
            .get_accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(SyncError::NotConnected)?;

        let calldata = waveCall {
            _message: text.to_string(),
        }
        .abi_encode();
        let tx = TransactionRequest {
            from: Some(from),
            to: Some(TxKind::Call(self.address)),
            input: TransactionInput::both(Bytes::from(calldata)),
            ..Default::default()
        };

        let hash: TxHash = self
            .gateway
            .request_with(methods::SEND_TRANSACTION, json!([tx]), SyncError::SubmissionRejected)
            .await?;

        tracing::info!(tx_hash = %hash, from = %from, "Wave transaction submitted");
        Ok(TransactionHandle::pending(hash))
    }

    async fn await_confirmation(&self, handle: &mut TransactionHandle) -> SyncResult<()> {
        let mut ticker = interval(self.options.receipt_poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            match &handle.status {
                TxStatus::Confirmed { .. } => return Ok(()),
                TxStatus::Failed(_) => {
                    return Err(SyncError::TransactionReverted { hash: handle.hash });
                }
                TxStatus::Pending => {}
            }

            ticker.tick().await;

            let receipt: Option<ReceiptSummary> = self
                .gateway
                .request(methods::GET_TRANSACTION_RECEIPT, json!([handle.hash]))
                .await?;
            let Some(receipt) = receipt else {
                tracing::debug!(tx_hash = %handle.hash, "Transaction pending");
                continue;
            };

            // Receipts without a status field predate EIP-658 and only exist for mined txs.
            let succeeded = receipt.status.map_or(true, |s| s == U64::from(1));
            handle.status = if succeeded {
                TxStatus::Confirmed {
                    block_number: receipt.block_number.map_or(0, |b| b.to::<u64>()),
                }
            } else {
                TxStatus::Failed("Transaction reverted".to_string())
            };
        }
    }

    async fn subscribe_new_message(
        &self,
        callback: NewMessageCallback,
    ) -> SyncResult<SubscriptionHandle> {
        let from_block = match self.listed_block() {
            Some(block) => block + 1,
            None => block_number(&self.gateway).await? + 1,
        };

        let task = tokio::spawn(poll_new_waves(
            self.gateway.clone(),
            self.address,
            from_block,
            self.options.event_poll_interval,
            callback,
        ));

        let handle = self.subscriptions.insert(Some(task.abort_handle()));
        tracing::info!(
            contract = %self.address,
            from_block,
            subscription = ?handle.id(),
            "Subscribed to NewWave events"
        );
        Ok(handle)
    }

    fn unsubscribe(&self, handle: &SubscriptionHandle) {
        self.subscriptions.remove(handle.id());
    }
}

impl std::fmt::Debug for ChainContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainContract")
            .field("address", &self.address)
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

async fn block_number(gateway: &ProviderGateway) -> SyncResult<u64> {
    let block: U64 = gateway.request(methods::BLOCK_NUMBER, json!([])).await?;
    Ok(block.to::<u64>())
}

/// Log poller behind one subscription. Runs until its task is aborted.
async fn poll_new_waves(
    gateway: ProviderGateway,
    address: Address,
    mut next_block: u64,
    poll_interval: Duration,
    callback: NewMessageCallback,
) {
    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match fetch_new_waves(&gateway, address, next_block).await {
            Ok(Some((tip, messages))) => {
                for message in messages {
                    callback(message);
                }
                next_block = tip + 1;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, next_block, "Error polling NewWave events");
            }
        }
    }
}

/// Decoded `NewWave` events in `[from_block, tip]`, or `None` if no new block exists.
async fn fetch_new_waves(
    gateway: &ProviderGateway,
    address: Address,
    from_block: u64,
) -> SyncResult<Option<(u64, Vec<Message>)>> {
    let tip = block_number(gateway).await?;
    if tip < from_block {
        return Ok(None);
    }

    let filter = Filter::new()
        .address(address)
        .event(NewWave::SIGNATURE)
        .from_block(from_block)
        .to_block(tip);

    let mut logs: Vec<Log> = gateway.request(methods::GET_LOGS, json!([filter])).await?;
    logs.sort_by_key(|log| (log.block_number, log.log_index));

    let mut messages = Vec::with_capacity(logs.len());
    for log in logs {
        if log.removed {
            continue;
        }
        match log.log_decode::<NewWave>() {
            Ok(decoded) => messages.push(Message::from(decoded.inner.data)),
            Err(e) => tracing::warn!(
                error = %e,
                block = ?log.block_number,
                log_index = ?log.log_index,
                "Skipping undecodable NewWave log"
            ),
        }
    }

    Ok(Some((tip, messages)))
}
