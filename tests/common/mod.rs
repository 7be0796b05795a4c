//! Shared fakes for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, Bytes, TxHash, B256, U256, U64};
use alloy::sol_types::{SolCall, SolEvent, SolValue};
use async_trait::async_trait;
use serde_json::{json, Value};

use wave_portal::contract::abi::{getAllWavesCall, getTotalWavesCall, waveCall, NewWave, Wave};
use wave_portal::contract::{
    NewMessageCallback, SubscriptionHandle, SubscriptionId, SubscriptionRegistry, TxStatus,
};
use wave_portal::error::ProviderRpcError;
use wave_portal::provider::methods;
use wave_portal::{Eip1193Provider, Message, ProviderGateway, SyncError, SyncResult, TransactionHandle, WaveContract};

pub const SEPOLIA: &str = "0xaa36a7";
pub const MAINNET: &str = "0x1";

pub fn alice() -> Address {
    Address::repeat_byte(0xa1)
}

pub fn bob() -> Address {
    Address::repeat_byte(0xb0)
}

pub fn message(author: Address, ts: u64, text: &str) -> Message {
    Message::new(author, ts, text)
}

fn rejection() -> ProviderRpcError {
    ProviderRpcError::Response {
        code: 4001,
        message: "User rejected the request.".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Scripted wallet: accounts and network only
// ---------------------------------------------------------------------------

/// Wallet that answers account and network queries from mutable state.
pub struct FakeWallet {
    authorized: Mutex<Vec<Address>>,
    grant_on_request: Mutex<Vec<Address>>,
    chain_id: Mutex<String>,
    reject_requests: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl FakeWallet {
    pub fn new(chain_id: &str) -> Arc<Self> {
        Arc::new(Self {
            authorized: Mutex::new(Vec::new()),
            grant_on_request: Mutex::new(vec![alice()]),
            chain_id: Mutex::new(chain_id.to_string()),
            reject_requests: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Accounts already authorized (returned by `eth_accounts`).
    pub fn authorize(&self, accounts: Vec<Address>) {
        *self.authorized.lock().unwrap() = accounts;
    }

    /// Accounts granted when `eth_requestAccounts` is approved.
    pub fn grant_on_request(&self, accounts: Vec<Address>) {
        *self.grant_on_request.lock().unwrap() = accounts;
    }

    pub fn reject_requests(&self) {
        self.reject_requests.store(true, Ordering::SeqCst);
    }

    pub fn switch_chain(&self, chain_id: &str) {
        *self.chain_id.lock().unwrap() = chain_id.to_string();
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|m| *m == method).count()
    }

    pub fn gateway(self: &Arc<Self>) -> ProviderGateway {
        ProviderGateway::new(self.clone())
    }
}

#[async_trait]
impl Eip1193Provider for FakeWallet {
    async fn request(&self, method: &str, _params: Value) -> Result<Value, ProviderRpcError> {
        self.calls.lock().unwrap().push(method.to_string());
        match method {
            methods::ACCOUNTS => Ok(json!(*self.authorized.lock().unwrap())),
            methods::REQUEST_ACCOUNTS => {
                if self.reject_requests.load(Ordering::SeqCst) {
                    return Err(rejection());
                }
                let granted = self.grant_on_request.lock().unwrap().clone();
                *self.authorized.lock().unwrap() = granted.clone();
                Ok(json!(granted))
            }
            methods::CHAIN_ID => Ok(json!(*self.chain_id.lock().unwrap())),
            other => Err(ProviderRpcError::Response {
                code: -32601,
                message: format!("method {} not supported", other),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory contract
// ---------------------------------------------------------------------------

/// `WaveContract` that records calls and delivers events synchronously.
#[derive(Default)]
pub struct FakeContract {
    history: Mutex<Vec<Message>>,
    subscribers: Mutex<Vec<(SubscriptionId, NewMessageCallback)>>,
    registry: SubscriptionRegistry,
    calls: Mutex<Vec<&'static str>>,
    pending: Mutex<Vec<(TxHash, String)>>,
    fail_list: AtomicBool,
    revert_next: AtomicBool,
    reject_signing: AtomicBool,
    hold_confirmations: AtomicBool,
    next_tx: AtomicU64,
}

impl FakeContract {
    pub fn with_history(history: Vec<Message>) -> Arc<Self> {
        let contract = Self::default();
        *contract.history.lock().unwrap() = history;
        Arc::new(contract)
    }

    pub fn fail_list_all(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn revert_next(&self) {
        self.revert_next.store(true, Ordering::SeqCst);
    }

    pub fn reject_signing(&self) {
        self.reject_signing.store(true, Ordering::SeqCst);
    }

    /// Submitted transactions never get mined.
    pub fn hold_confirmations(&self) {
        self.hold_confirmations.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == name).count()
    }

    pub fn active_subscriptions(&self) -> usize {
        self.registry.len()
    }

    /// Simulate a wave stored on-chain by someone else.
    pub fn emit(&self, message: Message) {
        self.history.lock().unwrap().push(message.clone());
        self.deliver(message);
    }

    fn deliver(&self, message: Message) {
        let subscribers: Vec<NewMessageCallback> = self
            .subscribers
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| self.registry.contains(*id))
            .map(|(_, cb)| cb.clone())
            .collect();
        for callback in subscribers {
            callback(message.clone());
        }
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl WaveContract for FakeContract {
    async fn list_all(&self) -> SyncResult<Vec<Message>> {
        self.record("list_all");
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(SyncError::Rpc("connection reset".to_string()));
        }
        Ok(self.history.lock().unwrap().clone())
    }

    async fn count(&self) -> SyncResult<u64> {
        self.record("count");
        Ok(self.history.lock().unwrap().len() as u64)
    }

    async fn submit(&self, text: &str) -> SyncResult<TransactionHandle> {
        self.record("submit");
        if self.reject_signing.load(Ordering::SeqCst) {
            return Err(SyncError::SubmissionRejected);
        }
        let n = self.next_tx.fetch_add(1, Ordering::SeqCst) + 1;
        let hash = TxHash::from(U256::from(n));
        self.pending.lock().unwrap().push((hash, text.to_string()));
        Ok(TransactionHandle::pending(hash))
    }

    async fn await_confirmation(&self, handle: &mut TransactionHandle) -> SyncResult<()> {
        self.record("await_confirmation");
        if self.hold_confirmations.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let text = {
            let mut pending = self.pending.lock().unwrap();
            let idx = pending.iter().position(|(h, _)| *h == handle.hash);
            idx.map(|i| pending.remove(i).1)
        };

        if self.revert_next.swap(false, Ordering::SeqCst) {
            handle.status = TxStatus::Failed("execution reverted".to_string());
            return Err(SyncError::TransactionReverted { hash: handle.hash });
        }

        handle.status = TxStatus::Confirmed { block_number: 1 };
        if let Some(text) = text {
            let ts = 1_700_000_000 + self.history.lock().unwrap().len() as u64;
            self.emit(Message::new(alice(), ts, text));
        }
        Ok(())
    }

    async fn subscribe_new_message(
        &self,
        callback: NewMessageCallback,
    ) -> SyncResult<SubscriptionHandle> {
        self.record("subscribe");
        let handle = self.registry.insert(None);
        self.subscribers.lock().unwrap().push((handle.id(), callback));
        Ok(handle)
    }

    fn unsubscribe(&self, handle: &SubscriptionHandle) {
        self.record("unsubscribe");
        self.registry.remove(handle.id());
    }
}

// ---------------------------------------------------------------------------
// Simulated chain node behind a wallet
// ---------------------------------------------------------------------------

struct ChainState {
    block: u64,
    waves: Vec<Wave>,
    /// (block, log index, tx hash, event)
    logs: Vec<(u64, u64, TxHash, NewWave)>,
    pending: Vec<(TxHash, Address, String)>,
    tx_count: u64,
}

/// Wallet + node that executes the WavePortal contract in memory.
pub struct SimulatedChain {
    pub contract: Address,
    account: Address,
    state: Mutex<ChainState>,
    reject_signing: AtomicBool,
    revert_next: AtomicBool,
}

impl SimulatedChain {
    pub fn new(contract: Address) -> Arc<Self> {
        Arc::new(Self {
            contract,
            account: alice(),
            state: Mutex::new(ChainState {
                block: 100,
                waves: Vec::new(),
                logs: Vec::new(),
                pending: Vec::new(),
                tx_count: 0,
            }),
            reject_signing: AtomicBool::new(false),
            revert_next: AtomicBool::new(false),
        })
    }

    pub fn gateway(self: &Arc<Self>) -> ProviderGateway {
        ProviderGateway::new(self.clone())
    }

    pub fn reject_signing(&self) {
        self.reject_signing.store(true, Ordering::SeqCst);
    }

    pub fn revert_next(&self) {
        self.revert_next.store(true, Ordering::SeqCst);
    }

    pub fn block(&self) -> u64 {
        self.state.lock().unwrap().block
    }

    /// Mine a block containing one wave from `from`.
    pub fn mine_wave(&self, from: Address, text: &str) {
        let mut state = self.state.lock().unwrap();
        state.tx_count += 1;
        let hash = TxHash::from(U256::from(state.tx_count));
        Self::store_wave(&mut state, hash, from, text);
    }

    fn store_wave(state: &mut ChainState, hash: TxHash, from: Address, text: &str) {
        state.block += 1;
        let timestamp = U256::from(1_700_000_000 + state.block * 12);
        state.waves.push(Wave {
            waver: from,
            message: text.to_string(),
            timestamp,
        });
        let block = state.block;
        state.logs.push((
            block,
            0,
            hash,
            NewWave {
                from,
                timestamp,
                message: text.to_string(),
            },
        ));
    }

    fn handle_call(&self, params: &Value) -> Result<Value, ProviderRpcError> {
        let data: Bytes = serde_json::from_value(params[0]["data"].clone())
            .map_err(|e| ProviderRpcError::Transport(e.to_string()))?;
        let state = self.state.lock().unwrap();

        let encoded = if data.starts_with(&getAllWavesCall::SELECTOR) {
            (state.waves.clone(),).abi_encode_params()
        } else if data.starts_with(&getTotalWavesCall::SELECTOR) {
            (U256::from(state.waves.len()),).abi_encode_params()
        } else {
            return Err(ProviderRpcError::Response {
                code: 3,
                message: "execution reverted".to_string(),
            });
        };
        Ok(json!(Bytes::from(encoded)))
    }

    fn handle_send(&self, params: &Value) -> Result<Value, ProviderRpcError> {
        if self.reject_signing.load(Ordering::SeqCst) {
            return Err(rejection());
        }
        let tx = &params[0];
        let data: Bytes = serde_json::from_value(tx["input"].clone())
            .or_else(|_| serde_json::from_value(tx["data"].clone()))
            .map_err(|e| ProviderRpcError::Transport(e.to_string()))?;
        let from: Address = serde_json::from_value(tx["from"].clone())
            .map_err(|e| ProviderRpcError::Transport(e.to_string()))?;
        let call = waveCall::abi_decode(&data).map_err(|e| ProviderRpcError::Response {
            code: -32602,
            message: e.to_string(),
        })?;

        let mut state = self.state.lock().unwrap();
        state.tx_count += 1;
        let hash = TxHash::from(U256::from(state.tx_count));
        state.pending.push((hash, from, call._message));
        Ok(json!(hash))
    }

    /// The first receipt query for a pending tx mines it.
    fn handle_receipt(&self, params: &Value) -> Result<Value, ProviderRpcError> {
        let hash: TxHash = serde_json::from_value(params[0].clone())
            .map_err(|e| ProviderRpcError::Transport(e.to_string()))?;
        let mut state = self.state.lock().unwrap();

        let Some(idx) = state.pending.iter().position(|(h, _, _)| *h == hash) else {
            return Ok(Value::Null);
        };
        let (hash, from, text) = state.pending.remove(idx);

        if self.revert_next.swap(false, Ordering::SeqCst) {
            state.block += 1;
            return Ok(json!({
                "transactionHash": hash,
                "status": "0x0",
                "blockNumber": U64::from(state.block),
            }));
        }

        Self::store_wave(&mut state, hash, from, &text);
        Ok(json!({
            "transactionHash": hash,
            "status": "0x1",
            "blockNumber": U64::from(state.block),
        }))
    }

    fn handle_logs(&self, params: &Value) -> Result<Value, ProviderRpcError> {
        let filter = &params[0];
        let parse = |key: &str| -> Result<u64, ProviderRpcError> {
            serde_json::from_value::<U64>(filter[key].clone())
                .map(|b| b.to::<u64>())
                .map_err(|e| ProviderRpcError::Transport(format!("{}: {}", key, e)))
        };
        let (from, to) = (parse("fromBlock")?, parse("toBlock")?);
        let state = self.state.lock().unwrap();

        let logs: Vec<Value> = state
            .logs
            .iter()
            .filter(|(block, ..)| *block >= from && *block <= to)
            .map(|(block, index, hash, event)| {
                let data = event.encode_log_data();
                json!({
                    "address": self.contract,
                    "topics": data.topics(),
                    "data": data.data,
                    "blockNumber": U64::from(*block),
                    "blockHash": B256::from(U256::from(*block)),
                    "transactionHash": hash,
                    "transactionIndex": "0x0",
                    "logIndex": U64::from(*index),
                    "removed": false,
                })
            })
            .collect();
        Ok(json!(logs))
    }
}

#[async_trait]
impl Eip1193Provider for SimulatedChain {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
        match method {
            methods::ACCOUNTS | methods::REQUEST_ACCOUNTS => Ok(json!([self.account])),
            methods::CHAIN_ID => Ok(json!(SEPOLIA)),
            methods::BLOCK_NUMBER => Ok(json!(U64::from(self.block()))),
            methods::CALL => self.handle_call(&params),
            methods::SEND_TRANSACTION => self.handle_send(&params),
            methods::GET_TRANSACTION_RECEIPT => self.handle_receipt(&params),
            methods::GET_LOGS => self.handle_logs(&params),
            other => Err(ProviderRpcError::Response {
                code: -32601,
                message: format!("method {} not supported", other),
            }),
        }
    }
}
