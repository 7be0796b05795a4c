//! Session controller: wallet connection, initial sync, and teardown.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use uuid::Uuid;

use crate::contract::{Message, TransactionHandle, WaveContract};
use crate::error::{SyncError, SyncResult};
use crate::feed::{Feed, FeedSynchronizer, SyncState};
use crate::network::guard::check_network;
use crate::network::{NetworkGuard, NetworkId};
use crate::provider::ProviderGateway;
use crate::session::state::{SessionState, WalletSession};

/// Top-level state machine coordinating the gateway, guard and feed.
///
/// Every failure leaves the controller in a re-enterable state; nothing here
/// tears the process down.
pub struct SessionController {
    id: Uuid,
    gateway: ProviderGateway,
    guard: NetworkGuard,
    sync: FeedSynchronizer,
    state: SessionState,
    session: WalletSession,
}

impl SessionController {
    pub fn new(gateway: ProviderGateway, contract: Arc<dyn WaveContract>, required: NetworkId) -> Self {
        let guard = NetworkGuard::new(gateway.clone(), required);
        Self {
            id: Uuid::new_v4(),
            sync: FeedSynchronizer::new(contract, guard.clone()),
            gateway,
            guard,
            state: SessionState::Disconnected,
            session: WalletSession::default(),
        }
    }

    /// How often the network is re-checked while a wave is mining.
    pub fn with_network_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.sync.set_network_poll_interval(poll_interval);
        self
    }

    /// Correlation id for logs.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync.state()
    }

    pub fn feed(&self) -> &Feed {
        self.sync.feed()
    }

    pub fn snapshot(&self) -> Arc<Vec<Message>> {
        self.sync.snapshot()
    }

    pub fn gateway(&self) -> &ProviderGateway {
        &self.gateway
    }

    pub fn required_network(&self) -> &NetworkId {
        self.guard.required()
    }

    /// Silent account discovery. Connects without prompting if the wallet
    /// already authorized an account.
    pub async fn load(&mut self) -> SyncResult<()> {
        if !self.gateway.detect() {
            tracing::error!(session_id = %self.id, "No wallet provider detected");
            return Err(SyncError::ProviderUnavailable);
        }

        let accounts = self.gateway.get_accounts().await?;
        let network = self.gateway.get_network_id().await?;
        tracing::info!(session_id = %self.id, network = %network, "Wallet provider found");
        self.session.network_id = Some(network);

        match accounts.first() {
            Some(&account) => {
                tracing::info!(session_id = %self.id, account = %account, "Found an authorized account");
                self.establish(account).await
            }
            None => {
                tracing::info!(session_id = %self.id, "No authorized account found");
                Ok(())
            }
        }
    }

    /// User-initiated connection. May prompt the user in the wallet.
    ///
    /// If a session already exists and the request fails, the existing
    /// session and its state are kept.
    pub async fn connect(&mut self) -> SyncResult<()> {
        if !self.gateway.detect() {
            tracing::error!(session_id = %self.id, "No wallet provider detected");
            return Err(SyncError::ProviderUnavailable);
        }

        let previous = std::mem::replace(&mut self.state, SessionState::Connecting);
        let accounts = match self.gateway.request_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                tracing::warn!(session_id = %self.id, error = %e, "Wallet connection failed");
                self.restore(previous);
                return Err(e);
            }
        };

        let Some(&account) = accounts.first() else {
            self.restore(previous);
            return Err(SyncError::NoAuthorizedAccount);
        };

        match self.gateway.get_network_id().await {
            Ok(network) => self.session.network_id = Some(network),
            Err(e) => tracing::debug!(session_id = %self.id, error = %e, "Could not read wallet network"),
        }

        tracing::info!(session_id = %self.id, account = %account, "Connected");
        if self.session.account == Some(account) {
            self.state = previous;
            return self.resync().await;
        }
        if self.session.is_connected() {
            self.sync.stop();
        }
        self.establish(account).await
    }

    /// Return to the state before a failed connection attempt.
    fn restore(&mut self, previous: SessionState) {
        self.state = if self.session.is_connected() {
            previous
        } else {
            SessionState::Disconnected
        };
    }

    async fn establish(&mut self, account: Address) -> SyncResult<()> {
        self.session.account = Some(account);
        self.state = SessionState::Connected;
        let result = self.sync.start().await;
        self.observe(result)
    }

    /// Retry the initial sync, e.g. after an RPC failure or a network switch.
    pub async fn resync(&mut self) -> SyncResult<()> {
        if !self.session.is_connected() {
            return Err(SyncError::NotConnected);
        }
        let result = self.sync.start().await;
        self.observe(result)
    }

    /// Submit a wave and wait until it is mined. The message reaches the
    /// feed through the live subscription, not through this call.
    pub async fn wave(&mut self, text: &str) -> SyncResult<TransactionHandle> {
        if text.trim().is_empty() {
            return Err(SyncError::EmptyMessage);
        }
        if !self.state.is_connected() || !self.session.is_connected() {
            return Err(SyncError::NotConnected);
        }
        if matches!(self.state, SessionState::NetworkMismatch { .. }) {
            // The feed must be live again before the new wave's event can arrive.
            self.resync().await?;
        }

        let submitted = self.sync.submit_message(text).await;
        let mut handle = self.observe(submitted)?;
        let confirmed = self.sync.confirm(&mut handle).await;
        self.observe(confirmed)?;
        Ok(handle)
    }

    /// Wallet reported a new account list.
    pub async fn on_accounts_changed(&mut self, accounts: Vec<Address>) -> SyncResult<()> {
        match accounts.first() {
            None if self.session.is_connected() => {
                tracing::info!(session_id = %self.id, "Wallet disconnected all accounts");
                self.teardown();
                Ok(())
            }
            None => Ok(()),
            Some(&account) if self.session.account == Some(account) => Ok(()),
            Some(&account) => {
                tracing::info!(session_id = %self.id, account = %account, "Active account changed");
                self.sync.stop();
                self.establish(account).await
            }
        }
    }

    /// Wallet switched networks.
    pub async fn on_chain_changed(&mut self, network: NetworkId) -> SyncResult<()> {
        if self.session.network_id.as_ref() == Some(&network) {
            return Ok(());
        }
        tracing::info!(session_id = %self.id, network = %network, "Wallet network changed");
        self.session.network_id = Some(network.clone());

        if !self.session.is_connected() {
            return Ok(());
        }

        let checked = check_network(self.guard.required(), &network);
        self.observe(checked)?;
        self.resync().await
    }

    /// Release the live subscription and forget the session. Always safe.
    pub fn teardown(&mut self) {
        self.sync.stop();
        self.state = SessionState::Disconnected;
        self.session = WalletSession::default();
        tracing::info!(session_id = %self.id, "Session torn down");
    }

    /// Fold a chain-operation result into the session state.
    fn observe<T>(&mut self, result: SyncResult<T>) -> SyncResult<T> {
        match &result {
            Err(SyncError::WrongNetwork { expected, actual }) if self.state.is_connected() => {
                // Refuse chain work but keep showing what was already loaded.
                self.sync.suspend();
                self.session.network_id = Some(actual.clone());
                self.state = SessionState::NetworkMismatch {
                    expected: expected.clone(),
                    actual: actual.clone(),
                };
            }
            Ok(_) if matches!(self.state, SessionState::NetworkMismatch { .. }) => {
                self.session.network_id = Some(self.guard.required().clone());
                self.state = SessionState::Connected;
            }
            _ => {}
        }
        result
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("session", &self.session)
            .field("sync", &self.sync)
            .finish()
    }
}
