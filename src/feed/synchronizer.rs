//! Feed synchronizer: bulk load, live merge, and wave submission.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};

use crate::contract::{Message, NewMessageCallback, SubscriptionHandle, TransactionHandle, WaveContract};
use crate::error::{SyncError, SyncResult};
use crate::feed::store::Feed;
use crate::network::NetworkGuard;
use crate::observability::metrics;

/// Externally visible synchronizer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Empty,
    Loading,
    Live,
}

enum Phase {
    Empty,
    Loading,
    Live { subscription: SubscriptionHandle },
}

/// History returned by a successful bulk load. Only `load` constructs it,
/// and only `go_live` consumes it, so a subscription cannot be installed
/// before the history is in place.
struct LoadedHistory(Vec<Message>);

/// Owns the feed and keeps it in step with the contract.
pub struct FeedSynchronizer {
    contract: Arc<dyn WaveContract>,
    guard: NetworkGuard,
    feed: Feed,
    phase: Phase,
    /// How often the network is re-checked while a transaction is mining.
    network_poll_interval: Duration,
}

impl FeedSynchronizer {
    pub fn new(contract: Arc<dyn WaveContract>, guard: NetworkGuard) -> Self {
        Self {
            contract,
            guard,
            feed: Feed::new(),
            phase: Phase::Empty,
            network_poll_interval: Duration::from_secs(2),
        }
    }

    pub fn set_network_poll_interval(&mut self, poll_interval: Duration) {
        self.network_poll_interval = poll_interval;
    }

    pub fn state(&self) -> SyncState {
        match self.phase {
            Phase::Empty => SyncState::Empty,
            Phase::Loading => SyncState::Loading,
            Phase::Live { .. } => SyncState::Live,
        }
    }

    /// Read handle to the feed.
    pub fn feed(&self) -> &Feed {
        &self.feed
    }

    pub fn snapshot(&self) -> Arc<Vec<Message>> {
        self.feed.snapshot()
    }

    /// Load the full history, then go live. A no-op when already live.
    ///
    /// On failure the synchronizer stays in `Loading`; calling `start` again
    /// retries. Nothing retries automatically.
    pub async fn start(&mut self) -> SyncResult<()> {
        if matches!(self.phase, Phase::Live { .. }) {
            tracing::debug!("Feed already live");
            return Ok(());
        }

        self.phase = Phase::Loading;
        tracing::info!("Loading wave history");

        let history = match self.load().await {
            Ok(history) => history,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load wave history");
                return Err(e);
            }
        };

        match self.go_live(history).await {
            Ok(subscription) => {
                self.phase = Phase::Live { subscription };
                tracing::info!(messages = self.feed.len(), "Feed is live");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to subscribe to new waves");
                Err(e)
            }
        }
    }

    async fn load(&self) -> SyncResult<LoadedHistory> {
        self.guard.ensure().await?;
        let messages = self.contract.list_all().await?;
        Ok(LoadedHistory(messages))
    }

    async fn go_live(&self, history: LoadedHistory) -> SyncResult<SubscriptionHandle> {
        self.feed.replace(history.0);

        let feed = self.feed.clone();
        let epoch = feed.epoch();
        let callback: NewMessageCallback = Arc::new(move |message: Message| {
            tracing::info!(
                author = %message.author,
                timestamp = message.submitted_at_unix_seconds,
                "NewWave received"
            );
            if feed.append(epoch, message) {
                metrics::record_live_event();
            }
        });

        self.contract.subscribe_new_message(callback).await
    }

    /// Release the live subscription (if any) and return to `Empty`.
    /// Safe to call in any state, any number of times.
    pub fn stop(&mut self) {
        self.release();
        self.feed.reset();
    }

    /// Release the live subscription but keep the last snapshot readable.
    /// The next `start` replaces it with a fresh history.
    pub fn suspend(&mut self) {
        self.release();
        self.feed.invalidate();
    }

    fn release(&mut self) {
        let previous = std::mem::replace(&mut self.phase, Phase::Empty);
        if let Phase::Live { subscription } = previous {
            self.contract.unsubscribe(&subscription);
            tracing::info!("Feed subscription released");
        }
    }

    /// Submit a wave. The feed is not touched here; the message shows up
    /// through its own `NewWave` event.
    pub async fn submit_message(&self, text: &str) -> SyncResult<TransactionHandle> {
        if text.trim().is_empty() {
            return Err(SyncError::EmptyMessage);
        }

        self.guard.ensure().await?;
        self.log_total("before submission").await;

        match self.contract.submit(text).await {
            Ok(handle) => {
                tracing::info!(tx_hash = %handle.hash, "Mining...");
                Ok(handle)
            }
            Err(e) => {
                metrics::record_submission("rejected");
                Err(e)
            }
        }
    }

    /// Wait for a submitted wave to be mined.
    ///
    /// The network is re-checked while waiting; a switch away from the
    /// required network ends the wait with `WrongNetwork` and leaves the
    /// handle `Pending`.
    pub async fn confirm(&self, handle: &mut TransactionHandle) -> SyncResult<()> {
        self.guard.ensure().await?;

        let outcome = tokio::select! {
            result = self.contract.await_confirmation(handle) => result,
            err = self.network_lost() => Err(err),
        };

        match outcome {
            Ok(()) => {
                tracing::info!(tx_hash = %handle.hash, status = ?handle.status, "Mined");
                metrics::record_submission("confirmed");
                self.log_total("after confirmation").await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(tx_hash = %handle.hash, error = %e, "Wave transaction failed");
                metrics::record_submission("failed");
                Err(e)
            }
        }
    }

    /// Resolves once the wallet reports a network other than the required one.
    async fn network_lost(&self) -> SyncError {
        let mut ticker = interval(self.network_poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately and the caller has just checked.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match self.guard.ensure().await {
                Ok(()) => {}
                Err(e @ SyncError::WrongNetwork { .. }) => return e,
                Err(e) => tracing::debug!(error = %e, "Network check failed while mining"),
            }
        }
    }

    async fn log_total(&self, stage: &'static str) {
        if let Err(e) = self.guard.ensure().await {
            tracing::debug!(error = %e, stage, "Skipping total wave count");
            return;
        }
        match self.contract.count().await {
            Ok(total) => tracing::info!(total, stage, "Retrieved total wave count"),
            Err(e) => tracing::debug!(error = %e, stage, "Could not read total wave count"),
        }
    }
}

impl Drop for FeedSynchronizer {
    fn drop(&mut self) {
        if let Phase::Live { subscription } = &self.phase {
            self.contract.unsubscribe(subscription);
        }
    }
}

impl std::fmt::Debug for FeedSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedSynchronizer")
            .field("state", &self.state())
            .field("feed", &self.feed)
            .finish()
    }
}
