//! Snapshot-readable message store.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::contract::Message;
use crate::observability::metrics;

/// Ordered message sequence in arrival order.
///
/// Cloning yields another read handle to the same feed. Mutation is
/// crate-private so only the synchronizer can change the contents.
#[derive(Clone)]
pub struct Feed {
    inner: Arc<ArcSwap<Generation>>,
}

/// Contents plus the epoch they belong to, swapped as one value so an
/// append can never land in a generation it was not issued for.
struct Generation {
    /// Bumped on every invalidation; appends tagged with an older epoch are dropped.
    epoch: u64,
    messages: Arc<Vec<Message>>,
}

impl Feed {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(Generation {
                epoch: 0,
                messages: Arc::new(Vec::new()),
            })),
        }
    }

    /// Immutable view of the current contents.
    pub fn snapshot(&self) -> Arc<Vec<Message>> {
        self.inner.load().messages.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.load().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.inner.load().epoch
    }

    /// Replace the contents wholesale (bulk load). The epoch is kept.
    pub(crate) fn replace(&self, messages: Vec<Message>) {
        metrics::record_feed_size(messages.len());
        let messages = Arc::new(messages);
        self.inner.rcu(|current| Generation {
            epoch: current.epoch,
            messages: messages.clone(),
        });
    }

    /// Append one live message if the feed has not been invalidated since `epoch`.
    pub(crate) fn append(&self, epoch: u64, message: Message) -> bool {
        let mut appended = false;
        self.inner.rcu(|current| {
            appended = current.epoch == epoch;
            if !appended {
                return Arc::clone(current);
            }
            let mut next = Vec::clone(&current.messages);
            next.push(message.clone());
            Arc::new(Generation {
                epoch: current.epoch,
                messages: Arc::new(next),
            })
        });
        if appended {
            metrics::record_feed_size(self.len());
        }
        appended
    }

    /// Invalidate outstanding append epochs, keeping the current contents readable.
    pub(crate) fn invalidate(&self) {
        self.inner.rcu(|current| Generation {
            epoch: current.epoch + 1,
            messages: current.messages.clone(),
        });
    }

    /// Drop all contents and invalidate outstanding append epochs.
    pub(crate) fn reset(&self) {
        metrics::record_feed_size(0);
        self.inner.rcu(|current| Generation {
            epoch: current.epoch + 1,
            messages: Arc::new(Vec::new()),
        });
    }
}

impl Default for Feed {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feed")
            .field("len", &self.len())
            .field("epoch", &self.epoch())
            .finish()
    }
}
