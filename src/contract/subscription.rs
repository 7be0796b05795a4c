//! Cancellable event subscriptions.
//!
//! A subscription is an opaque token handed out by a registry. The registry
//! owns whatever keeps the subscription alive (typically a polling task);
//! cancelling removes that entry. Cancelling twice, or after the registry
//! itself is gone, is a no-op.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tokio::task::AbortHandle;

/// Opaque subscription identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct RegistryInner {
    next_id: AtomicU64,
    active: DashMap<SubscriptionId, Option<AbortHandle>>,
}

impl Drop for RegistryInner {
    fn drop(&mut self) {
        for entry in self.active.iter() {
            if let Some(task) = entry.value() {
                task.abort();
            }
        }
    }
}

/// Arena of live subscriptions.
#[derive(Clone, Default)]
pub struct SubscriptionRegistry {
    inner: Arc<RegistryInner>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscription. `task` is aborted when the subscription is cancelled.
    pub fn insert(&self, task: Option<AbortHandle>) -> SubscriptionHandle {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.active.insert(id, task);
        SubscriptionHandle {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Remove a subscription. Returns false if it was not active.
    pub fn remove(&self, id: SubscriptionId) -> bool {
        remove_from(&self.inner, id)
    }

    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.inner.active.contains_key(&id)
    }

    /// Number of active subscriptions.
    pub fn len(&self) -> usize {
        self.inner.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.active.is_empty()
    }
}

fn remove_from(inner: &RegistryInner, id: SubscriptionId) -> bool {
    match inner.active.remove(&id) {
        Some((_, task)) => {
            if let Some(task) = task {
                task.abort();
            }
            tracing::debug!(subscription = id.0, "Subscription cancelled");
            true
        }
        None => false,
    }
}

/// Token returned by a subscribe call.
#[derive(Debug, Clone)]
pub struct SubscriptionHandle {
    id: SubscriptionId,
    registry: Weak<RegistryInner>,
}

impl SubscriptionHandle {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Cancel the subscription. Idempotent; returns true only on the call
    /// that actually released it.
    pub fn cancel(&self) -> bool {
        match self.registry.upgrade() {
            Some(inner) => remove_from(&inner, self.id),
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|inner| inner.active.contains_key(&self.id))
    }
}

impl std::fmt::Debug for RegistryInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("active", &self.active.len())
            .finish()
    }
}
