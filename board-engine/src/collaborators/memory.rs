//! In-process collaborator over shared state
//!
//! Serves tests and embedded hosts the way an in-memory transport serves a
//! message bus: same contracts, no network. Commits can be delayed and made
//! to fail for exercising the rollback path.

use super::{OrderSource, TransitionStore};
use crate::error::StoreError;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared::models::{Order, OrderFilter};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
struct Inner {
    orders: Mutex<Vec<Order>>,
    fail_commits: AtomicBool,
    commit_delay: Mutex<Option<Duration>>,
    commits: AtomicUsize,
    fetches: AtomicUsize,
}

/// Shared in-memory order store
#[derive(Debug, Default, Clone)]
pub struct MemoryCollaborator {
    inner: Arc<Inner>,
}

impl MemoryCollaborator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored collection
    pub fn seed(&self, orders: Vec<Order>) {
        *self.inner.orders.lock() = orders;
    }

    /// Add one order (as an external actor would)
    pub fn insert(&self, order: Order) {
        self.inner.orders.lock().push(order);
    }

    /// Remove one order (as an external actor would)
    pub fn remove(&self, order_id: &str) {
        self.inner.orders.lock().retain(|o| o.id != order_id);
    }

    /// Make subsequent commits fail
    pub fn fail_commits(&self, fail: bool) {
        self.inner.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Delay every commit, to keep transitions in flight during a test
    pub fn set_commit_delay(&self, delay: Option<Duration>) {
        *self.inner.commit_delay.lock() = delay;
    }

    /// Number of commit calls seen
    pub fn commit_count(&self) -> usize {
        self.inner.commits.load(Ordering::SeqCst)
    }

    /// Number of fetch calls seen
    pub fn fetch_count(&self) -> usize {
        self.inner.fetches.load(Ordering::SeqCst)
    }

    /// Stored stage of an order, for assertions
    pub fn stage_of(&self, order_id: &str) -> Option<String> {
        self.inner
            .orders
            .lock()
            .iter()
            .find(|o| o.id == order_id)
            .and_then(|o| o.stage.clone())
    }
}

#[async_trait]
impl TransitionStore for MemoryCollaborator {
    async fn commit_transition(
        &self,
        _form_owner_id: &str,
        order_id: &str,
        target_stage: &str,
    ) -> Result<(), StoreError> {
        self.inner.commits.fetch_add(1, Ordering::SeqCst);
        let delay = *self.inner.commit_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.inner.fail_commits.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("commit refused".to_string()));
        }
        let mut orders = self.inner.orders.lock();
        match orders.iter_mut().find(|o| o.id == order_id) {
            Some(order) => {
                order.stage = Some(target_stage.to_string());
                Ok(())
            }
            None => Err(StoreError::Rejected(format!("unknown order {order_id}"))),
        }
    }
}

#[async_trait]
impl OrderSource for MemoryCollaborator {
    async fn fetch_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError> {
        self.inner.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .inner
            .orders
            .lock()
            .iter()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect())
    }
}
