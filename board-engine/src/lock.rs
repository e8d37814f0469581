//! Per-order transition lock
//!
//! Registry of order ids with a persistence call in flight. Acquisition is
//! an atomic check-and-set through the map's entry API; a second attempt
//! while held is refused, not queued. Holds older than the configured
//! timeout are treated as abandoned and stolen by the next acquirer - the
//! write path forces a reconciliation when that happens, since state may
//! have drifted while the original call was stuck.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::time::{Duration, Instant};

/// Outcome of a lock acquisition attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    /// Hold granted
    Granted,
    /// Hold granted by stealing an abandoned entry
    Recovered,
    /// Another transition is in flight for this order
    Busy,
}

/// In-flight transition registry
#[derive(Debug)]
pub struct TransitionLock {
    held: DashMap<String, Instant>,
    timeout: Duration,
}

impl TransitionLock {
    pub fn new(timeout: Duration) -> Self {
        Self {
            held: DashMap::new(),
            timeout,
        }
    }

    /// Try to mark an order as having an in-flight transition.
    pub fn try_acquire(&self, order_id: &str) -> Acquire {
        match self.held.entry(order_id.to_string()) {
            Entry::Occupied(mut entry) => {
                if entry.get().elapsed() < self.timeout {
                    return Acquire::Busy;
                }
                tracing::warn!(
                    order_id,
                    held_for_ms = entry.get().elapsed().as_millis() as u64,
                    "Stealing abandoned transition hold"
                );
                entry.insert(Instant::now());
                Acquire::Recovered
            }
            Entry::Vacant(entry) => {
                entry.insert(Instant::now());
                Acquire::Granted
            }
        }
    }

    /// Clear the hold for an order (idempotent)
    pub fn release(&self, order_id: &str) {
        self.held.remove(order_id);
    }

    /// Whether a live (non-abandoned) hold exists for an order
    pub fn is_held(&self, order_id: &str) -> bool {
        self.held
            .get(order_id)
            .is_some_and(|at| at.elapsed() < self.timeout)
    }

    /// Drop every hold (board reset/teardown)
    pub fn clear(&self) {
        self.held.clear();
    }
}
