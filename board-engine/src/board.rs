//! Order board - the engine's collection owner and optimistic write path
//!
//! # Transition Flow
//!
//! ```text
//! advance / retreat / move_card
//!     ├─ 1. Resolve target stage (state machine, or drag destination)
//!     ├─ 2. Route precondition: form_owner_id must be present
//!     ├─ 3. TransitionLock try_acquire (busy -> silent no-op)
//!     ├─ 4. Optimistic apply via the projector (before any await)
//!     ├─ 5. TransitionStore::commit_transition
//!     ├─ 6a. Ok  -> release lock, TransitionCommitted notice
//!     └─ 6b. Err -> revert stage, release lock, TransitionFailed notice,
//!                   request reconciliation refresh
//! ```
//!
//! The optimistic mutation always lands synchronously before the store call
//! is dispatched, so the presentation layer never waits on the network to
//! show a transition. A failed commit never stops at a local revert: other
//! orders may have changed while this one was in flight, so the board always
//! asks for an authoritative snapshot as well.

use crate::collaborators::{OrderSource, TransitionStore};
use crate::config::BoardConfig;
use crate::error::BoardError;
use crate::lock::{Acquire, TransitionLock};
use crate::projector::{self, CardMove};
use crate::state_machine;
use parking_lot::RwLock;
use shared::models::{Order, OrderCategory, StagePipeline};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Notify, broadcast};

/// Resolved outcome of a transition request
///
/// The write path resolves to a value instead of propagating errors so the
/// rollback step is guaranteed to run; callers report `Failed` to the
/// operator and treat everything else as routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Persisted; the optimistic state stands
    Committed,
    /// Layout-only move within a column; nothing to persist
    Reordered,
    /// No legal transition from the current stage (action disabled)
    NoTransition,
    /// A transition for this order is already in flight; request dropped
    AlreadyPending,
    /// Order carries no routing form; nothing was mutated
    MissingRoute,
    /// The board was reset while the call was in flight; completion dropped
    Superseded,
    /// Store refused; state rolled back and a refresh was requested
    Failed { reason: String },
}

/// Signals surfaced to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardNotice {
    /// A stage transition was confirmed by the store
    TransitionCommitted { order_id: String, stage: String },
    /// A stage transition failed and was rolled back
    TransitionFailed { order_id: String, reason: String },
    /// The collection was replaced by an authoritative snapshot
    Refreshed { orders: usize },
}

enum Direction {
    Forward,
    Backward,
}

/// Owner of the order collection and of every mutation applied to it
///
/// Constructed per board instance - no process-wide state - so independent
/// boards (tenants, categories) run without cross-talk. The collection is
/// exposed as read snapshots only.
pub struct OrderBoard {
    orders: RwLock<Vec<Order>>,
    locks: TransitionLock,
    store: Arc<dyn TransitionStore>,
    source: Arc<dyn OrderSource>,
    config: BoardConfig,
    notice_tx: broadcast::Sender<BoardNotice>,
    refresh_notify: Notify,
    /// Bumped on reset; in-flight completions from an older generation are
    /// dropped instead of mutating torn-down state
    generation: AtomicU64,
    /// Instance id for log correlation
    epoch: String,
}

impl OrderBoard {
    pub fn new(
        store: Arc<dyn TransitionStore>,
        source: Arc<dyn OrderSource>,
        config: BoardConfig,
    ) -> Self {
        let (notice_tx, _) = broadcast::channel(config.notice_capacity);
        let locks = TransitionLock::new(config.transition_timeout);
        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(epoch = %epoch, filter = ?config.filter, "Order board started");
        Self {
            orders: RwLock::new(Vec::new()),
            locks,
            store,
            source,
            config,
            notice_tx,
            refresh_notify: Notify::new(),
            generation: AtomicU64::new(0),
            epoch,
        }
    }

    /// Board instance id
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    /// Subscribe to board notices
    pub fn subscribe(&self) -> broadcast::Receiver<BoardNotice> {
        self.notice_tx.subscribe()
    }

    /// Category scope of this board, if any
    pub fn category_filter(&self) -> Option<OrderCategory> {
        self.config.filter.category
    }

    // ========== Read Surface ==========

    /// Snapshot of the visible collection (cancelled orders excluded)
    pub fn snapshot(&self) -> Vec<Order> {
        self.orders
            .read()
            .iter()
            .filter(|o| !is_cancelled(o))
            .cloned()
            .collect()
    }

    /// Orders of one column, in board order
    pub fn column(&self, stage_id: &str) -> Vec<Order> {
        self.orders
            .read()
            .iter()
            .filter(|o| {
                let pipeline = StagePipeline::for_category(o.category);
                stage_id != pipeline.terminal_id()
                    && state_machine::current_stage(o, pipeline) == stage_id
            })
            .cloned()
            .collect()
    }

    // ========== Lifecycle ==========

    /// Initial authoritative load; returns the number of orders fetched
    pub async fn load(&self) -> Result<usize, BoardError> {
        self.refresh().await
    }

    /// Replace the collection with a fresh authoritative snapshot.
    ///
    /// Silent by design: no loading signal, only a `Refreshed` notice once
    /// the swap lands. Orders with a live in-flight transition keep their
    /// locally-applied stage so a refresh racing a commit cannot flicker the
    /// card back and forth.
    pub async fn refresh(&self) -> Result<usize, BoardError> {
        let generation = self.generation.load(Ordering::SeqCst);
        let mut fetched = self.source.fetch_orders(&self.config.filter).await?;
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(epoch = %self.epoch, "Dropping refresh from a previous board generation");
            return Ok(0);
        }

        let count = fetched.len();
        {
            let mut orders = self.orders.write();
            let pending: Vec<(String, Option<String>)> = orders
                .iter()
                .filter(|o| self.locks.is_held(&o.id))
                .map(|o| (o.id.clone(), o.stage.clone()))
                .collect();
            for (id, stage) in pending {
                if let Some(order) = fetched.iter_mut().find(|o| o.id == id) {
                    order.stage = stage;
                }
            }
            *orders = fetched;
        }
        tracing::debug!(orders = count, "Collection refreshed");
        let _ = self.notice_tx.send(BoardNotice::Refreshed { orders: count });
        Ok(count)
    }

    /// Ask the reconciliation worker for a background refresh
    pub fn request_refresh(&self) {
        self.refresh_notify.notify_one();
    }

    pub(crate) fn refresh_signal(&self) -> &Notify {
        &self.refresh_notify
    }

    /// Invalidate in-flight work and clear local state (view teardown).
    /// Completions of calls dispatched before the reset are discarded.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.locks.clear();
        self.orders.write().clear();
        tracing::debug!(epoch = %self.epoch, "Board reset");
    }

    // ========== Write Path ==========

    /// Advance an order one stage forward
    pub async fn advance(&self, order_id: &str) -> CommitOutcome {
        self.step(order_id, Direction::Forward).await
    }

    /// Step an order one stage back (misclick correction)
    pub async fn retreat(&self, order_id: &str) -> CommitOutcome {
        self.step(order_id, Direction::Backward).await
    }

    async fn step(&self, order_id: &str, direction: Direction) -> CommitOutcome {
        let Some(order) = self.find(order_id) else {
            tracing::debug!(order_id, "Transition requested for unknown order");
            return CommitOutcome::NoTransition;
        };
        let pipeline = StagePipeline::for_category(order.category);
        let current = state_machine::current_stage(&order, pipeline).to_string();
        let target = match direction {
            Direction::Forward => state_machine::next_stage(&order, pipeline),
            Direction::Backward => state_machine::previous_stage(&order, pipeline),
        };
        let Some(target) = target else {
            return CommitOutcome::NoTransition;
        };
        let mv = CardMove::to_column_end(order_id, current, target.id.clone());
        self.commit(order, mv).await
    }

    /// Apply a drag-and-drop move. Same-column drops reorder locally
    /// without a store round trip; cross-column drops commit the stage.
    pub async fn move_card(&self, mv: CardMove) -> CommitOutcome {
        let Some(order) = self.find(&mv.order_id) else {
            tracing::debug!(order_id = %mv.order_id, "Move requested for unknown order");
            return CommitOutcome::NoTransition;
        };
        let pipeline = StagePipeline::for_category(order.category);
        let current = state_machine::current_stage(&order, pipeline);

        if mv.to_stage.is_empty() || mv.to_stage == current {
            self.apply_projection(pipeline, &mv);
            return CommitOutcome::Reordered;
        }
        self.commit(order, mv).await
    }

    /// The central write path (see module docs)
    async fn commit(&self, order: Order, mv: CardMove) -> CommitOutcome {
        // Identification precondition: without a routing form the store call
        // cannot be addressed. Abort before locking or mutating.
        if order.form_owner_id.is_empty() {
            tracing::warn!(order_id = %order.id, "Transition aborted: order has no routing form");
            let _ = self.notice_tx.send(BoardNotice::TransitionFailed {
                order_id: order.id.clone(),
                reason: "order has no routing form".to_string(),
            });
            return CommitOutcome::MissingRoute;
        }

        // Per-order mutual exclusion; a concurrent request is dropped.
        match self.locks.try_acquire(&order.id) {
            Acquire::Busy => {
                tracing::debug!(order_id = %order.id, "Transition already in flight, ignoring");
                return CommitOutcome::AlreadyPending;
            }
            Acquire::Recovered => {
                // A stuck hold was stolen; state may have drifted meanwhile.
                self.request_refresh();
            }
            Acquire::Granted => {}
        }

        let pipeline = StagePipeline::for_category(order.category);
        let prior_stage = order.stage.clone();
        let generation = self.generation.load(Ordering::SeqCst);

        // Optimistic apply: the collection reflects the target stage before
        // the store round trip is dispatched.
        self.apply_projection(pipeline, &mv);

        let result = self
            .store
            .commit_transition(&order.form_owner_id, &order.id, &mv.to_stage)
            .await;

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(order_id = %order.id, "Dropping transition completion from a previous generation");
            self.locks.release(&order.id);
            return CommitOutcome::Superseded;
        }

        match result {
            Ok(()) => {
                self.locks.release(&order.id);
                tracing::info!(order_id = %order.id, stage = %mv.to_stage, "Stage transition committed");
                let _ = self.notice_tx.send(BoardNotice::TransitionCommitted {
                    order_id: order.id.clone(),
                    stage: mv.to_stage.clone(),
                });
                CommitOutcome::Committed
            }
            Err(err) => {
                // Revert the stage to its pre-transition value, then ask for
                // an authoritative snapshot to resolve any wider divergence.
                {
                    let mut orders = self.orders.write();
                    if let Some(o) = orders.iter_mut().find(|o| o.id == order.id) {
                        o.stage = prior_stage;
                    }
                }
                self.locks.release(&order.id);
                tracing::warn!(order_id = %order.id, error = %err, "Stage transition failed, rolled back");
                let _ = self.notice_tx.send(BoardNotice::TransitionFailed {
                    order_id: order.id.clone(),
                    reason: err.to_string(),
                });
                self.request_refresh();
                CommitOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    fn apply_projection(&self, pipeline: &StagePipeline, mv: &CardMove) {
        let mut orders = self.orders.write();
        let current = std::mem::take(&mut *orders);
        *orders = projector::project_move(current, pipeline, mv);
    }

    fn find(&self, order_id: &str) -> Option<Order> {
        self.orders.read().iter().find(|o| o.id == order_id).cloned()
    }
}

fn is_cancelled(order: &Order) -> bool {
    let pipeline = StagePipeline::for_category(order.category);
    state_machine::current_stage(order, pipeline) == pipeline.terminal_id()
}
