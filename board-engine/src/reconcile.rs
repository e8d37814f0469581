//! Reconciliation against push-delivered external changes
//!
//! Policy: never patch local state from an event payload. Every signal -
//! and every failed commit - triggers a silent refetch of the authoritative
//! collection, replaced wholesale. Partial patching while optimistic
//! transitions are in flight is error-prone, so the design trades a little
//! network efficiency for correctness; the board's refresh applies the one
//! merge rule that matters (pending transitions keep their optimistic
//! stage).

use crate::board::OrderBoard;
use shared::message::BoardSync;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Worker keeping a board eventually consistent with the outside world
///
/// One feed per board instance, explicitly constructed and torn down via
/// its [`CancellationToken`] - no module-level singletons, so independent
/// boards run without cross-talk.
pub struct ReconciliationFeed {
    board: Arc<OrderBoard>,
    events: mpsc::UnboundedReceiver<BoardSync>,
    shutdown: CancellationToken,
}

impl ReconciliationFeed {
    pub fn new(board: Arc<OrderBoard>, events: mpsc::UnboundedReceiver<BoardSync>) -> Self {
        Self {
            board,
            events,
            shutdown: CancellationToken::new(),
        }
    }

    /// Build a feed plus the sender its host pushes raw events into
    pub fn channel(board: Arc<OrderBoard>) -> (mpsc::UnboundedSender<BoardSync>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(board, rx))
    }

    /// Token used to stop the worker
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run until the shutdown token fires or the host drops its sender.
    pub async fn run(mut self) {
        tracing::debug!(epoch = %self.board.epoch(), "Reconciliation feed started");
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = self.board.refresh_signal().notified() => {
                    self.refresh("refresh-request").await;
                }
                event = self.events.recv() => {
                    match event {
                        Some(event) if self.accepts(&event) => {
                            tracing::debug!(
                                order_id = %event.order_id(),
                                action = %event.action(),
                                "External order change, refreshing"
                            );
                            self.refresh("push-event").await;
                        }
                        Some(event) => {
                            tracing::trace!(order_id = %event.order_id(), "Event outside board scope, ignored");
                        }
                        None => break,
                    }
                }
            }
        }
        tracing::debug!(epoch = %self.board.epoch(), "Reconciliation feed stopped");
    }

    /// Category gate. Deletions carry no payload and always refresh.
    fn accepts(&self, event: &BoardSync) -> bool {
        match (self.board.category_filter(), event.category()) {
            (Some(scope), Some(category)) => scope == category,
            _ => true,
        }
    }

    async fn refresh(&self, trigger: &'static str) {
        // A failed silent refresh must not disturb the board; log it and
        // let the next signal retry.
        if let Err(err) = self.board.refresh().await {
            tracing::warn!(trigger, error = %err, "Reconciliation refresh failed");
        }
    }
}
