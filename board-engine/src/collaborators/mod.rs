//! Collaborator contracts consumed by the engine
//!
//! The engine persists and fetches through these traits and never owns the
//! remote side. `http` binds them to the REST backend; `memory` binds them
//! to in-process shared state for tests and embedded hosts.

pub mod http;
pub mod memory;

use crate::error::StoreError;
use async_trait::async_trait;
use shared::models::{Order, OrderFilter};

pub use http::HttpCollaborator;
pub use memory::MemoryCollaborator;

/// Persists stage transitions
#[async_trait]
pub trait TransitionStore: Send + Sync {
    /// Commit a stage transition. Idempotent from the caller's perspective;
    /// failures carry a reason suitable for user display.
    async fn commit_transition(
        &self,
        form_owner_id: &str,
        order_id: &str,
        target_stage: &str,
    ) -> Result<(), StoreError>;
}

/// Fetches authoritative order collections
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// Fetch the full collection for a filter (initial load and every
    /// reconciliation refresh)
    async fn fetch_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError>;
}
