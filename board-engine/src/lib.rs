//! Order-lifecycle synchronization engine for the fulfillment board
//!
//! Reconciles three concurrent sources of truth over one order collection:
//! operator stage transitions, server confirmations of those transitions,
//! and out-of-band push signals from other actors.
//!
//! # Data Flow
//!
//! ```text
//! operator action (button / drag)
//!     ├─ state_machine resolves the target stage
//!     ├─ TransitionLock gates one in-flight transition per order
//!     ├─ projector applies the move to the collection (optimistic)
//!     ├─ TransitionStore persists the transition
//!     │    ├─ Ok  -> confirmed, notice broadcast
//!     │    └─ Err -> stage rolled back + reconciliation refresh
//!     │
//! push feed (create / update / delete)
//!     └─ ReconciliationFeed -> silent full refetch -> collection replaced
//! ```
//!
//! The collection is owned exclusively by [`board::OrderBoard`] and exposed
//! to the presentation layer as read snapshots only.

pub mod board;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod lock;
pub mod projector;
pub mod reconcile;
pub mod state_machine;

pub use board::{BoardNotice, CommitOutcome, OrderBoard};
pub use collaborators::{HttpCollaborator, MemoryCollaborator, OrderSource, TransitionStore};
pub use config::BoardConfig;
pub use error::{BoardError, StoreError};
pub use projector::CardMove;
pub use reconcile::ReconciliationFeed;
