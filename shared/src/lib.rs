//! Shared types for the fulfillment board
//!
//! Common types used by the board engine and its hosts: the order model,
//! stage pipeline definitions, and push-feed payloads.

pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Board feed re-exports (for convenient access)
pub use message::{BoardSync, SyncAction};
pub use models::{Order, OrderCategory, OrderFilter, OrderItem, StageDefinition, StagePipeline};
