//! Board sync payloads
//!
//! A sync signal is broadcast whenever an order changes anywhere: another
//! operator's station, or the customer-facing flow. Consumers treat it as
//! an invalidation and refetch from the authoritative source rather than
//! patching local state from the payload.

use crate::models::{Order, OrderCategory};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Change kind carried by a board sync signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Create,
    Update,
    Delete,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Board sync signal (server -> clients)
///
/// The raw feed delivers loosely-shaped JSON; [`BoardSync::parse`] validates
/// it once at the boundary so downstream code never branches on untyped
/// data. Deletions carry only the order id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum BoardSync {
    /// A new order entered the board
    Create { order: Order },
    /// An existing order changed
    Update { order: Order },
    /// An order was removed
    Delete { order_id: String },
}

impl BoardSync {
    /// Parse and validate a raw feed payload
    pub fn parse(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Change kind of this signal
    pub fn action(&self) -> SyncAction {
        match self {
            Self::Create { .. } => SyncAction::Create,
            Self::Update { .. } => SyncAction::Update,
            Self::Delete { .. } => SyncAction::Delete,
        }
    }

    /// Id of the order this signal refers to
    pub fn order_id(&self) -> &str {
        match self {
            Self::Create { order } | Self::Update { order } => &order.id,
            Self::Delete { order_id } => order_id,
        }
    }

    /// Category of the carried order; deletions have none
    pub fn category(&self) -> Option<OrderCategory> {
        match self {
            Self::Create { order } | Self::Update { order } => Some(order.category),
            Self::Delete { .. } => None,
        }
    }
}
