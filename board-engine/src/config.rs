//! Engine configuration

use shared::models::OrderFilter;
use std::time::Duration;

/// Configuration for an order board
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Fetch filter applied to every collection load
    pub filter: OrderFilter,
    /// Capacity of the notice broadcast channel (default: 256)
    pub notice_capacity: usize,
    /// Age after which an in-flight transition hold is treated as abandoned
    /// and may be stolen by a later request (default: 30s)
    pub transition_timeout: Duration,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            filter: OrderFilter::default(),
            notice_capacity: 256,
            transition_timeout: Duration::from_secs(30),
        }
    }
}

impl BoardConfig {
    /// Config with a fetch filter
    pub fn with_filter(filter: OrderFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }
}
