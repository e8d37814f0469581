//! Push-feed payloads shared between the board engine and its hosts

pub mod payload;
pub use payload::*;
