//! Core selection flow.
//!
//! This module contains:
//! - Dispatcher: prepare / fetch routing by Logic implementation
//! - StateLog: timestamped progress log on each Logic

pub mod dispatcher;
pub mod state_log;

// Re-export commonly used types
pub use dispatcher::Dispatcher;
pub use state_log::{format_entry, parse_entry, StateLog, StateRetention};
