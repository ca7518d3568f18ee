//! r3 - Trial content selection
//!
//! Decides what a trial shows at each step: media files, single lines of
//! text, or nothing at all.
//!
//! # Flow
//!
//! A Logic names a selector (`media`, `text` or `blank`) and its filters.
//! - `Dispatcher::prepare` resets the Logic and lets the selector scan the
//!   media catalog, storing the resulting selection on the Logic
//! - `Dispatcher::fetch_content` serves one item of that selection for a
//!   Trial by sequence number, wrapping around at the end
//!
//! # Modules
//!
//! - `core`: Dispatcher and the per-Logic state log
//! - `selectors`: Media, Text and Blank selectors
//! - `domain`: Data structures (MediaRecord, Logic, Trial, ContentPayload)
//! - `store`: Storage traits with in-memory and SQLite backends
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! r3 media import ./photos --pattern "*.jpg" --tag "cats"
//! r3 logic create --implement media --tag cats --order shuffle
//! r3 logic prep 1
//! r3 trial create 1
//! r3 fetch <trial-id> 0
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod selectors;
pub mod store;

// Re-export main types at crate root for convenience
pub use crate::core::{Dispatcher, StateLog, StateRetention};
pub use domain::{
    CacheKey, CatalogOrdering, ContentPayload, Implementation, Logic, MediaOrder, MediaRecord,
    Trial,
};
pub use error::LogicError;
pub use selectors::{SelectionSettings, Selector, SelectorKind};
pub use store::{MemoryStore, SqliteStore, Storage};
