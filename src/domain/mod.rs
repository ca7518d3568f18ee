//! Domain types for content selection.
//!
//! - Media: catalog records and scan ordering
//! - Logic: selection configuration and prepared results
//! - Trial: a session bound to a Logic
//! - Payload: the `{type, data}` value returned by content fetches
//! - Cache: typed keys for the side cache

pub mod cache;
pub mod logic;
pub mod media;
pub mod payload;
pub mod trial;

// Re-export commonly used types
pub use cache::{CacheKey, TEXT_LOGIC_NAMESPACE};
pub use logic::{FilterList, Implementation, Logic, MediaOrder, WILDCARD};
pub use media::{CatalogOrdering, MediaRecord, TEXT_EXT};
pub use payload::{ContentPayload, NO_DATA_MESSAGE};
pub use trial::Trial;
