//! Keys for the side cache that holds derived selection data.

use serde::{Deserialize, Serialize};

/// Namespace for flattened text lines prepared by the text selector
pub const TEXT_LOGIC_NAMESPACE: &str = "text-logic-cache";

/// Composite key: one cache entry per (namespace, Logic)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub namespace: String,
    pub logic_id: i64,
}

impl CacheKey {
    pub fn new(namespace: impl Into<String>, logic_id: i64) -> Self {
        Self {
            namespace: namespace.into(),
            logic_id,
        }
    }

    /// Key of the text line cache for a Logic
    pub fn text_logic(logic_id: i64) -> Self {
        Self::new(TEXT_LOGIC_NAMESPACE, logic_id)
    }

    /// Flat storage name, "{namespace}:{logic_id}"
    pub fn storage_name(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.namespace, self.logic_id)
    }
}
