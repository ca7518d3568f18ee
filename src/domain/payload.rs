//! The payload handed back for every content fetch.

use serde::{Deserialize, Serialize};

use super::media::TEXT_EXT;

/// Message served when a prepared selection is empty
pub const NO_DATA_MESSAGE: &str = "No data to show";

/// Tagged content: a media extension plus a URL, or "txt" plus text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPayload {
    /// Media extension token, or "txt" for inline text
    #[serde(rename = "type")]
    pub kind: String,

    /// URL, text line, or empty string
    pub data: String,
}

impl ContentPayload {
    /// Media content served by URL
    pub fn media(ext: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind: ext.into(),
            data: url.into(),
        }
    }

    /// Inline text
    pub fn text(data: impl Into<String>) -> Self {
        Self {
            kind: TEXT_EXT.to_string(),
            data: data.into(),
        }
    }

    /// Sentinel for an empty selection
    pub fn no_data() -> Self {
        Self::text(NO_DATA_MESSAGE)
    }

    /// Nothing to display
    pub fn blank() -> Self {
        Self::text("")
    }

    /// Serialize to the JSON wire form
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
