//! Logic records: the configuration that drives content selection.

use serde::{Deserialize, Serialize};

use crate::error::LogicError;

/// Wildcard token accepted by extension and tag filters
pub const WILDCARD: &str = "*";

/// Selector variants a Logic can name in its `implement` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Implementation {
    /// Media files filtered by extension and tag
    Media,

    /// Lines drawn from tagged text media
    Text,

    /// Nothing at all
    Blank,
}

impl Implementation {
    /// Storage name of this variant
    pub fn as_str(self) -> &'static str {
        match self {
            Implementation::Media => "media",
            Implementation::Text => "text",
            Implementation::Blank => "blank",
        }
    }
}

impl std::fmt::Display for Implementation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Implementation {
    type Err = LogicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "media" => Ok(Implementation::Media),
            "text" => Ok(Implementation::Text),
            "blank" => Ok(Implementation::Blank),
            other => Err(LogicError::UnknownImplementation(other.to_string())),
        }
    }
}

/// Order in which selected items are served
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaOrder {
    #[default]
    Sequential,
    Shuffle,
}

impl MediaOrder {
    /// Storage name of this order
    pub fn as_str(self) -> &'static str {
        match self {
            MediaOrder::Sequential => "sequential",
            MediaOrder::Shuffle => "shuffle",
        }
    }

    /// Read a stored order. Anything other than "shuffle" is sequential.
    pub fn from_stored(s: &str) -> Self {
        if s == "shuffle" {
            MediaOrder::Shuffle
        } else {
            MediaOrder::Sequential
        }
    }
}

impl std::fmt::Display for MediaOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MediaOrder {
    type Err = LogicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" => Ok(MediaOrder::Sequential),
            "shuffle" => Ok(MediaOrder::Shuffle),
            _ => Err(LogicError::InvalidMediaOrder(s.to_string())),
        }
    }
}

/// A parsed space-separated filter list (`media_ext`, `media_tag`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterList {
    tokens: Vec<String>,
}

impl FilterList {
    /// Split a raw filter string on whitespace
    pub fn parse(raw: &str) -> Self {
        Self {
            tokens: raw.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Whether the list contains the wildcard token
    pub fn is_wildcard(&self) -> bool {
        self.tokens.iter().any(|t| t == WILDCARD)
    }

    /// Whether `token` appears verbatim in the list
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Wildcard or exact membership
    pub fn accepts(&self, token: &str) -> bool {
        self.is_wildcard() || self.contains(token)
    }

    /// Whether any of `tokens` appears in the list (no wildcard handling)
    pub fn intersects<'a>(&self, mut tokens: impl Iterator<Item = &'a str>) -> bool {
        tokens.any(|t| self.contains(t))
    }

    /// Canonical space-joined form
    pub fn canonical(&self) -> String {
        self.tokens.join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Content selection configuration, plus the prepared selection and state log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Logic {
    /// Primary key
    pub id: i64,

    /// Selector discriminator as stored ("media", "text", "blank")
    pub implement: String,

    /// Space-separated extension filter, "*" matches everything
    #[serde(default)]
    pub media_ext: String,

    /// Space-separated tag filter, "*" matches everything
    #[serde(default)]
    pub media_tag: String,

    /// Serving order of the prepared selection
    #[serde(default)]
    pub media_order: MediaOrder,

    /// Prepared selection: space-separated media ids or text indices
    #[serde(default)]
    pub media_list: String,

    /// Number of entries in `media_list`
    #[serde(default)]
    pub media_count: usize,

    /// Timestamped progress log, one entry per line
    #[serde(default)]
    pub state: String,
}

impl Logic {
    /// Create an unprepared Logic
    pub fn new(id: i64, implement: impl Into<String>) -> Self {
        Self {
            id,
            implement: implement.into(),
            media_ext: WILDCARD.to_string(),
            media_tag: WILDCARD.to_string(),
            media_order: MediaOrder::Sequential,
            media_list: String::new(),
            media_count: 0,
            state: String::new(),
        }
    }

    pub fn with_ext(mut self, ext: impl Into<String>) -> Self {
        self.media_ext = ext.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.media_tag = tag.into();
        self
    }

    pub fn with_order(mut self, order: MediaOrder) -> Self {
        self.media_order = order;
        self
    }

    /// Resolve the stored discriminator into a selector variant
    pub fn implementation(&self) -> Result<Implementation, LogicError> {
        self.implement.parse()
    }

    /// Clear the prepared selection and the state log
    pub fn reset(&mut self) {
        self.media_list.clear();
        self.media_count = 0;
        self.state.clear();
    }

    /// Store a selection, keeping `media_count` in step with `media_list`
    pub fn set_selection<T: ToString>(&mut self, entries: &[T]) {
        self.media_list = entries
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        self.media_count = entries.len();
    }

    /// Tokens of the prepared selection
    pub fn selection(&self) -> Vec<&str> {
        self.media_list.split_whitespace().collect()
    }
}
