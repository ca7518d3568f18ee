//! Trials: a running session bound to one Logic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A trial run that pulls content from its Logic by sequence number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trial {
    /// Unique identifier for this trial
    pub id: Uuid,

    /// The Logic supplying content
    pub logic_id: i64,

    /// When the trial was created
    pub created_at: DateTime<Utc>,
}

impl Trial {
    /// Create a new trial for a Logic
    pub fn new(logic_id: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            logic_id,
            created_at: Utc::now(),
        }
    }
}
