//! Timestamped progress log kept on each Logic.
//!
//! Every entry is one line: `<local timestamp> <message>\n`. Each append is
//! persisted on its own, independent of the surrounding prep.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::domain::Logic;
use crate::error::LogicError;
use crate::store::LogicStore;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// How much of the state log to keep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateRetention {
    /// Never drop entries
    #[default]
    Unbounded,

    /// Keep only the newest `n` entries
    KeepLast(usize),
}

impl StateRetention {
    /// Drop the oldest lines of `state` beyond the retention limit
    fn apply(self, state: &mut String) {
        let StateRetention::KeepLast(limit) = self else {
            return;
        };

        let lines = state.lines().count();
        if lines <= limit {
            return;
        }

        let kept: String = state
            .lines()
            .skip(lines - limit)
            .map(|line| format!("{}\n", line))
            .collect();
        *state = kept;
    }
}

/// Appends entries to `Logic::state`
#[derive(Debug, Clone, Copy, Default)]
pub struct StateLog {
    retention: StateRetention,
}

impl StateLog {
    pub fn new(retention: StateRetention) -> Self {
        Self { retention }
    }

    /// Append a timestamped message and persist the Logic
    pub async fn append<S>(
        &self,
        store: &S,
        logic: &mut Logic,
        message: &str,
    ) -> Result<(), LogicError>
    where
        S: LogicStore + ?Sized,
    {
        self.append_at(logic, Local::now(), message);
        store.save_logic(logic).await
    }

    /// Append without persisting, at an explicit time
    pub fn append_at<Tz: TimeZone>(&self, logic: &mut Logic, at: DateTime<Tz>, message: &str) {
        logic.state.push_str(&format_entry(&at.naive_local(), message));
        self.retention.apply(&mut logic.state);
    }
}

/// Render one state line
pub fn format_entry(at: &NaiveDateTime, message: &str) -> String {
    format!("{} {}\n", at.format(TIMESTAMP_FORMAT), message)
}

/// Split a state line into its timestamp and message
pub fn parse_entry(line: &str) -> Option<(NaiveDateTime, &str)> {
    let mut parts = line.splitn(3, ' ');
    let date = parts.next()?;
    let time = parts.next()?;
    let message = parts.next().unwrap_or_default();

    let at = NaiveDateTime::parse_from_str(&format!("{} {}", date, time), "%Y-%m-%d %H:%M:%S%.f")
        .ok()?;
    Some((at, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_micro_opt(9, 30, second, 250)
            .unwrap()
    }

    #[test]
    fn test_format_entry() {
        assert_eq!(
            format_entry(&at(5), "media_prep started."),
            "2024-05-01 09:30:05.000250 media_prep started.\n"
        );
    }

    #[test]
    fn test_parse_entry_round_trip() {
        let line = format_entry(&at(7), "text_prep finished.");
        let (parsed, message) = parse_entry(line.trim_end()).unwrap();
        assert_eq!(parsed, at(7));
        assert_eq!(message, "text_prep finished.");

        assert!(parse_entry("garbage").is_none());
    }

    #[test]
    fn test_unbounded_retention_keeps_everything() {
        let log = StateLog::default();
        let mut logic = Logic::new(1, "blank");
        for i in 0..50 {
            log.append_at(&mut logic, Local::now(), &format!("entry {}", i));
        }
        assert_eq!(logic.state.lines().count(), 50);
    }

    #[test]
    fn test_keep_last_retention() {
        let log = StateLog::new(StateRetention::KeepLast(2));
        let mut logic = Logic::new(1, "blank");
        for i in 0..5 {
            log.append_at(&mut logic, Local::now(), &format!("entry {}", i));
        }

        let messages: Vec<_> = logic
            .state
            .lines()
            .filter_map(parse_entry)
            .map(|(_, m)| m.to_string())
            .collect();
        assert_eq!(messages, vec!["entry 3", "entry 4"]);
        assert!(logic.state.ends_with('\n'));
    }
}
