//! Pure next-occurrence arithmetic. No clock reads, no I/O: the next due time
//! is always anchored to the previous *scheduled* time, so a daily 09:00
//! reminder stays at 09:00 even when the poller fires late.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use tracing::error;

static CUSTOM_RULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^custom_(\d+)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceRule {
    Daily,
    Weekly,
    CustomDays(u32),
}

impl RecurrenceRule {
    /// Decodes the stored encoding (`daily`, `weekly`, `custom_N`).
    ///
    /// A malformed encoding (unknown word, non-numeric or zero day count) is
    /// logged and yields `None`: the recurrence ends instead of crashing the
    /// poll cycle.
    pub fn decode(raw: &str) -> Option<Self> {
        match raw {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            _ => {
                let days = CUSTOM_RULE
                    .captures(raw)
                    .and_then(|captures| captures[1].parse::<u32>().ok());
                match days {
                    Some(days) if days > 0 => Some(Self::CustomDays(days)),
                    _ => {
                        error!("invalid recurrence rule: {raw}");
                        None
                    }
                }
            }
        }
    }

    pub fn interval_days(self) -> i64 {
        match self {
            Self::Daily => 1,
            Self::Weekly => 7,
            Self::CustomDays(days) => i64::from(days),
        }
    }
}

pub fn next_due(previous: DateTime<Utc>, rule: RecurrenceRule) -> DateTime<Utc> {
    previous + Duration::days(rule.interval_days())
}
