use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RangePreset: named filter windows offered by the dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangePreset {
    Today,
    Last7,
    #[default]
    Last30,
    Last90,
}

impl RangePreset {
    /// Resolve a preset name; unknown names fall back to `last30`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "today" => Self::Today,
            "last7" => Self::Last7,
            "last30" => Self::Last30,
            "last90" => Self::Last90,
            _ => Self::default(),
        }
    }

    pub fn days(&self) -> u32 {
        match self {
            Self::Today => 1,
            Self::Last7 => 7,
            Self::Last30 => 30,
            Self::Last90 => 90,
        }
    }

    pub fn range(&self, today: NaiveDate) -> DateRange {
        DateRange::last_days(self.days(), today)
    }
}

// ---------------------------------------------------------------------------
// DateRange: inclusive span of calendar days
// ---------------------------------------------------------------------------

/// Inclusive range of calendar days (`start ..= end`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, swapping the bounds if given in reverse.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    /// The `days` calendar days ending at (and including) `today`.
    ///
    /// `days == 0` is treated as a single day.
    pub fn last_days(days: u32, today: NaiveDate) -> Self {
        let span = i64::from(days.max(1)) - 1;
        Self {
            start: today - Duration::days(span),
            end: today,
        }
    }

    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The equal-length window ending the day before `start`.
    pub fn previous(&self) -> Self {
        let len = self.len_days();
        let end = self.start - Duration::days(1);
        Self {
            start: end - Duration::days(len - 1),
            end,
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}
