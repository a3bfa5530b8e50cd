use core::str::FromStr;

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use detailops_core::DomainError;

/// Named time-range token selecting the reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Day => "day",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Quarter => "quarter",
            TimeRange::Year => "year",
        }
    }

    /// Half-open window `[start, now)` ending at `now`.
    pub fn window_ending(self, now: DateTime<Utc>) -> Window {
        let start = match self {
            TimeRange::Day => now - Duration::days(1),
            TimeRange::Week => now - Duration::days(7),
            TimeRange::Month => now - Months::new(1),
            TimeRange::Quarter => now - Months::new(3),
            TimeRange::Year => now - Months::new(12),
        };
        Window { start, end: now }
    }
}

impl FromStr for TimeRange {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(TimeRange::Day),
            "week" => Ok(TimeRange::Week),
            "month" => Ok(TimeRange::Month),
            "quarter" => Ok(TimeRange::Quarter),
            "year" => Ok(TimeRange::Year),
            other => Err(DomainError::validation(format!(
                "unknown time range '{other}' (expected day|week|month|quarter|year)"
            ))),
        }
    }
}

impl core::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open time window `[start, end)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t < self.end
    }

    /// The equal-length window immediately before this one.
    pub fn previous(&self) -> Window {
        let len = self.end - self.start;
        Window {
            start: self.start - len,
            end: self.start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn week_window_spans_seven_days() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let w = TimeRange::Week.window_ending(now);
        assert_eq!(w.end - w.start, Duration::days(7));
        assert!(w.contains(now - Duration::days(3)));
        assert!(!w.contains(now));
    }

    #[test]
    fn previous_window_is_adjacent_and_equal_length() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let w = TimeRange::Month.window_ending(now);
        let prev = w.previous();
        assert_eq!(prev.end, w.start);
        assert_eq!(prev.end - prev.start, w.end - w.start);
    }

    #[test]
    fn parses_all_tokens() {
        for (s, expected) in [
            ("day", TimeRange::Day),
            ("week", TimeRange::Week),
            ("month", TimeRange::Month),
            ("quarter", TimeRange::Quarter),
            ("year", TimeRange::Year),
        ] {
            assert_eq!(s.parse::<TimeRange>().unwrap(), expected);
        }
        assert!("fortnight".parse::<TimeRange>().is_err());
    }
}
