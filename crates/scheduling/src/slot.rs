use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use detailops_core::{DomainError, DomainResult};

/// Half-open time window `[start, end)` of an open appointment slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SlotWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<Self> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.end <= self.start {
            return Err(DomainError::validation(format!(
                "slot end ({}) must be after start ({})",
                self.end, self.start
            )));
        }
        Ok(())
    }

    pub fn overlaps(&self, other: &SlotWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// First existing window that overlaps the candidate, if any.
pub fn find_overlap<'a>(existing: &'a [SlotWindow], candidate: &SlotWindow) -> Option<&'a SlotWindow> {
    existing.iter().find(|w| w.overlaps(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn rejects_inverted_windows() {
        assert!(SlotWindow::new(at(10), at(9)).is_err());
        assert!(SlotWindow::new(at(10), at(10)).is_err());
    }

    #[test]
    fn adjacent_windows_do_not_overlap() {
        let a = SlotWindow::new(at(9), at(10)).unwrap();
        let b = SlotWindow::new(at(10), at(11)).unwrap();
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn partial_and_contained_windows_overlap() {
        let a = SlotWindow::new(at(9), at(11)).unwrap();
        let b = SlotWindow::new(at(10), at(12)).unwrap();
        let inner = SlotWindow {
            start: at(9) + Duration::minutes(15),
            end: at(9) + Duration::minutes(45),
        };
        assert!(a.overlaps(&b));
        assert!(a.overlaps(&inner));
    }

    #[test]
    fn find_overlap_returns_first_conflict() {
        let existing = vec![
            SlotWindow::new(at(8), at(9)).unwrap(),
            SlotWindow::new(at(10), at(11)).unwrap(),
        ];
        let candidate = SlotWindow::new(at(10), at(12)).unwrap();
        assert_eq!(find_overlap(&existing, &candidate), Some(&existing[1]));

        let free = SlotWindow::new(at(12), at(13)).unwrap();
        assert_eq!(find_overlap(&existing, &free), None);
    }
}
