use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use detailops_core::{DomainError, DomainResult};

/// Severity tier of a reported issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// One reported vehicle-part issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotspot {
    pub part: String,
    pub issue: String,
    pub severity: Severity,
}

/// Condition report keyed by part.
///
/// Re-reporting a part replaces the prior entry for that part — the report
/// never holds two issues for the same part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotspotReport {
    entries: BTreeMap<String, Hotspot>,
}

impl HotspotReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(
        &mut self,
        part: impl Into<String>,
        issue: impl Into<String>,
        severity: Severity,
    ) -> DomainResult<()> {
        let part = part.into();
        let issue = issue.into();
        if part.trim().is_empty() {
            return Err(DomainError::validation("hotspot part must not be empty"));
        }
        if issue.trim().is_empty() {
            return Err(DomainError::validation("hotspot issue must not be empty"));
        }

        self.entries.insert(
            part.clone(),
            Hotspot {
                part,
                issue,
                severity,
            },
        );
        Ok(())
    }

    pub fn get(&self, part: &str) -> Option<&Hotspot> {
        self.entries.get(part)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by part name (deterministic).
    pub fn entries(&self) -> impl Iterator<Item = &Hotspot> {
        self.entries.values()
    }

    pub fn into_entries(self) -> Vec<Hotspot> {
        self.entries.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_reporting_a_part_replaces_the_entry() {
        let mut report = HotspotReport::new();
        report
            .report("front-bumper", "stone chips", Severity::Low)
            .unwrap();
        report
            .report("front-bumper", "deep scratch", Severity::High)
            .unwrap();

        assert_eq!(report.len(), 1);
        let entry = report.get("front-bumper").unwrap();
        assert_eq!(entry.issue, "deep scratch");
        assert_eq!(entry.severity, Severity::High);
    }

    #[test]
    fn distinct_parts_accumulate() {
        let mut report = HotspotReport::new();
        report.report("hood", "swirl marks", Severity::Medium).unwrap();
        report.report("roof", "oxidation", Severity::High).unwrap();
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn blank_part_or_issue_is_rejected() {
        let mut report = HotspotReport::new();
        assert!(report.report("", "scratch", Severity::Low).is_err());
        assert!(report.report("door", "  ", Severity::Low).is_err());
        assert!(report.is_empty());
    }
}
