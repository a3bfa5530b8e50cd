//! `detailops-analytics` — pure report aggregation.
//!
//! Consumes row snapshots (no storage access) and reduces them into the
//! dashboard report: totals, trends vs the preceding window, per-day series
//! and per-service breakdowns.

pub mod report;
pub mod rows;
pub mod time_range;
pub mod trend;

pub use report::{
    AcquisitionPoint, AnalyticsOverview, AnalyticsReport, DatePoint, NamedValue, RatingCount,
    ServicePerformance, build_overview, build_report,
};
pub use rows::{ClientRecord, FeedbackRecord, InvoiceRecord, JobRecord};
pub use time_range::{TimeRange, Window};
pub use trend::calculate_trend;
