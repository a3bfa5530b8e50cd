//! Single-pass report reductions.
//!
//! Grouping keys are date strings (`YYYY-MM-DD`) or service names; grouped
//! series are returned sorted by key for presentation stability.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::rows::{ClientRecord, FeedbackRecord, InvoiceRecord, JobRecord};
use crate::time_range::{TimeRange, Window};
use crate::trend::calculate_trend;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatePoint {
    pub date: String,
    /// Revenue in smallest currency unit (e.g., cents).
    pub revenue: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionPoint {
    pub date: String,
    pub new_clients: u32,
    pub returning_clients: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicePerformance {
    pub name: String,
    pub revenue: u64,
    pub growth: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingCount {
    pub rating: u8,
    pub count: u32,
}

/// Detailed dashboard report for one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub total_revenue: u64,
    pub revenue_trend: f64,
    pub new_clients: u32,
    pub clients_trend: f64,
    pub average_job_value: f64,
    pub job_value_trend: f64,
    pub customer_satisfaction: f64,
    pub satisfaction_trend: f64,
    pub active_clients: u32,
    pub pending_invoices: u32,
    pub completed_jobs: u32,
    pub revenue_over_time: Vec<DatePoint>,
    pub services_breakdown: Vec<NamedValue>,
    pub client_acquisition_retention: Vec<AcquisitionPoint>,
    pub top_services: Vec<ServicePerformance>,
    pub feedback_histogram: Vec<RatingCount>,
}

/// Compact dashboard summary (totals + six-month revenue series).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsOverview {
    pub total_revenue: u64,
    pub active_clients: u32,
    pub pending_invoices: u32,
    pub completed_jobs: u32,
    pub revenue_data: Vec<DatePoint>,
}

const TOP_SERVICES: usize = 5;

fn date_key(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d").to_string()
}

fn month_key(t: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", t.year(), t.month())
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Build the detailed report for the window ending at `now`.
///
/// Rows may span any period; the reduction windows them itself, including the
/// equal-length preceding window used for trend figures.
pub fn build_report(
    now: DateTime<Utc>,
    range: TimeRange,
    clients: &[ClientRecord],
    invoices: &[InvoiceRecord],
    jobs: &[JobRecord],
    feedback: &[FeedbackRecord],
) -> AnalyticsReport {
    let window = range.window_ending(now);
    let previous = window.previous();

    let in_window = |t: DateTime<Utc>, w: &Window| w.contains(t);

    // Revenue.
    let revenue_in = |w: &Window| -> u64 {
        invoices
            .iter()
            .filter(|i| in_window(i.date, w))
            .map(|i| i.amount)
            .sum()
    };
    let total_revenue = revenue_in(&window);
    let revenue_trend = calculate_trend(total_revenue as f64, revenue_in(&previous) as f64);

    // Client acquisition.
    let clients_in = |w: &Window| -> u32 {
        clients.iter().filter(|c| in_window(c.created_at, w)).count() as u32
    };
    let new_clients = clients_in(&window);
    let clients_trend = calculate_trend(new_clients as f64, clients_in(&previous) as f64);

    // Job value.
    let job_value_in = |w: &Window| -> f64 {
        mean(
            jobs.iter()
                .filter(|j| in_window(j.date, w))
                .map(|j| j.amount as f64),
        )
    };
    let average_job_value = job_value_in(&window);
    let job_value_trend = calculate_trend(average_job_value, job_value_in(&previous));

    // Satisfaction.
    let satisfaction_in = |w: &Window| -> f64 {
        mean(
            feedback
                .iter()
                .filter(|f| in_window(f.date, w))
                .map(|f| f.rating),
        )
    };
    let customer_satisfaction = satisfaction_in(&window);
    let satisfaction_trend = calculate_trend(customer_satisfaction, satisfaction_in(&previous));

    // Counts.
    let active_clients = clients.iter().filter(|c| c.active).count() as u32;
    let pending_invoices = invoices
        .iter()
        .filter(|i| i.pending && in_window(i.date, &window))
        .count() as u32;
    let completed_jobs = jobs
        .iter()
        .filter(|j| j.completed && in_window(j.date, &window))
        .count() as u32;

    // Revenue over time: one summed entry per distinct date, ascending.
    let mut revenue_by_date: BTreeMap<String, u64> = BTreeMap::new();
    for invoice in invoices.iter().filter(|i| in_window(i.date, &window)) {
        *revenue_by_date.entry(date_key(invoice.date)).or_default() += invoice.amount;
    }
    let revenue_over_time = revenue_by_date
        .into_iter()
        .map(|(date, revenue)| DatePoint { date, revenue })
        .collect();

    // Services breakdown (in-window revenue per service name).
    let mut by_service: BTreeMap<String, u64> = BTreeMap::new();
    for job in jobs.iter().filter(|j| in_window(j.date, &window)) {
        *by_service.entry(job.service_name.clone()).or_default() += job.amount;
    }
    let services_breakdown: Vec<NamedValue> = by_service
        .iter()
        .map(|(name, value)| NamedValue {
            name: name.clone(),
            value: *value,
        })
        .collect();

    // Acquisition/retention per day (all clients, new vs returning relative
    // to the window start).
    let mut acquisition: BTreeMap<String, (u32, u32)> = BTreeMap::new();
    for client in clients {
        let entry = acquisition.entry(date_key(client.created_at)).or_default();
        if client.created_at >= window.start {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }
    let client_acquisition_retention = acquisition
        .into_iter()
        .map(|(date, (new_clients, returning_clients))| AcquisitionPoint {
            date,
            new_clients,
            returning_clients,
        })
        .collect();

    // Top services by in-window revenue, with growth vs the previous window.
    let mut top_services: Vec<ServicePerformance> = by_service
        .into_iter()
        .map(|(name, revenue)| {
            let previous_revenue: u64 = jobs
                .iter()
                .filter(|j| j.service_name == name && in_window(j.date, &previous))
                .map(|j| j.amount)
                .sum();
            ServicePerformance {
                growth: calculate_trend(revenue as f64, previous_revenue as f64),
                name,
                revenue,
            }
        })
        .collect();
    top_services.sort_by(|a, b| b.revenue.cmp(&a.revenue).then(a.name.cmp(&b.name)));
    top_services.truncate(TOP_SERVICES);

    // Rating histogram (rounded ratings, ascending).
    let mut histogram: BTreeMap<u8, u32> = BTreeMap::new();
    for fb in feedback.iter().filter(|f| in_window(f.date, &window)) {
        let rating = fb.rating.round().clamp(0.0, u8::MAX as f64) as u8;
        *histogram.entry(rating).or_default() += 1;
    }
    let feedback_histogram = histogram
        .into_iter()
        .map(|(rating, count)| RatingCount { rating, count })
        .collect();

    AnalyticsReport {
        total_revenue,
        revenue_trend,
        new_clients,
        clients_trend,
        average_job_value,
        job_value_trend,
        customer_satisfaction,
        satisfaction_trend,
        active_clients,
        pending_invoices,
        completed_jobs,
        revenue_over_time,
        services_breakdown,
        client_acquisition_retention,
        top_services,
        feedback_histogram,
    }
}

/// Build the compact dashboard overview: lifetime totals plus a monthly
/// revenue series for the six months ending at `now` (oldest first).
pub fn build_overview(
    now: DateTime<Utc>,
    clients: &[ClientRecord],
    invoices: &[InvoiceRecord],
    jobs: &[JobRecord],
) -> AnalyticsOverview {
    let total_revenue = invoices.iter().map(|i| i.amount).sum();
    let active_clients = clients.iter().filter(|c| c.active).count() as u32;
    let pending_invoices = invoices.iter().filter(|i| i.pending).count() as u32;
    let completed_jobs = jobs.iter().filter(|j| j.completed).count() as u32;

    let revenue_data = (0..6u32)
        .rev()
        .map(|back| {
            let month = now - Months::new(back);
            let key = month_key(month);
            let revenue = invoices
                .iter()
                .filter(|i| month_key(i.date) == key)
                .map(|i| i.amount)
                .sum();
            DatePoint { date: key, revenue }
        })
        .collect();

    AnalyticsOverview {
        total_revenue,
        active_clients,
        pending_invoices,
        completed_jobs,
        revenue_data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn invoice(days_ago: i64, amount: u64) -> InvoiceRecord {
        InvoiceRecord {
            date: now() - Duration::days(days_ago),
            amount,
            pending: false,
        }
    }

    fn job(days_ago: i64, amount: u64, service: &str) -> JobRecord {
        JobRecord {
            date: now() - Duration::days(days_ago),
            amount,
            service_name: service.to_string(),
            completed: true,
        }
    }

    #[test]
    fn revenue_over_time_is_sorted_and_summed_per_date() {
        let invoices = vec![
            invoice(1, 30_00),
            invoice(3, 10_00),
            invoice(1, 20_00),
            invoice(5, 40_00),
        ];
        let report = build_report(now(), TimeRange::Week, &[], &invoices, &[], &[]);

        let dates: Vec<&str> = report
            .revenue_over_time
            .iter()
            .map(|p| p.date.as_str())
            .collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);

        // Three distinct dates; the two same-day invoices are summed.
        assert_eq!(report.revenue_over_time.len(), 3);
        let day1 = date_key(now() - Duration::days(1));
        let merged = report
            .revenue_over_time
            .iter()
            .find(|p| p.date == day1)
            .unwrap();
        assert_eq!(merged.revenue, 50_00);
        assert_eq!(report.total_revenue, 100_00);
    }

    #[test]
    fn revenue_trend_compares_against_the_preceding_window() {
        // Current week: 120, previous week: 100 -> +20%.
        let invoices = vec![invoice(2, 120), invoice(9, 100)];
        let report = build_report(now(), TimeRange::Week, &[], &invoices, &[], &[]);
        assert_eq!(report.total_revenue, 120);
        assert_eq!(report.revenue_trend, 20.0);
    }

    #[test]
    fn empty_inputs_produce_zeroed_report_without_nans() {
        let report = build_report(now(), TimeRange::Month, &[], &[], &[], &[]);
        assert_eq!(report.total_revenue, 0);
        assert_eq!(report.revenue_trend, 0.0);
        assert_eq!(report.average_job_value, 0.0);
        assert_eq!(report.customer_satisfaction, 0.0);
        assert!(report.satisfaction_trend.is_finite());
        assert!(report.revenue_over_time.is_empty());
    }

    #[test]
    fn top_services_are_capped_at_five_and_ranked_by_revenue() {
        let jobs: Vec<JobRecord> = (0..7)
            .map(|i| job(1, (i as u64 + 1) * 10_00, &format!("service-{i}")))
            .collect();
        let report = build_report(now(), TimeRange::Week, &[], &[], &jobs, &[]);

        assert_eq!(report.top_services.len(), 5);
        assert_eq!(report.top_services[0].name, "service-6");
        assert!(
            report
                .top_services
                .windows(2)
                .all(|w| w[0].revenue >= w[1].revenue)
        );
    }

    #[test]
    fn service_growth_uses_the_previous_window() {
        let jobs = vec![job(2, 150_00, "ceramic"), job(9, 100_00, "ceramic")];
        let report = build_report(now(), TimeRange::Week, &[], &[], &jobs, &[]);

        let ceramic = report
            .top_services
            .iter()
            .find(|s| s.name == "ceramic")
            .unwrap();
        assert_eq!(ceramic.revenue, 150_00);
        assert_eq!(ceramic.growth, 50.0);
    }

    #[test]
    fn acquisition_marks_pre_window_clients_as_returning() {
        let clients = vec![
            ClientRecord {
                created_at: now() - Duration::days(2),
                active: true,
            },
            ClientRecord {
                created_at: now() - Duration::days(30),
                active: true,
            },
        ];
        let report = build_report(now(), TimeRange::Week, &clients, &[], &[], &[]);

        assert_eq!(report.new_clients, 1);
        let new_total: u32 = report
            .client_acquisition_retention
            .iter()
            .map(|p| p.new_clients)
            .sum();
        let returning_total: u32 = report
            .client_acquisition_retention
            .iter()
            .map(|p| p.returning_clients)
            .sum();
        assert_eq!(new_total, 1);
        assert_eq!(returning_total, 1);
    }

    #[test]
    fn feedback_histogram_rounds_ratings() {
        let feedback = vec![
            FeedbackRecord {
                date: now() - Duration::days(1),
                rating: 4.4,
            },
            FeedbackRecord {
                date: now() - Duration::days(1),
                rating: 4.6,
            },
            FeedbackRecord {
                date: now() - Duration::days(2),
                rating: 2.0,
            },
        ];
        let report = build_report(now(), TimeRange::Week, &[], &[], &[], &feedback);

        assert_eq!(
            report.feedback_histogram,
            vec![
                RatingCount { rating: 2, count: 1 },
                RatingCount { rating: 4, count: 1 },
                RatingCount { rating: 5, count: 1 },
            ]
        );
    }

    #[test]
    fn overview_builds_six_month_series_oldest_first() {
        let invoices = vec![invoice(0, 70_00), invoice(40, 30_00)];
        let overview = build_overview(now(), &[], &invoices, &[]);

        assert_eq!(overview.revenue_data.len(), 6);
        assert_eq!(overview.total_revenue, 100_00);
        assert_eq!(overview.revenue_data[5].date, "2025-06");
        assert_eq!(overview.revenue_data[5].revenue, 70_00);
        assert_eq!(overview.revenue_data[4].date, "2025-05");
        assert_eq!(overview.revenue_data[4].revenue, 30_00);
        assert_eq!(overview.revenue_data[0].date, "2025-01");
    }
}
