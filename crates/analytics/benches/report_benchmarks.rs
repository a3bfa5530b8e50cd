use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::{Duration, TimeZone, Utc};
use detailops_analytics::{
    ClientRecord, FeedbackRecord, InvoiceRecord, JobRecord, TimeRange, build_report,
};

fn fixture(rows: usize) -> (Vec<ClientRecord>, Vec<InvoiceRecord>, Vec<JobRecord>, Vec<FeedbackRecord>) {
    let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
    let services = ["wash", "wax", "interior", "ceramic", "paint", "wheels"];

    let clients = (0..rows)
        .map(|i| ClientRecord {
            created_at: now - Duration::hours(i as i64 % (24 * 60)),
            active: i % 3 != 0,
        })
        .collect();

    let invoices = (0..rows)
        .map(|i| InvoiceRecord {
            date: now - Duration::hours(i as i64 % (24 * 60)),
            amount: (i as u64 % 400 + 1) * 100,
            pending: i % 4 == 0,
        })
        .collect();

    let jobs = (0..rows)
        .map(|i| JobRecord {
            date: now - Duration::hours(i as i64 % (24 * 60)),
            amount: (i as u64 % 250 + 1) * 100,
            service_name: services[i % services.len()].to_string(),
            completed: i % 5 != 0,
        })
        .collect();

    let feedback = (0..rows)
        .map(|i| FeedbackRecord {
            date: now - Duration::hours(i as i64 % (24 * 60)),
            rating: (i % 5) as f64 + 0.5,
        })
        .collect();

    (clients, invoices, jobs, feedback)
}

fn bench_build_report(c: &mut Criterion) {
    let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
    let mut group = c.benchmark_group("build_report");

    for rows in [100usize, 1_000, 10_000] {
        let (clients, invoices, jobs, feedback) = fixture(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("month", rows), &rows, |b, _| {
            b.iter(|| {
                black_box(build_report(
                    now,
                    TimeRange::Month,
                    black_box(&clients),
                    black_box(&invoices),
                    black_box(&jobs),
                    black_box(&feedback),
                ))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build_report);
criterion_main!(benches);
