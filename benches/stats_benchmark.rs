use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use vitals_tracker::models::{HealthRecord, HealthStats, RecordType};

/// Records cycling through every type, one per hour.
fn fixture(n: usize) -> Vec<HealthRecord> {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let at = start + Duration::hours(i as i64);
            HealthRecord {
                id: format!("record-{i}"),
                user_id: "bench-user".to_string(),
                record_type: RecordType::ALL[i % RecordType::ALL.len()],
                value: 50.0 + (i % 97) as f64 * 0.5,
                unit: "u".to_string(),
                notes: None,
                recorded_at: at,
                created_at: at,
            }
        })
        .collect()
}

fn benchmark_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("stats_aggregate");

    for size in [100usize, 1_000, 10_000] {
        let records = fixture(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| {
                HealthStats::aggregate(
                    black_box("bench-user"),
                    black_box(RecordType::HeartRate),
                    records,
                )
            })
        });
    }

    group.finish();
}

fn benchmark_decode(c: &mut Criterion) {
    // The miss path decodes every stored record before aggregating
    let encoded: Vec<String> = fixture(1_000)
        .iter()
        .map(|r| serde_json::to_string(r).unwrap())
        .collect();

    c.bench_function("decode_and_aggregate_1000", |b| {
        b.iter(|| {
            let records: Vec<HealthRecord> = encoded
                .iter()
                .filter_map(|raw| serde_json::from_str(black_box(raw)).ok())
                .collect();
            HealthStats::aggregate("bench-user", RecordType::Weight, &records)
        })
    });
}

criterion_group!(benches, benchmark_aggregate, benchmark_decode);
criterion_main!(benches);
