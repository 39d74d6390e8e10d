//! Performance benchmarks for Spark2Scale.
//!
//! Measures document aggregation over realistic and oversized document sets.
//!
//! Run with: `cargo bench`

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use spark2scale::{aggregate, DocumentRecord, VersionRecord};

// ============================================================================
// Mock Data Fixtures
// ============================================================================

mod fixtures {
    use super::*;

    const TYPES: [&str; 6] =
        ["Financials", "Legal Docs", "Pitch Deck", "Evaluation Report", "Market Research", "Cap Table"];

    /// Generate `count` records spread over a handful of types, each with a
    /// few versions and some versions repeated across records.
    pub fn records(count: usize, versions_per_record: usize) -> Vec<DocumentRecord> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        (0..count)
            .map(|i| {
                let versions = (0..versions_per_record)
                    .map(|v| VersionRecord {
                        // Every third record re-lists its predecessor's first version.
                        id: if i % 3 == 0 && v == 0 && i > 0 {
                            format!("v-{}-0", i - 1)
                        } else {
                            format!("v-{i}-{v}")
                        },
                        version_number: v as i64 + 1,
                        path: format!("https://files.example/{i}/{v}"),
                        created_at: base + Duration::minutes((i * versions_per_record + v) as i64),
                        generated_by: "founder".to_string(),
                    })
                    .collect();

                DocumentRecord {
                    id: format!("doc-{i}"),
                    owner_type: TYPES[i % TYPES.len()].to_string(),
                    name: format!("doc-{i}.pdf"),
                    path: format!("https://files.example/doc-{i}.pdf"),
                    updated_at: base + Duration::hours(i as i64),
                    is_current: true,
                    versions,
                }
            })
            .collect()
    }
}

// ============================================================================
// Aggregation Benchmarks
// ============================================================================

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for count in [10, 100, 1_000] {
        let records = fixtures::records(count, 5);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &records, |b, records| {
            b.iter(|| aggregate(black_box(records.clone())).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_aggregate);
criterion_main!(benches);
