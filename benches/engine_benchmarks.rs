//! Performance benchmarks for the aggregation engine
//! Measures the full map/shuffle/reduce pass and the shuffle stage alone

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use demandflow::demand::{demand_engine, DemandMapper};
use demandflow::engine::shuffle_stage;
use demandflow::source::Record;
use std::hint::black_box;

const COUNTRIES: &[&str] = &["United Kingdom", "France", "Germany", "EIRE", "Spain"];

/// Synthetic sales rows spread over 90 days, 50 products and 5 countries
fn create_records(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            let day = 1 + (i % 90) as u32;
            let date = chrono::NaiveDate::from_yo_opt(2011, day)
                .unwrap()
                .format("%Y-%m-%d %H:%M")
                .to_string();
            Record::from_pairs(
                i + 1,
                [
                    ("InvoiceDate", date),
                    ("Country", COUNTRIES[i % COUNTRIES.len()].to_string()),
                    ("Description", format!("PRODUCT {}", i % 50)),
                    ("Quantity", ((i % 12) + 1).to_string()),
                ],
            )
        })
        .collect()
}

fn bench_execute(c: &mut Criterion) {
    let mut group = c.benchmark_group("execute");
    let engine = demand_engine(DemandMapper::default());

    for size in &[1_000, 10_000, 100_000] {
        let records = create_records(*size);
        group.bench_with_input(BenchmarkId::new("demand", size), &records, |b, records| {
            b.iter(|| black_box(engine.execute(records).unwrap()));
        });
    }

    group.finish();
}

fn bench_shuffle(c: &mut Criterion) {
    let mut group = c.benchmark_group("shuffle");

    for keys in &[10usize, 1_000, 50_000] {
        let pairs: Vec<(usize, i64)> = (0..100_000).map(|i| (i % keys, i as i64)).collect();
        group.bench_with_input(BenchmarkId::new("pairs_100k", keys), &pairs, |b, pairs| {
            b.iter(|| black_box(shuffle_stage(pairs.clone())));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_execute, bench_shuffle);
criterion_main!(benches);
