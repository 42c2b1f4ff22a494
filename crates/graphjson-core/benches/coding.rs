//! Benchmarks for encode and decode.
//!
//! Run with: cargo bench --bench coding
//!
//! Covers:
//! - `encode`: identity tracking plus serialization of a graph with heavy sharing
//! - `decode`: parsing the same graph back, resolving references
//! - `encode_unshared`: a tree of the same size with no shared instances
//! - `encode_extensions`: many distinct extension values of one type

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use graphjson_core::{decode, encode, Value};

/// `rows` records that all point at the same handful of long strings and one
/// shared nested mapping.
fn shared_graph(rows: usize) -> Value {
    let owner = Value::text("an owner name comfortably over the threshold");
    let region = Value::mapping([
        ("name", Value::text("a region name that is also long enough")),
        ("code", Value::Int(44)),
    ]);
    Value::sequence((0..rows).map(|i| {
        Value::mapping([
            ("id", Value::Int(i as i64)),
            ("score", Value::Float(i as f64 * 0.5)),
            ("owner", owner.clone()),
            ("region", region.clone()),
            ("tags", Value::sequence([Value::text("a"), Value::text("b")])),
        ])
    }))
}

fn unshared_graph(rows: usize) -> Value {
    Value::sequence((0..rows).map(|i| {
        Value::mapping([
            ("id", Value::Int(i as i64)),
            ("score", Value::Float(i as f64 * 0.5)),
            ("owner", Value::text(format!("owner number {i} with a long name"))),
            ("tags", Value::sequence([Value::text("a"), Value::text("b")])),
        ])
    }))
}

fn extension_graph(rows: usize) -> Value {
    Value::sequence((0..rows).map(|i| {
        Value::mapping([("n", Value::from(i as i32)), ("c", Value::from('x'))])
    }))
}

fn bench_coding(c: &mut Criterion) {
    let mut group = c.benchmark_group("coding");
    for rows in [10, 100, 1000] {
        let shared = shared_graph(rows);
        let text = encode(&shared).unwrap();
        let unshared = unshared_graph(rows);
        let extensions = extension_graph(rows);

        group.bench_with_input(BenchmarkId::new("encode", rows), &shared, |b, value| {
            b.iter(|| encode(black_box(value)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("decode", rows), &text, |b, text| {
            b.iter(|| decode(black_box(text)).unwrap())
        });
        group.bench_with_input(
            BenchmarkId::new("encode_unshared", rows),
            &unshared,
            |b, value| b.iter(|| encode(black_box(value)).unwrap()),
        );
        group.bench_with_input(
            BenchmarkId::new("encode_extensions", rows),
            &extensions,
            |b, value| b.iter(|| encode(black_box(value)).unwrap()),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_coding);
criterion_main!(benches);
