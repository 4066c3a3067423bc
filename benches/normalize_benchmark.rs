//! Performance benchmarks for result normalization and rendering
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use extraction_wizard::api::ExtractionResult;
use extraction_wizard::results::{canonical_fields, render, ResultTable};
use serde_json::{json, Map, Value};

/// Synthetic result set: mostly shared keys, a few per-document extras,
/// line-item arrays and one failure in every ten documents.
fn sample_results(count: usize) -> Vec<ExtractionResult> {
    (0..count)
        .map(|i| {
            if i % 10 == 9 {
                return ExtractionResult::failure(format!("doc-{}.pdf", i), "Unreadable");
            }
            let line_items: Vec<Value> = (0..5)
                .map(|n| json!({"sku": format!("S{}", n), "qty": n + 1}))
                .collect();
            let mut data = Map::new();
            data.insert("company_name".into(), json!(format!("Supplier {}", i)));
            data.insert("quotation_number".into(), json!(format!("Q-{:05}", i)));
            data.insert("date".into(), json!("2026-03-01"));
            data.insert("total_amount".into(), json!(1000.0 + i as f64));
            data.insert(
                "validity".into(),
                json!({"start": "2026-03-01", "end": "2026-04-01"}),
            );
            data.insert("line_items".into(), Value::Array(line_items));
            data.insert(format!("extra_{}", i % 7), json!(i));
            ExtractionResult::success(format!("doc-{}.pdf", i), data)
        })
        .collect()
}

/// Benchmark canonical field ordering across result sets of growing size
fn bench_canonical_fields(c: &mut Criterion) {
    let mut group = c.benchmark_group("canonical_fields");

    for count in [10, 100, 1000] {
        let results = sample_results(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_docs", count)),
            &results,
            |b, results| {
                b.iter(|| canonical_fields(black_box(results)));
            },
        );
    }

    group.finish();
}

/// Benchmark rendering every cell of the field-major table
fn bench_table_cells(c: &mut Criterion) {
    let results = sample_results(100);

    c.bench_function("table_cells_100_docs", |b| {
        b.iter(|| {
            let table = ResultTable::new(black_box(&results));
            let mut chars = 0;
            for field in table.fields() {
                for column in table.columns() {
                    chars += table.cell(column.index, &field.name).text.len();
                }
            }
            chars
        });
    });
}

/// Benchmark value rendering by shape
fn bench_render(c: &mut Criterion) {
    let values = [
        ("text", json!("ACME Industrial Supplies Ltd")),
        ("range", json!({"start": "2026-03-01", "end": "2026-04-01"})),
        ("error", json!({"error": "Timeout", "details": "model did not answer"})),
        (
            "records",
            json!((0..20).map(|n| json!({"sku": format!("S{}", n), "qty": n})).collect::<Vec<_>>()),
        ),
    ];

    let mut group = c.benchmark_group("render");
    for (name, value) in &values {
        group.bench_with_input(BenchmarkId::from_parameter(name), value, |b, value| {
            b.iter(|| render(black_box(value)).to_inline());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_canonical_fields, bench_table_cells, bench_render);
criterion_main!(benches);
