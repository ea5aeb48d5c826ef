//! Transform execution benchmarks.
//!
//! Benchmarks:
//! - Vectorized map over batches of varying row counts
//! - Filter with a selective predicate
//! - Per-row sum of a single array
//! - Sequential fold (the per-element path)

use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, UInt8Array};
use arrow::datatypes::DataType;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use mapfold::types::list_of;
use mapfold::{
    ArgType, ArrayTransform, BoundClosure, Column, ColumnWithType, ClosureColumn, ClosureType,
    RaggedArray, TransformError, TransformPolicy,
};

/// Helper: build a batch of `rows` rows with `row_len` elements each.
fn setup_batch(rows: usize, row_len: usize) -> ColumnWithType {
    let total = rows * row_len;
    let values: ArrayRef = Arc::new(Int64Array::from_iter_values(
        (0..total).map(|i| i as i64 % 97),
    ));
    let ragged = RaggedArray::from_lengths(values, std::iter::repeat(row_len).take(rows))
        .expect("build ragged batch");
    let list: ArrayRef = Arc::new(ragged.to_list().expect("build list"));
    ColumnWithType::new(
        Column::Values(list),
        ArgType::Value(list_of(DataType::Int64)),
        "arr",
    )
}

fn closure_column(closure: BoundClosure) -> ColumnWithType {
    let signature = closure.signature().clone();
    ColumnWithType::new(
        Column::Closure(Arc::new(closure)),
        ArgType::Closure(signature),
        "lambda",
    )
}

fn double_closure() -> BoundClosure {
    BoundClosure::from_fn(
        |columns| {
            let input = columns[0]
                .as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(|| TransformError::ColumnKind("expected Int64".into()))?;
            let doubled: Int64Array = input.iter().map(|v| v.map(|x| x * 2)).collect();
            Ok(Arc::new(doubled) as ArrayRef)
        },
        ClosureType::new(vec![DataType::Int64], DataType::Int64),
    )
}

fn threshold_predicate() -> BoundClosure {
    BoundClosure::from_fn(
        |columns| {
            let input = columns[0]
                .as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(|| TransformError::ColumnKind("expected Int64".into()))?;
            let flags: UInt8Array = input.iter().map(|v| v.map(|x| u8::from(x > 48))).collect();
            Ok(Arc::new(flags) as ArrayRef)
        },
        ClosureType::new(vec![DataType::Int64], DataType::UInt8),
    )
}

fn add_accumulator_closure() -> BoundClosure {
    BoundClosure::from_fn(
        |columns| {
            let element = columns[0]
                .as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(|| TransformError::ColumnKind("expected Int64".into()))?;
            let accumulator = columns[1]
                .as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(|| TransformError::ColumnKind("expected Int64".into()))?;
            let out: Int64Array = element
                .iter()
                .zip(accumulator.iter())
                .map(|(e, a)| Some(e? + a?))
                .collect();
            Ok(Arc::new(out) as ArrayRef)
        },
        ClosureType::new(vec![DataType::Int64, DataType::Int64], DataType::Int64),
    )
}

fn bench_vectorized_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("vectorized_map");
    for rows in [100usize, 1_000, 10_000] {
        let row_len = 8;
        let arguments = vec![closure_column(double_closure()), setup_batch(rows, row_len)];
        let transform = ArrayTransform::new(TransformPolicy::Map);

        group.throughput(Throughput::Elements((rows * row_len) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, &rows| {
            b.iter(|| {
                let result = transform
                    .execute(black_box(&arguments), rows)
                    .expect("map");
                black_box(result)
            });
        });
    }
    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    for rows in [100usize, 1_000, 10_000] {
        let row_len = 8;
        let arguments = vec![
            closure_column(threshold_predicate()),
            setup_batch(rows, row_len),
        ];
        let transform = ArrayTransform::new(TransformPolicy::Filter);

        group.throughput(Throughput::Elements((rows * row_len) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, &rows| {
            b.iter(|| {
                let result = transform
                    .execute(black_box(&arguments), rows)
                    .expect("filter");
                black_box(result)
            });
        });
    }
    group.finish();
}

fn bench_single_array_sum(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_array_sum");
    for rows in [1_000usize, 10_000] {
        let row_len = 16;
        let arguments = vec![setup_batch(rows, row_len)];
        let transform = ArrayTransform::new(TransformPolicy::Sum);

        group.throughput(Throughput::Elements((rows * row_len) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, &rows| {
            b.iter(|| {
                let result = transform
                    .execute(black_box(&arguments), rows)
                    .expect("sum");
                black_box(result)
            });
        });
    }
    group.finish();
}

fn bench_fold(c: &mut Criterion) {
    let mut group = c.benchmark_group("fold");
    // The fold path invokes the closure once per element, so it is
    // benchmarked at smaller scales than the vectorized paths.
    for rows in [10usize, 100] {
        let row_len = 8;
        let initial = ColumnWithType::new(
            Column::Values(Arc::new(Int64Array::from(vec![0i64; rows])) as ArrayRef),
            ArgType::Value(DataType::Int64),
            "initial",
        );
        let arguments = vec![
            closure_column(add_accumulator_closure()),
            setup_batch(rows, row_len),
            initial,
        ];
        let transform = ArrayTransform::new(TransformPolicy::Fold);

        group.throughput(Throughput::Elements((rows * row_len) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, &rows| {
            b.iter(|| {
                let result = transform
                    .execute(black_box(&arguments), rows)
                    .expect("fold");
                black_box(result)
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_vectorized_map,
    bench_filter,
    bench_single_array_sum,
    bench_fold
);
criterion_main!(benches);
