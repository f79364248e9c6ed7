//! Basic benchmarks for the `opaque_dynarray` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use new_zealand::nz;
use opaque_dynarray::OpaqueDynArray;

criterion_group!(benches, entrypoint);
criterion_main!(benches);

const TEST_VALUE: [u8; 8] = 1024_u64.to_ne_bytes();
const ARRAY_LEN: usize = 1000;

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("opaque_dynarray_basic");

    group.bench_function("new", |b| {
        b.iter(|| OpaqueDynArray::new(black_box(ARRAY_LEN), nz!(8)).unwrap());
    });

    group.bench_function("push_from_empty", |b| {
        b.iter(|| {
            let mut array = OpaqueDynArray::new(0, nz!(8)).unwrap();

            for _ in 0..ARRAY_LEN {
                array.push(black_box(&TEST_VALUE)).unwrap();
            }

            array
        });
    });

    group.bench_function("insert_at_head", |b| {
        b.iter_batched_ref(
            || {
                // Leave spare capacity so we measure the in-place shift, not the growth.
                let mut array = OpaqueDynArray::new(ARRAY_LEN, nz!(8)).unwrap();
                array.delete(0).unwrap();
                array
            },
            |array| array.insert(0, black_box(&TEST_VALUE)).unwrap(),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("delete_at_head", |b| {
        b.iter_batched_ref(
            || OpaqueDynArray::new(ARRAY_LEN, nz!(8)).unwrap(),
            |array| array.delete(0).unwrap(),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("get", |b| {
        let array = OpaqueDynArray::new(ARRAY_LEN, nz!(8)).unwrap();
        let mut buffer = [0; 8];

        b.iter(|| {
            array
                .get(black_box(ARRAY_LEN / 2), black_box(&mut buffer))
                .unwrap();
        });
    });

    group.finish();
}
