// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for the ragged partitioner and the full planning path.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use device_profile::DeviceProfile;
use op_descriptor::{ElemType, OpKind, OperatorDescriptor, TensorArg, TensorShape};
use tiling_planner::partition_ragged;

fn ragged_lengths(n: usize) -> Vec<i64> {
    // Deterministic ragged mix of tiny and large tensors.
    (0..n).map(|i| 1 + ((i as i64 * 2654435761) % 9973)).collect()
}

fn bench_partition_ragged(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition_ragged");
    for &n in &[8usize, 64, 256] {
        let lengths = ragged_lengths(n);
        group.bench_function(format!("{n}_tensors_64_units"), |b| {
            b.iter(|| partition_ragged(black_box(&lengths), 64, 8).unwrap())
        });
    }
    group.finish();
}

fn bench_plan_end_to_end(c: &mut Criterion) {
    let mut desc = OperatorDescriptor::new(OpKind::ForeachBinaryList);
    for (i, &len) in ragged_lengths(64).iter().enumerate() {
        desc = desc.with_input(TensorArg::new(
            format!("x{i}"),
            TensorShape::vector(len),
            ElemType::F16,
        ));
    }
    let desc = desc.validate().unwrap();
    let profile = DeviceProfile::datacenter();
    let mut buf = vec![0u8; 4096];

    c.bench_function("plan_foreach_64_tensors", |b| {
        b.iter(|| tiling_planner::plan(black_box(&desc), &profile, &mut buf).unwrap())
    });
}

criterion_group!(benches, bench_partition_ragged, bench_plan_end_to_end);
criterion_main!(benches);
