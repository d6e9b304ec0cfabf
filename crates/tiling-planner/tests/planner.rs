// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: end-to-end planning pipeline.
//!
//! These exercise the complete flow from descriptor construction →
//! validation → strategy resolution → record emission through the public
//! `plan` entry point, proving the crates compose and the probe-then-commit
//! strategy resolution behaves as documented.

use device_profile::{Capacity, DeviceProfile};
use op_descriptor::{
    AttrValue, ElemType, OpKind, OperatorDescriptor, TensorArg, TensorShape, Validated,
};
use tiling_planner::{
    plan, DispatchAxes, ForeachPlan, GroupQuantPlan, PlanErrorKind, MAX_TENSORS,
};

// ── Helpers ────────────────────────────────────────────────────

fn foreach_desc(kind: OpKind, lengths: &[i64], elem: ElemType) -> OperatorDescriptor<Validated> {
    let mut d = OperatorDescriptor::new(kind);
    for (i, &len) in lengths.iter().enumerate() {
        d = d.with_input(TensorArg::new(
            format!("x{i}"),
            TensorShape::vector(len),
            elem,
        ));
    }
    d.validate().expect("descriptor should validate")
}

fn quant_desc(rows: i64, cols: i64, groups: i64) -> OperatorDescriptor<Validated> {
    OperatorDescriptor::new(OpKind::GroupQuant)
        .with_input(TensorArg::new(
            "x",
            TensorShape::matrix(rows, cols),
            ElemType::F16,
        ))
        .with_input(TensorArg::new(
            "scale",
            TensorShape::matrix(groups, cols),
            ElemType::F16,
        ))
        .with_input(TensorArg::new(
            "group_index",
            TensorShape::vector(groups),
            ElemType::I32,
        ))
        .validate()
        .expect("descriptor should validate")
}

fn plan_buf() -> Vec<u8> {
    vec![0u8; 4096]
}

// ── Foreach end-to-end ─────────────────────────────────────────

#[test]
fn test_small_foreach_takes_single_unit_path() {
    let desc = foreach_desc(OpKind::ForeachUnary, &[100, 60, 20], ElemType::F32);
    let mut buf = plan_buf();
    let summary = plan(&desc, &DeviceProfile::edge(), &mut buf).unwrap();

    assert_eq!(summary.strategy, "foreach-single-unit");
    assert_eq!(summary.compute_units_used, 1);
    assert_eq!(summary.workspace_bytes, 32);
}

#[test]
fn test_large_foreach_takes_block_parallel_path() {
    let lengths = vec![1 << 20; 8];
    let desc = foreach_desc(OpKind::ForeachBinaryList, &lengths, ElemType::F32);
    let mut buf = plan_buf();
    let summary = plan(&desc, &DeviceProfile::edge(), &mut buf).unwrap();

    assert_eq!(summary.strategy, "foreach-block-parallel");
    assert_eq!(summary.compute_units_used, 8);
    assert_eq!(summary.workspace_bytes, 32);
}

#[test]
fn test_block_parallel_plans_on_small_staging_devices() {
    // The element-wise kernels keep working data in per-unit scratch and
    // only claim the 32-byte system slot, so tight staging is no obstacle.
    let profile = DeviceProfile::new(8, Capacity::from_kb(128), Capacity::from_mb(1));
    let desc = foreach_desc(OpKind::ForeachUnary, &[1 << 22], ElemType::F32);
    let mut buf = plan_buf();
    let summary = plan(&desc, &profile, &mut buf).unwrap();
    assert_eq!(summary.strategy, "foreach-block-parallel");
    assert_eq!(summary.workspace_bytes, 32);
}

#[test]
fn test_foreach_record_round_trips_through_buffer() {
    let lengths = vec![100, 60, 20];
    let desc = foreach_desc(OpKind::ForeachUnary, &lengths, ElemType::F32);
    let mut buf = plan_buf();
    let summary = plan(&desc, &DeviceProfile::datacenter(), &mut buf).unwrap();

    let decoded = ForeachPlan::decode(&buf[..summary.plan_bytes]).unwrap();
    assert_eq!(decoded.tensor_count, 3);
    assert_eq!(&decoded.tensor_counts[..3], &lengths[..]);
    assert_eq!(decoded.units, summary.compute_units_used);
}

#[test]
fn test_work_split_covers_ragged_workload_exactly() {
    // 3 f32 tensors, 180 elements, 24 eight-element blocks: a scratch
    // budget too small for the single-unit path forces the block-parallel
    // split across all 3 units, cutting tensors 0 and 1 mid-range.
    let profile = DeviceProfile::new(3, Capacity::from_bytes(1536), Capacity::from_mb(48));
    let desc = foreach_desc(OpKind::ForeachUnary, &[100, 60, 20], ElemType::F32);
    let mut buf = plan_buf();
    let summary = plan(&desc, &profile, &mut buf).unwrap();
    assert_eq!(summary.strategy, "foreach-block-parallel");
    assert_eq!(summary.compute_units_used, 3);

    // 8 blocks (64 raw elements) per unit; the trailing unit widens over
    // the block-rounding shortfall.
    let p = ForeachPlan::decode(&buf[..summary.plan_bytes]).unwrap();
    assert_eq!(
        (p.start_tensors[0], p.start_offsets[0], p.end_tensors[0], p.end_offsets[0]),
        (0, 0, 0, 64)
    );
    assert_eq!(
        (p.start_tensors[1], p.start_offsets[1], p.end_tensors[1], p.end_offsets[1]),
        (0, 64, 1, 28)
    );
    assert_eq!(
        (p.start_tensors[2], p.start_offsets[2], p.end_tensors[2], p.end_offsets[2]),
        (1, 28, 2, 20)
    );
}

#[test]
fn test_planning_is_deterministic() {
    let desc = foreach_desc(OpKind::ForeachPointwiseList, &[513, 9, 4096], ElemType::F16);
    let profile = DeviceProfile::datacenter();

    let mut a = plan_buf();
    let mut b = plan_buf();
    let sa = plan(&desc, &profile, &mut a).unwrap();
    let sb = plan(&desc, &profile, &mut b).unwrap();

    assert_eq!(sa, sb);
    assert_eq!(a, b);
}

// ── Group quant end-to-end ─────────────────────────────────────

#[test]
fn test_group_quant_row_split() {
    let desc = quant_desc(96, 1024, 4);
    let mut buf = plan_buf();
    let summary = plan(&desc, &DeviceProfile::datacenter(), &mut buf).unwrap();

    assert_eq!(summary.strategy, "group-quant-row-split");
    assert_eq!(summary.compute_units_used, 48);
    assert_eq!(summary.workspace_bytes, 32);

    let p = GroupQuantPlan::decode(&buf[..summary.plan_bytes]).unwrap();
    assert_eq!(p.rows, 96);
    assert_eq!(p.cols, 1024);
    let covered = i64::from(p.lead_units) * p.rows_lead
        + i64::from(p.units - p.lead_units) * p.rows_tail;
    assert_eq!(covered, 96);
}

#[test]
fn test_single_group_wins_priority_over_row_split() {
    // Both candidates are capable; the lower-priority single-group path
    // must resolve first.
    let desc = quant_desc(96, 1024, 1);
    let mut buf = plan_buf();
    let summary = plan(&desc, &DeviceProfile::datacenter(), &mut buf).unwrap();
    assert_eq!(summary.strategy, "group-quant-single-group");
}

#[test]
fn test_wide_single_group_falls_through_to_row_split() {
    // One scale group, but the row is too wide to keep resident in the
    // edge preset's scratch; the registry must move on to the general
    // row-split candidate rather than commit the fast path.
    let desc = quant_desc(4, 100_000, 1);
    let mut buf = plan_buf();
    let summary = plan(&desc, &DeviceProfile::edge(), &mut buf).unwrap();
    assert_eq!(summary.strategy, "group-quant-row-split");
}

#[test]
fn test_dispatch_key_reflects_descriptor_axes() {
    let desc = quant_desc(8, 64, 2);
    let mut buf = plan_buf();
    let summary = plan(&desc, &DeviceProfile::edge(), &mut buf).unwrap();

    let axes = DispatchAxes::decompose(summary.dispatch_key);
    assert_eq!(axes.elem_class, 1); // f16
    assert!(!axes.has_optional);
    assert_eq!(axes.mode, 0); // int8
}

// ── Failure modes ──────────────────────────────────────────────

#[test]
fn test_workspace_overflow_is_a_capacity_error() {
    // Every foreach plan demands the 32-byte system slot; a device with
    // less shared staging than that cannot host any plan.
    let profile = DeviceProfile::new(8, Capacity::from_kb(128), Capacity::from_bytes(16));
    let desc = foreach_desc(OpKind::ForeachUnary, &[1 << 22], ElemType::F32);
    let mut buf = plan_buf();

    let err = plan(&desc, &profile, &mut buf).unwrap_err();
    assert_eq!(err.kind(), PlanErrorKind::Capacity);
    assert!(err.to_string().contains("staging"));
}

#[test]
fn test_no_strategy_for_oversized_tensor_list() {
    let lengths = vec![8i64; MAX_TENSORS + 1];
    let desc = foreach_desc(OpKind::ForeachUnary, &lengths, ElemType::F16);
    let mut buf = plan_buf();

    let err = plan(&desc, &DeviceProfile::datacenter(), &mut buf).unwrap_err();
    assert_eq!(err.kind(), PlanErrorKind::Capacity);
}

#[test]
fn test_undersized_buffer_rejected_without_partial_write() {
    let desc = foreach_desc(OpKind::ForeachUnary, &[64], ElemType::F32);
    let mut buf = vec![0u8; 16];

    let err = plan(&desc, &DeviceProfile::edge(), &mut buf).unwrap_err();
    assert_eq!(err.kind(), PlanErrorKind::Capacity);
    assert!(buf.iter().all(|&b| b == 0));
}

#[test]
fn test_mixed_element_types_rejected() {
    let desc = OperatorDescriptor::new(OpKind::ForeachBinaryList)
        .with_input(TensorArg::new("a", TensorShape::vector(8), ElemType::F32))
        .with_input(TensorArg::new("b", TensorShape::vector(8), ElemType::F16))
        .validate()
        .unwrap();
    let mut buf = plan_buf();

    let err = plan(&desc, &DeviceProfile::edge(), &mut buf).unwrap_err();
    assert_eq!(err.kind(), PlanErrorKind::Validation);
}

#[test]
fn test_int4_odd_columns_rejected() {
    let desc = OperatorDescriptor::new(OpKind::GroupQuant)
        .with_input(TensorArg::new(
            "x",
            TensorShape::matrix(4, 63),
            ElemType::F32,
        ))
        .with_input(TensorArg::new(
            "scale",
            TensorShape::matrix(1, 63),
            ElemType::F32,
        ))
        .with_input(TensorArg::new(
            "group_index",
            TensorShape::vector(1),
            ElemType::I32,
        ))
        .with_attr("dst_type", AttrValue::Str("int4".into()))
        .validate()
        .unwrap();
    let mut buf = plan_buf();

    let err = plan(&desc, &DeviceProfile::edge(), &mut buf).unwrap_err();
    assert_eq!(err.kind(), PlanErrorKind::Validation);
}

#[test]
fn test_invalid_profile_rejected() {
    let profile = DeviceProfile::new(0, Capacity::from_kb(128), Capacity::from_mb(48));
    let desc = foreach_desc(OpKind::ForeachUnary, &[8], ElemType::F32);
    let mut buf = plan_buf();

    let err = plan(&desc, &profile, &mut buf).unwrap_err();
    assert_eq!(err.kind(), PlanErrorKind::Validation);
}
