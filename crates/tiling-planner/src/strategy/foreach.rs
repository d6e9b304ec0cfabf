// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Strategies for the ragged foreach family.
//!
//! A foreach invocation applies one element-wise computation across a list
//! of independently sized tensors. The scratch cost model counts the
//! concurrently live operand buffers per flavor — 1 for unary in-place ops,
//! 3 for binary list ops, 5 for pointwise list ops — doubled when the plan
//! overlaps copy-in/compute/copy-out.
//!
//! Two candidates cover the family:
//!
//! | Strategy | Priority | Units | Double buffer |
//! |---|---|---|---|
//! | [`ForeachSingleUnit`] | 0 | 1 | no |
//! | [`ForeachBlockParallel`] | 2 | up to all | yes |
//!
//! The single-unit path exists because per-unit fixed overhead dominates
//! tiny workloads; it only claims inputs whose whole flattened range fits
//! one solved tile.

use crate::partition::{partition_ragged, WorkItem};
use crate::pipeline::{PlanContext, WorkloadView};
use crate::plan::{
    DispatchAxes, PlanReader, PlanRecord, PlanWriter, BYTE_BLOCK, MAX_TENSORS, MAX_UNITS,
};
use crate::solver::{clamp_units, solve_primary_extent, LinearCost, TileParams};
use crate::strategy::{StrategyCandidate, StrategyOutcome};
use crate::PlanError;
use op_descriptor::{ElemType, OpKind};

/// Scratch bytes held back for resident tiling data and spill slots.
const RESERVED_TILING_BYTES: u64 = 1024;

/// Staging footprint of the element-wise foreach kernels: one system
/// slot. The kernels keep all working data in per-unit scratch.
const WORKSPACE_SYSTEM_SLOT: u64 = 32;

/// Concurrently live operand buffers for one flavor.
fn live_buffers(kind: OpKind) -> u64 {
    match kind {
        OpKind::ForeachUnary => 1,
        OpKind::ForeachBinaryList => 3,
        OpKind::ForeachPointwiseList => 5,
        OpKind::GroupQuant => unreachable!("not a foreach kind"),
    }
}

/// Dispatch-key mode axis for one flavor.
fn mode_axis(kind: OpKind) -> u64 {
    match kind {
        OpKind::ForeachUnary => 0,
        OpKind::ForeachBinaryList => 1,
        OpKind::ForeachPointwiseList => 2,
        OpKind::GroupQuant => unreachable!("not a foreach kind"),
    }
}

/// Alignment granularity in elements for a given element width.
fn elements_per_block(elem: ElemType) -> i64 {
    i64::from(BYTE_BLOCK / u32::from(elem.width_bytes()))
}

fn cost_model(kind: OpKind, elem: ElemType, double_buffered: bool) -> LinearCost {
    let db = if double_buffered { 2 } else { 1 };
    LinearCost {
        reserved_bytes: RESERVED_TILING_BYTES,
        bytes_per_extent: live_buffers(kind) * u64::from(elem.width_bytes()) * db,
        align: elements_per_block(elem),
    }
}

// ── Plan record ────────────────────────────────────────────────────

/// Serialized size of a [`ForeachPlan`].
pub const FOREACH_PLAN_BYTES: usize =
    8 * (1 + MAX_TENSORS + 2 * MAX_UNITS) + 4 * (3 + 2 * MAX_UNITS);

/// Fixed-layout record for the foreach family.
///
/// Field order is the wire layout: all `i64` fields first, then the `u32`
/// fields, so natural alignment introduces no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeachPlan {
    /// Elements per tile per unit (per live buffer).
    pub tile_extent: i64,
    /// Element count of each tensor, zero-padded to [`MAX_TENSORS`].
    pub tensor_counts: [i64; MAX_TENSORS],
    /// Per-unit range start offsets.
    pub start_offsets: [i64; MAX_UNITS],
    /// Per-unit range end offsets (exclusive).
    pub end_offsets: [i64; MAX_UNITS],
    /// Number of tensors in the workload.
    pub tensor_count: u32,
    /// Compute units scheduled.
    pub units: u32,
    /// 1 when each unit overlaps its copy/compute stages.
    pub double_buffered: u32,
    /// Per-unit first-tensor indices.
    pub start_tensors: [u32; MAX_UNITS],
    /// Per-unit last-tensor indices.
    pub end_tensors: [u32; MAX_UNITS],
}

impl ForeachPlan {
    fn from_items(
        tile_extent: i64,
        lengths: &[i64],
        items: &[WorkItem],
        double_buffered: bool,
    ) -> Self {
        let mut plan = Self {
            tile_extent,
            tensor_counts: [0; MAX_TENSORS],
            start_offsets: [0; MAX_UNITS],
            end_offsets: [0; MAX_UNITS],
            tensor_count: lengths.len() as u32,
            units: items.len() as u32,
            double_buffered: u32::from(double_buffered),
            start_tensors: [0; MAX_UNITS],
            end_tensors: [0; MAX_UNITS],
        };
        plan.tensor_counts[..lengths.len()].copy_from_slice(lengths);
        for it in items {
            let u = it.unit_index as usize;
            plan.start_tensors[u] = it.start_tensor;
            plan.end_tensors[u] = it.end_tensor;
            plan.start_offsets[u] = it.start_offset;
            plan.end_offsets[u] = it.end_offset;
        }
        plan
    }

    /// Decodes a record previously produced by [`PlanRecord::encode_into`].
    pub fn decode(buffer: &[u8]) -> Result<Self, PlanError> {
        let mut r = PlanReader::begin(buffer, FOREACH_PLAN_BYTES)?;
        Ok(Self {
            tile_extent: r.get_i64(),
            tensor_counts: r.get_i64_array::<MAX_TENSORS>(),
            start_offsets: r.get_i64_array::<MAX_UNITS>(),
            end_offsets: r.get_i64_array::<MAX_UNITS>(),
            tensor_count: r.get_u32(),
            units: r.get_u32(),
            double_buffered: r.get_u32(),
            start_tensors: r.get_u32_array::<MAX_UNITS>(),
            end_tensors: r.get_u32_array::<MAX_UNITS>(),
        })
    }
}

impl PlanRecord for ForeachPlan {
    fn serialized_size(&self) -> usize {
        FOREACH_PLAN_BYTES
    }

    fn encode_into(&self, buffer: &mut [u8]) -> Result<usize, PlanError> {
        let mut w = PlanWriter::begin(buffer, FOREACH_PLAN_BYTES)?;
        w.put_i64(self.tile_extent);
        w.put_i64_slice(&self.tensor_counts);
        w.put_i64_slice(&self.start_offsets);
        w.put_i64_slice(&self.end_offsets);
        w.put_u32(self.tensor_count);
        w.put_u32(self.units);
        w.put_u32(self.double_buffered);
        w.put_u32_slice(&self.start_tensors);
        w.put_u32_slice(&self.end_tensors);
        Ok(w.finish())
    }
}

// ── Strategies ─────────────────────────────────────────────────────

fn ragged_view<'v>(ctx: &'v PlanContext<'_>) -> Option<(&'v [i64], i64, ElemType)> {
    match &ctx.view {
        WorkloadView::Ragged {
            lengths,
            total_elements,
            elem,
        } => Some((lengths, *total_elements, *elem)),
        WorkloadView::GroupedMatrix { .. } => None,
    }
}

fn build_outcome(
    ctx: &PlanContext<'_>,
    lengths: &[i64],
    elem: ElemType,
    extent: i64,
    units: u32,
    double_buffered: bool,
    workspace_bytes: u64,
) -> Result<StrategyOutcome, PlanError> {
    if units as usize > MAX_UNITS {
        return Err(PlanError::internal(format!(
            "{units} units exceed the plan record's {MAX_UNITS}-unit table"
        )));
    }
    let items = partition_ragged(lengths, units, elements_per_block(elem))?;
    let record = ForeachPlan::from_items(extent, lengths, &items, double_buffered);
    let kind = ctx.descriptor().kind;
    Ok(StrategyOutcome {
        tile: TileParams {
            primary_extent: extent,
            secondary_extent: 0,
            compute_units_used: units,
            double_buffered,
        },
        workspace_bytes,
        dispatch_key: DispatchAxes {
            elem_class: elem.key_class(),
            has_optional: false,
            mode: mode_axis(kind),
        }
        .compose(),
        record: Box::new(record),
    })
}

/// Small-workload fast path: the whole flattened range in one unit's tile.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForeachSingleUnit;

impl StrategyCandidate for ForeachSingleUnit {
    fn name(&self) -> &'static str {
        "foreach-single-unit"
    }

    fn supports(&self, kind: OpKind) -> bool {
        kind.is_foreach()
    }

    fn is_capable(&self, ctx: &PlanContext<'_>) -> bool {
        let Some((lengths, total, elem)) = ragged_view(ctx) else {
            return false;
        };
        if lengths.len() > MAX_TENSORS {
            return false;
        }
        let cost = cost_model(ctx.descriptor().kind, elem, false);
        match solve_primary_extent(cost, ctx.profile().scratch_bytes_per_unit) {
            Ok(extent) => total <= extent,
            Err(_) => false,
        }
    }

    fn compute(&self, ctx: &PlanContext<'_>) -> Result<StrategyOutcome, PlanError> {
        let (lengths, total, elem) = ragged_view(ctx)
            .ok_or_else(|| PlanError::internal("single-unit foreach on non-ragged view"))?;
        let cost = cost_model(ctx.descriptor().kind, elem, false);
        let extent = solve_primary_extent(cost, ctx.profile().scratch_bytes_per_unit)?;
        let units = clamp_units(total, extent, ctx.profile().compute_units, 1)?;
        build_outcome(
            ctx,
            lengths,
            elem,
            extent,
            units,
            false,
            WORKSPACE_SYSTEM_SLOT,
        )
    }
}

/// General foreach path: every capable unit, double-buffered tiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForeachBlockParallel;

impl StrategyCandidate for ForeachBlockParallel {
    fn name(&self) -> &'static str {
        "foreach-block-parallel"
    }

    fn supports(&self, kind: OpKind) -> bool {
        kind.is_foreach()
    }

    fn is_capable(&self, ctx: &PlanContext<'_>) -> bool {
        matches!(ragged_view(ctx), Some((lengths, _, _)) if lengths.len() <= MAX_TENSORS)
    }

    fn compute(&self, ctx: &PlanContext<'_>) -> Result<StrategyOutcome, PlanError> {
        let (lengths, total, elem) = ragged_view(ctx)
            .ok_or_else(|| PlanError::internal("block-parallel foreach on non-ragged view"))?;
        let cost = cost_model(ctx.descriptor().kind, elem, true);
        let extent = solve_primary_extent(cost, ctx.profile().scratch_bytes_per_unit)?;

        // Units scale with aligned blocks so every unit owns at least one
        // whole transfer block, as in the single-block-per-unit floor of
        // the device DMA engine. The plan record addresses at most
        // MAX_UNITS units, so wider devices are capped, not rejected.
        let hardware = ctx.profile().compute_units.min(MAX_UNITS as u32);
        let units = clamp_units(total, elements_per_block(elem), hardware, hardware)?;

        build_outcome(
            ctx,
            lengths,
            elem,
            extent,
            units,
            true,
            WORKSPACE_SYSTEM_SLOT,
        )
    }
}
