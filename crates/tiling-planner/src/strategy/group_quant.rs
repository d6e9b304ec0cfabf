// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Strategies for per-group quantization of a 2-D activation.
//!
//! `x[S, H]` is quantized row by row against `scale[E, H]`, where
//! `group_index[E]` maps row ranges to scale groups and an optional scalar
//! `offset` shifts the result. Rows split evenly across units; when a whole
//! row does not fit scratch, the planner first solves an aligned column
//! tile (primary extent) and then the number of rows per pass given that
//! tile (secondary extent).
//!
//! | Strategy | Priority | Capable when |
//! |---|---|---|
//! | [`GroupQuantSingleGroup`] | 0 | `E == 1` |
//! | [`GroupQuantRowSplit`] | 2 | always |
//!
//! With a single scale group the per-row group lookup disappears and the
//! one scale row stays resident in scratch for the whole pass.

use crate::pipeline::{DstType, PlanContext, WorkloadView};
use crate::plan::{DispatchAxes, PlanReader, PlanRecord, PlanWriter, BYTE_BLOCK};
use crate::solver::{
    ceil_div, clamp_units, solve_primary_extent, solve_secondary_extent, LinearCost, TileParams,
};
use crate::strategy::{StrategyCandidate, StrategyOutcome};
use crate::PlanError;
use op_descriptor::{ElemType, OpKind};

/// Scratch bytes held back for resident tiling data.
const RESERVED_TILING_BYTES: u64 = 1024;

/// Fixed staging requirement: one 32-byte system slot.
const WORKSPACE_SYSTEM_SLOT: u64 = 32;

// ── Plan record ────────────────────────────────────────────────────

/// Serialized size of a [`GroupQuantPlan`].
pub const GROUP_QUANT_PLAN_BYTES: usize = 8 * 7 + 4 * 4;

/// Fixed-layout record for the group-quant family.
///
/// Widest fields first; the layout is the wire contract with the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupQuantPlan {
    /// Rows of `x` (S).
    pub rows: i64,
    /// Columns of `x` (H).
    pub cols: i64,
    /// Scale groups (E).
    pub groups: i64,
    /// Aligned columns per pass (primary extent).
    pub col_tile: i64,
    /// Rows per pass given the column tile (secondary extent).
    pub row_tile: i64,
    /// Rows handled by each of the leading units.
    pub rows_lead: i64,
    /// Rows handled by each trailing unit.
    pub rows_tail: i64,
    /// 1 when the optional offset input is present.
    pub has_offset: u32,
    /// Compute units scheduled.
    pub units: u32,
    /// Units carrying `rows_lead` rows; the rest carry `rows_tail`.
    pub lead_units: u32,
    /// Destination mode (0 = int8, 1 = int4).
    pub dst_mode: u32,
}

impl GroupQuantPlan {
    /// Decodes a record previously produced by [`PlanRecord::encode_into`].
    pub fn decode(buffer: &[u8]) -> Result<Self, PlanError> {
        let mut r = PlanReader::begin(buffer, GROUP_QUANT_PLAN_BYTES)?;
        Ok(Self {
            rows: r.get_i64(),
            cols: r.get_i64(),
            groups: r.get_i64(),
            col_tile: r.get_i64(),
            row_tile: r.get_i64(),
            rows_lead: r.get_i64(),
            rows_tail: r.get_i64(),
            has_offset: r.get_u32(),
            units: r.get_u32(),
            lead_units: r.get_u32(),
            dst_mode: r.get_u32(),
        })
    }
}

impl PlanRecord for GroupQuantPlan {
    fn serialized_size(&self) -> usize {
        GROUP_QUANT_PLAN_BYTES
    }

    fn encode_into(&self, buffer: &mut [u8]) -> Result<usize, PlanError> {
        let mut w = PlanWriter::begin(buffer, GROUP_QUANT_PLAN_BYTES)?;
        w.put_i64(self.rows);
        w.put_i64(self.cols);
        w.put_i64(self.groups);
        w.put_i64(self.col_tile);
        w.put_i64(self.row_tile);
        w.put_i64(self.rows_lead);
        w.put_i64(self.rows_tail);
        w.put_u32(self.has_offset);
        w.put_u32(self.units);
        w.put_u32(self.lead_units);
        w.put_u32(self.dst_mode);
        Ok(w.finish())
    }
}

// ── Shared tiling math ─────────────────────────────────────────────

struct MatrixView {
    rows: i64,
    cols: i64,
    groups: i64,
    has_offset: bool,
    dst: DstType,
    elem: ElemType,
}

fn matrix_view(ctx: &PlanContext<'_>) -> Option<MatrixView> {
    match ctx.view {
        WorkloadView::GroupedMatrix {
            rows,
            cols,
            groups,
            has_offset,
            dst,
            elem,
        } => Some(MatrixView {
            rows,
            cols,
            groups,
            has_offset,
            dst,
            elem,
        }),
        WorkloadView::Ragged { .. } => None,
    }
}

/// Solves the column/row tiles and row split, shared by both candidates.
///
/// `bytes_per_cell` is the strategy's per-column-element scratch cost and
/// `reserved` its fixed overhead; the single-group path trades a larger
/// reserve (the resident scale row) for a cheaper per-cell cost.
fn solve_row_split(
    ctx: &PlanContext<'_>,
    view: &MatrixView,
    reserved: u64,
    bytes_per_cell: u64,
) -> Result<(TileParams, GroupQuantPlan), PlanError> {
    let profile = ctx.profile();
    let align = i64::from(BYTE_BLOCK / u32::from(view.elem.width_bytes()));
    let budget = profile.scratch_bytes_per_unit;

    let cost = LinearCost {
        reserved_bytes: reserved,
        bytes_per_extent: bytes_per_cell,
        align,
    };
    let solved = solve_primary_extent(cost, budget)?;

    // A row that fits whole becomes the (remainder-sized) primary tile;
    // otherwise passes sweep aligned column windows.
    let (col_tile, row_tile) = if solved >= view.cols {
        let rows_per_pass =
            solve_secondary_extent(view.cols, bytes_per_cell, reserved, 1, budget)?.min(view.rows);
        (view.cols, rows_per_pass)
    } else {
        (solved, 1)
    };

    let units = clamp_units(view.rows, 1, profile.compute_units, profile.compute_units)?;
    let units_i64 = i64::from(units);
    let lead_units = if view.rows % units_i64 == 0 {
        units
    } else {
        (view.rows % units_i64) as u32
    };
    let rows_lead = ceil_div(view.rows, units_i64);
    let rows_tail = view.rows / units_i64;

    let tile = TileParams {
        primary_extent: col_tile,
        secondary_extent: row_tile,
        compute_units_used: units,
        double_buffered: false,
    };
    let record = GroupQuantPlan {
        rows: view.rows,
        cols: view.cols,
        groups: view.groups,
        col_tile,
        row_tile,
        rows_lead,
        rows_tail,
        has_offset: u32::from(view.has_offset),
        units,
        lead_units,
        dst_mode: view.dst.mode() as u32,
    };
    Ok((tile, record))
}

fn outcome(view: &MatrixView, tile: TileParams, record: GroupQuantPlan) -> StrategyOutcome {
    StrategyOutcome {
        tile,
        workspace_bytes: WORKSPACE_SYSTEM_SLOT,
        dispatch_key: DispatchAxes {
            elem_class: view.elem.key_class(),
            has_optional: view.has_offset,
            mode: view.dst.mode(),
        }
        .compose(),
        record: Box::new(record),
    }
}

// ── Strategies ─────────────────────────────────────────────────────

/// Fast path for a single scale group: the scale row stays resident and
/// the per-row group lookup is skipped entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupQuantSingleGroup;

/// Scratch cost of the single-group path: input cell + quantized output
/// byte per column, the whole scale row resident in the reserve.
fn single_group_cost(view: &MatrixView) -> LinearCost {
    let width = u64::from(view.elem.width_bytes());
    LinearCost {
        reserved_bytes: RESERVED_TILING_BYTES + view.cols as u64 * width,
        bytes_per_extent: width + 1,
        align: i64::from(BYTE_BLOCK / u32::from(view.elem.width_bytes())),
    }
}

impl StrategyCandidate for GroupQuantSingleGroup {
    fn name(&self) -> &'static str {
        "group-quant-single-group"
    }

    fn supports(&self, kind: OpKind) -> bool {
        kind == OpKind::GroupQuant
    }

    fn is_capable(&self, ctx: &PlanContext<'_>) -> bool {
        // Only claim inputs whose resident scale row fits scratch; a row
        // too wide for the reserve falls through to the column-tiling
        // row-split path.
        let Some(view) = matrix_view(ctx) else {
            return false;
        };
        if view.groups != 1 {
            return false;
        }
        solve_primary_extent(single_group_cost(&view), ctx.profile().scratch_bytes_per_unit)
            .is_ok()
    }

    fn compute(&self, ctx: &PlanContext<'_>) -> Result<StrategyOutcome, PlanError> {
        let view = matrix_view(ctx)
            .ok_or_else(|| PlanError::internal("single-group quant on non-matrix view"))?;
        let cost = single_group_cost(&view);
        let (tile, record) =
            solve_row_split(ctx, &view, cost.reserved_bytes, cost.bytes_per_extent)?;
        Ok(outcome(&view, tile, record))
    }
}

/// General row-split path over grouped scales.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupQuantRowSplit;

impl StrategyCandidate for GroupQuantRowSplit {
    fn name(&self) -> &'static str {
        "group-quant-row-split"
    }

    fn supports(&self, kind: OpKind) -> bool {
        kind == OpKind::GroupQuant
    }

    fn is_capable(&self, ctx: &PlanContext<'_>) -> bool {
        matrix_view(ctx).is_some()
    }

    fn compute(&self, ctx: &PlanContext<'_>) -> Result<StrategyOutcome, PlanError> {
        let view = matrix_view(ctx)
            .ok_or_else(|| PlanError::internal("row-split quant on non-matrix view"))?;
        let width = u64::from(view.elem.width_bytes());
        // Input cell + scale cell + quantized output byte per column.
        let (tile, record) = solve_row_split(ctx, &view, RESERVED_TILING_BYTES, 2 * width + 1)?;
        Ok(outcome(&view, tile, record))
    }
}
