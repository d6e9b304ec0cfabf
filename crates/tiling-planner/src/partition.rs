// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Ragged workload partitioning.
//!
//! Splits an ordered list of per-tensor element counts into contiguous,
//! near-equal ranges across compute units. Load balancing follows the
//! largest-remainder rule over alignment-sized blocks: the total workload is
//! measured in `align`-element blocks (each tensor rounded up individually),
//! every unit receives `floor(blocks / units)` of them, and the first
//! `blocks % units` units receive one extra block. Per-unit quotas therefore
//! differ by at most one block; this is not a greedy bin-pack.
//!
//! A quota may land mid-tensor, in which case the tensor is split across two
//! units — always at an element boundary, never mid-element. If the final
//! tensor runs out before the final unit's quota is met (the block rounding
//! makes quotas an overestimate of raw elements), the trailing range is
//! widened to cover all remaining elements so coverage is exact.

use crate::solver::ceil_div;
use crate::PlanError;

/// One compute unit's contiguous slice of the flattened workload.
///
/// Offsets are element indices within a tensor; `end_offset` is exclusive.
/// The set of WorkItems for one planning call partitions the flattened
/// concatenation of all tensor element ranges exactly once, ordered by
/// `unit_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct WorkItem {
    /// Index of the compute unit this range is assigned to.
    pub unit_index: u32,
    /// First tensor touched by this unit.
    pub start_tensor: u32,
    /// Element offset into `start_tensor` where the range begins.
    pub start_offset: i64,
    /// Last tensor touched by this unit.
    pub end_tensor: u32,
    /// Exclusive element offset into `end_tensor` where the range ends.
    pub end_offset: i64,
}

impl WorkItem {
    /// Returns `true` if this unit received no elements.
    ///
    /// Trailing units go empty when block rounding hands all raw elements to
    /// earlier units; the kernel skips them.
    pub fn is_empty(&self) -> bool {
        self.start_tensor == self.end_tensor && self.start_offset == self.end_offset
    }
}

/// Partitions `lengths` into exactly `units` WorkItems.
///
/// # Errors
/// `InternalInconsistency` when `units == 0` or `align <= 0`, or when a
/// caller hands over non-positive lengths — descriptor validation upstream
/// makes those unreachable from the public entry point.
pub fn partition_ragged(
    lengths: &[i64],
    units: u32,
    align: i64,
) -> Result<Vec<WorkItem>, PlanError> {
    if units == 0 {
        return Err(PlanError::internal(
            "partitioner asked to fill zero compute units",
        ));
    }
    if align <= 0 {
        return Err(PlanError::internal(format!(
            "partitioner with non-positive alignment {align}"
        )));
    }
    if lengths.is_empty() {
        return Err(PlanError::internal("partitioner with empty tensor list"));
    }
    if let Some(&bad) = lengths.iter().find(|&&l| l <= 0) {
        return Err(PlanError::internal(format!(
            "partitioner with non-positive tensor length {bad}"
        )));
    }

    let n = lengths.len();
    let units_usize = units as usize;
    let block_count: i64 = lengths.iter().map(|&l| ceil_div(l, align)).sum();
    let base_quota = block_count / i64::from(units) * align;
    let extra_blocks = block_count % i64::from(units);

    let mut items: Vec<WorkItem> = Vec::with_capacity(units_usize);
    let mut start_tensor = 0u32;
    let mut start_offset = 0i64;
    let mut consumed = 0i64; // raw elements accumulated toward the open unit
    let mut cursor = 0i64; // element offset within tensor `i`
    let mut i = 0usize;

    while i < n && items.len() < units_usize {
        let unit = items.len() as i64;
        let quota = if unit < extra_blocks {
            base_quota + align
        } else {
            base_quota
        };

        let avail = lengths[i] - cursor;
        if consumed + avail < quota {
            // Whole remainder of this tensor fits below the quota.
            consumed += avail;
            cursor = 0;
            i += 1;
            continue;
        }

        // Quota reached inside (or exactly at the end of) tensor i.
        let split = cursor + (quota - consumed);
        items.push(WorkItem {
            unit_index: unit as u32,
            start_tensor,
            start_offset,
            end_tensor: i as u32,
            end_offset: split,
        });
        consumed = 0;
        if split < lengths[i] {
            // Next unit continues the same tensor at the split point.
            start_tensor = i as u32;
            start_offset = split;
            cursor = split;
        } else {
            start_tensor = (i + 1) as u32;
            start_offset = 0;
            cursor = 0;
            i += 1;
        }
    }

    let last_tensor = (n - 1) as u32;
    let last_end = lengths[n - 1];
    let covered = items
        .last()
        .is_some_and(|it| it.end_tensor == last_tensor && it.end_offset == last_end);

    if !covered {
        if items.len() < units_usize {
            // Widening rule: the trailing unit absorbs whatever raw elements
            // the block-rounded quotas left over.
            items.push(WorkItem {
                unit_index: items.len() as u32,
                start_tensor,
                start_offset,
                end_tensor: last_tensor,
                end_offset: last_end,
            });
        } else if let Some(last) = items.last_mut() {
            last.end_tensor = last_tensor;
            last.end_offset = last_end;
        }
    }

    while items.len() < units_usize {
        items.push(WorkItem {
            unit_index: items.len() as u32,
            start_tensor: last_tensor,
            start_offset: last_end,
            end_tensor: last_tensor,
            end_offset: last_end,
        });
    }

    Ok(items)
}
