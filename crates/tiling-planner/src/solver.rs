// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The linear-budget tile-size solver.
//!
//! Every strategy ultimately asks the same question: given a scratch budget,
//! a fixed reserved overhead, and a per-unit-of-extent byte cost derived
//! from the number of concurrently live buffers, what is the largest aligned
//! tile extent that fits? The arithmetic lives here once, parameterized by
//! the strategy's cost coefficients, instead of being re-derived per
//! operator.
//!
//! ```text
//! extent = floor((budget - reserved) / bytes_per_extent)
//! extent = floor(extent / align) * align
//! ```
//!
//! A two-stage variant solves a secondary extent (e.g. a row count) after
//! the primary extent has been fixed at its maximum; the denominator then
//! incorporates the primary extent. Both stages fail on a non-positive
//! result rather than degrading to a degenerate single-block tile.

use crate::PlanError;

/// Integer ceiling division; `b` must be positive.
pub(crate) fn ceil_div(a: i64, b: i64) -> i64 {
    debug_assert!(b > 0);
    (a + b - 1) / b
}

/// Linear memory-cost model for one solve:
/// `cost(extent) = reserved_bytes + bytes_per_extent * extent`.
#[derive(Debug, Clone, Copy)]
pub struct LinearCost {
    /// Fixed overhead resident in scratch (tiling data, spill slots).
    pub reserved_bytes: u64,
    /// Bytes consumed per unit of extent: live buffer count × element
    /// width × double-buffering multiplier.
    pub bytes_per_extent: u64,
    /// Alignment granularity of the extent, in extent units.
    pub align: i64,
}

/// The solved numeric output consumed by plan emission.
///
/// Invariants: `primary_extent` is a positive multiple of the alignment
/// granularity (a single trailing remainder tile excepted), and the per-unit
/// byte cost recomputed from these params never exceeds the scratch budget
/// they were solved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileParams {
    /// Elements processed per pass per compute unit.
    pub primary_extent: i64,
    /// Second solved extent (e.g. rows per pass); zero when unused.
    pub secondary_extent: i64,
    /// Compute units the plan schedules.
    pub compute_units_used: u32,
    /// Whether each unit overlaps copy-in/compute/copy-out.
    pub double_buffered: bool,
}

/// Solves the maximal aligned primary extent under `budget_bytes`.
pub fn solve_primary_extent(cost: LinearCost, budget_bytes: u64) -> Result<i64, PlanError> {
    solve_stage("primary", cost, budget_bytes)
}

/// Solves a secondary extent after the primary has been fixed.
///
/// The effective per-extent cost is `primary_extent * bytes_per_cell`, so a
/// larger committed primary extent shrinks the secondary solution.
pub fn solve_secondary_extent(
    primary_extent: i64,
    bytes_per_cell: u64,
    reserved_bytes: u64,
    align: i64,
    budget_bytes: u64,
) -> Result<i64, PlanError> {
    if primary_extent <= 0 {
        return Err(PlanError::internal(format!(
            "secondary solve with non-positive primary extent {primary_extent}"
        )));
    }
    let cost = LinearCost {
        reserved_bytes,
        bytes_per_extent: primary_extent as u64 * bytes_per_cell,
        align,
    };
    solve_stage("secondary", cost, budget_bytes)
}

fn solve_stage(stage: &'static str, cost: LinearCost, budget_bytes: u64) -> Result<i64, PlanError> {
    if cost.bytes_per_extent == 0 || cost.align <= 0 {
        return Err(PlanError::internal(format!(
            "{stage} solve with degenerate cost model: {} bytes/extent, align {}",
            cost.bytes_per_extent, cost.align
        )));
    }
    if budget_bytes <= cost.reserved_bytes {
        return Err(PlanError::BudgetExhausted {
            budget: budget_bytes,
            reserved: cost.reserved_bytes,
        });
    }

    let usable = budget_bytes - cost.reserved_bytes;
    let raw = (usable / cost.bytes_per_extent) as i64;
    let aligned = raw / cost.align * cost.align;
    if aligned <= 0 {
        return Err(PlanError::TileUnderflow {
            stage,
            usable,
            bytes_per_extent: cost.bytes_per_extent,
            align: cost.align,
        });
    }
    Ok(aligned)
}

/// Clamps the compute-unit count for a workload of `total_items` split into
/// tiles of `extent`.
///
/// `preferred_max` is a strategy-specific performance ceiling independent of
/// the hardware maximum: small-input strategies intentionally under-use
/// available units so per-unit fixed overhead does not dominate.
pub fn clamp_units(
    total_items: i64,
    extent: i64,
    hardware_units: u32,
    preferred_max: u32,
) -> Result<u32, PlanError> {
    if extent <= 0 {
        return Err(PlanError::internal(format!(
            "unit clamp with non-positive extent {extent}"
        )));
    }
    if total_items <= 0 {
        return Err(PlanError::internal(format!(
            "unit clamp with non-positive workload {total_items}"
        )));
    }
    let wanted = ceil_div(total_items, extent);
    let ceiling = i64::from(hardware_units.min(preferred_max).max(1));
    Ok(wanted.min(ceiling) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cost(reserved: u64, per_extent: u64, align: i64) -> LinearCost {
        LinearCost {
            reserved_bytes: reserved,
            bytes_per_extent: per_extent,
            align,
        }
    }

    #[test]
    fn test_primary_basic() {
        // (192K - 1K) / 8 = 24448, aligned down to 8 → 24448.
        let e = solve_primary_extent(cost(1024, 8, 8), 192 * 1024).unwrap();
        assert_eq!(e, (192 * 1024 - 1024) / 8 / 8 * 8);
        assert_eq!(e % 8, 0);
    }

    #[test]
    fn test_primary_budget_exhausted() {
        let r = solve_primary_extent(cost(4096, 8, 8), 4096);
        assert!(matches!(r, Err(PlanError::BudgetExhausted { .. })));
    }

    #[test]
    fn test_primary_underflow_after_alignment() {
        // 7 usable bytes / 1 byte per extent = 7, aligned to 8 → 0.
        let r = solve_primary_extent(cost(0, 1, 8), 7);
        assert!(matches!(r, Err(PlanError::TileUnderflow { .. })));
    }

    #[test]
    fn test_secondary_shrinks_with_primary() {
        let rows_small = solve_secondary_extent(64, 4, 0, 1, 65536).unwrap();
        let rows_large = solve_secondary_extent(256, 4, 0, 1, 65536).unwrap();
        assert_eq!(rows_small, 65536 / (64 * 4));
        assert_eq!(rows_large, 65536 / (256 * 4));
        assert!(rows_large < rows_small);
    }

    #[test]
    fn test_secondary_rejects_bad_primary() {
        let r = solve_secondary_extent(0, 4, 0, 1, 65536);
        assert!(matches!(r, Err(PlanError::Internal { .. })));
    }

    #[test]
    fn test_clamp_units() {
        assert_eq!(clamp_units(1000, 8, 48, 48).unwrap(), 48);
        assert_eq!(clamp_units(100, 8, 48, 48).unwrap(), 13);
        assert_eq!(clamp_units(100, 8, 48, 1).unwrap(), 1);
        assert_eq!(clamp_units(3, 8, 48, 48).unwrap(), 1);
    }

    #[test]
    fn test_clamp_units_zero_extent_is_internal() {
        assert!(matches!(
            clamp_units(10, 0, 8, 8),
            Err(PlanError::Internal { .. })
        ));
    }

    proptest! {
        /// Increasing the budget never decreases the solved extent.
        #[test]
        fn prop_monotonic_in_budget(
            reserved in 0u64..4096,
            per_extent in 1u64..64,
            align in 1i64..64,
            budget in 1u64..1_000_000,
            bump in 0u64..1_000_000,
        ) {
            let c = cost(reserved, per_extent, align);
            if let Ok(e1) = solve_primary_extent(c, budget) {
                let e2 = solve_primary_extent(c, budget + bump).unwrap();
                prop_assert!(e2 >= e1);
            }
        }

        /// Whatever extent is returned, the modeled cost fits the budget.
        #[test]
        fn prop_solution_fits_budget(
            reserved in 0u64..4096,
            per_extent in 1u64..64,
            align in 1i64..64,
            budget in 1u64..1_000_000,
        ) {
            let c = cost(reserved, per_extent, align);
            if let Ok(e) = solve_primary_extent(c, budget) {
                prop_assert!(e > 0);
                prop_assert_eq!(e % align, 0);
                prop_assert!(reserved + per_extent * e as u64 <= budget);
            }
        }
    }
}
