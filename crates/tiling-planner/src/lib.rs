// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tiling-planner
//!
//! Turns a validated `OperatorDescriptor` plus a `DeviceProfile` into a
//! fixed-layout execution plan: tile extents, a compute-unit work split,
//! a staging workspace size, and a kernel dispatch key.
//!
//! # Strategies
//!
//! | Strategy | Priority | Operators | Capable when |
//! |---|---|---|---|
//! | [`ForeachSingleUnit`] | 0 | foreach family | whole workload fits one unit's scratch |
//! | [`ForeachBlockParallel`] | 2 | foreach family | always (≤ [`MAX_TENSORS`] tensors) |
//! | [`GroupQuantSingleGroup`] | 0 | group quant | single scale group |
//! | [`GroupQuantRowSplit`] | 2 | group quant | always |
//!
//! Probing commits: once a candidate's `is_capable` accepts, its `compute`
//! failure is the final answer for that operator — the registry never falls
//! back to a lower-priority candidate.
//!
//! # Trait-Based Extensibility
//!
//! All strategies implement [`StrategyCandidate`], so new tilings can be
//! added without touching the pipeline:
//!
//! ```ignore
//! struct MyStrategy;
//! impl StrategyCandidate for MyStrategy {
//!     fn name(&self) -> &'static str { "custom" }
//!     fn supports(&self, kind: OpKind) -> bool { kind == OpKind::ForeachUnary }
//!     fn is_capable(&self, ctx: &PlanContext<'_>) -> bool { /* ... */ true }
//!     fn compute(&self, ctx: &PlanContext<'_>)
//!         -> Result<StrategyOutcome, PlanError> { /* ... */ }
//! }
//! ```
//!
//! # Example
//! ```no_run
//! use device_profile::DeviceProfile;
//! use op_descriptor::{ElemType, OpKind, OperatorDescriptor, TensorArg, TensorShape};
//!
//! let desc = OperatorDescriptor::new(OpKind::ForeachUnary)
//!     .with_input(TensorArg::new("x0", TensorShape::vector(4096), ElemType::F32))
//!     .validate()
//!     .unwrap();
//! let mut buf = vec![0u8; 4096];
//! let summary = tiling_planner::plan(&desc, &DeviceProfile::edge(), &mut buf).unwrap();
//! println!("{} on {} units", summary.strategy, summary.compute_units_used);
//! ```

mod error;
mod partition;
mod pipeline;
mod plan;
mod registry;
mod solver;
pub mod strategy;

pub use error::{PlanError, PlanErrorKind};
pub use partition::{partition_ragged, WorkItem};
pub use pipeline::PlanContext;
pub use plan::{DispatchAxes, PlanRecord, PlanSummary, BYTE_BLOCK, MAX_TENSORS, MAX_UNITS};
pub use registry::{global, StrategyRegistry};
pub use solver::{
    clamp_units, solve_primary_extent, solve_secondary_extent, LinearCost, TileParams,
};
pub use strategy::foreach::{ForeachBlockParallel, ForeachPlan, ForeachSingleUnit};
pub use strategy::group_quant::{GroupQuantPlan, GroupQuantRowSplit, GroupQuantSingleGroup};
pub use strategy::{StrategyCandidate, StrategyOutcome};

use device_profile::DeviceProfile;
use op_descriptor::{OperatorDescriptor, Validated};

/// Plans `descriptor` for `profile` with the built-in strategies, encoding
/// the plan record into `buffer`.
///
/// `buffer` must be at least the committed strategy's record size (3604
/// bytes covers every built-in record). Returns a [`PlanSummary`]; the
/// encoded record starts at `buffer[0]` and spans `summary.plan_bytes`.
pub fn plan(
    descriptor: &OperatorDescriptor<Validated>,
    profile: &DeviceProfile,
    buffer: &mut [u8],
) -> Result<PlanSummary, PlanError> {
    pipeline::run(registry::global(), descriptor, profile, buffer)
}
