// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The [`StrategyCandidate`] trait and strategy implementations.

pub mod foreach;
pub mod group_quant;

use crate::pipeline::PlanContext;
use crate::plan::PlanRecord;
use crate::solver::TileParams;
use crate::PlanError;
use op_descriptor::OpKind;

/// Everything a committed strategy hands back to the pipeline: the solved
/// tile arithmetic, the staging workspace requirement, the kernel-variant
/// key, and the record to emit.
pub struct StrategyOutcome {
    /// Solved tile parameters.
    pub tile: TileParams,
    /// Shared staging bytes the kernel requires.
    pub workspace_bytes: u64,
    /// Kernel-variant selector.
    pub dispatch_key: u64,
    /// The record to encode into the caller's buffer.
    pub record: Box<dyn PlanRecord>,
}

/// One partitioning strategy for one operator/shape class.
///
/// Candidates are purely algorithmic — no I/O, no retained state — making
/// them trivially unit-testable. The registry probes candidates in
/// ascending priority order: [`Self::is_capable`] returning `false` is not
/// an error, it just advances the probe; returning `true` commits the
/// registry to this candidate, after which any failure in
/// [`Self::compute`] is the operator's final planning failure (no further
/// fallback).
pub trait StrategyCandidate: Send + Sync {
    /// Human-readable name of this strategy.
    fn name(&self) -> &'static str;

    /// Operator kinds this candidate plans for.
    fn supports(&self, kind: OpKind) -> bool;

    /// Pure capability predicate over shapes, attributes, and platform.
    fn is_capable(&self, ctx: &PlanContext<'_>) -> bool;

    /// Runs the tiling arithmetic and builds the plan record.
    fn compute(&self, ctx: &PlanContext<'_>) -> Result<StrategyOutcome, PlanError>;
}
