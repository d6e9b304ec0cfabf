// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the tiling planner.
//!
//! Every failure is a synchronous return value; planning is a pure function
//! of its inputs, so re-invoking with identical inputs yields identical
//! failures and no retry policy exists. [`PlanError::kind`] collapses the
//! variants into the three coarse classes callers branch on.

use op_descriptor::DescriptorError;

/// Coarse classification of a planning failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanErrorKind {
    /// Malformed descriptor or profile.
    Validation,
    /// The workload cannot fit the device's resources, or no strategy
    /// applies to it.
    Capacity,
    /// An invariant the planner itself must uphold was violated.
    Internal,
}

/// Errors that can occur during plan generation.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// The descriptor violates the planned operator's shape contract.
    #[error("operator '{op}' rejected: {detail}")]
    BadShape { op: &'static str, detail: String },

    /// The device profile is unusable.
    #[error("device profile rejected: {0}")]
    BadProfile(#[from] device_profile::ProfileError),

    /// Descriptor-level validation failed.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// The scratch budget cannot even cover the reserved tiling overhead.
    #[error("scratch budget of {budget} bytes cannot cover {reserved} reserved bytes")]
    BudgetExhausted { budget: u64, reserved: u64 },

    /// The linear solve produced a non-positive aligned extent.
    #[error(
        "{stage} tile extent underflow: {usable} usable bytes at {bytes_per_extent} bytes/extent, align {align}"
    )]
    TileUnderflow {
        stage: &'static str,
        usable: u64,
        bytes_per_extent: u64,
        align: i64,
    },

    /// The strategy's workspace requirement exceeds shared staging memory.
    #[error("workspace requires {needed} bytes but shared staging holds {available}")]
    WorkspaceOverflow { needed: u64, available: u64 },

    /// No registered strategy is capable of this operator invocation.
    #[error("no strategy applicable to operator '{op}'")]
    NoStrategy { op: &'static str },

    /// The encoded plan does not fit the caller's buffer.
    #[error("encoded plan needs {needed} bytes but buffer holds {available}")]
    BufferTooSmall { needed: usize, available: usize },

    /// An invariant internal to the planner was violated.
    #[error("internal inconsistency: {detail}")]
    Internal { detail: String },
}

impl PlanError {
    /// Maps the concrete variant onto the coarse failure taxonomy.
    pub fn kind(&self) -> PlanErrorKind {
        match self {
            PlanError::BadShape { .. }
            | PlanError::BadProfile(_)
            | PlanError::Descriptor(_) => PlanErrorKind::Validation,
            PlanError::BudgetExhausted { .. }
            | PlanError::TileUnderflow { .. }
            | PlanError::WorkspaceOverflow { .. }
            | PlanError::NoStrategy { .. }
            | PlanError::BufferTooSmall { .. } => PlanErrorKind::Capacity,
            PlanError::Internal { .. } => PlanErrorKind::Internal,
        }
    }

    /// Shorthand constructor for internal-invariant violations.
    pub(crate) fn internal(detail: impl Into<String>) -> Self {
        PlanError::Internal {
            detail: detail.into(),
        }
    }
}
