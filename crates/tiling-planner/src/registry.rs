// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Priority-ordered strategy registry.
//!
//! Candidates are an explicit ordered list of (priority, candidate) pairs —
//! tagged dispatch rather than a subclass hierarchy probing `is_capable`
//! overrides. Lower priority values are tried first; the first capable
//! candidate wins and commits. The process-wide registry is populated once
//! at first use and never mutated during planning, so no locking applies.

use crate::pipeline::PlanContext;
use crate::strategy::{
    foreach::{ForeachBlockParallel, ForeachSingleUnit},
    group_quant::{GroupQuantRowSplit, GroupQuantSingleGroup},
    StrategyCandidate,
};
use crate::PlanError;
use std::sync::OnceLock;

struct Entry {
    priority: i32,
    candidate: Box<dyn StrategyCandidate>,
}

/// Ordered collection of strategy candidates across all operator kinds.
pub struct StrategyRegistry {
    entries: Vec<Entry>,
}

impl StrategyRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The built-in candidate set.
    ///
    /// Specialized fast paths register at priority 0, general fallbacks at
    /// priority 2, leaving room for out-of-tree candidates in between.
    pub fn builtin() -> Self {
        let mut reg = Self::new();
        reg.register(0, Box::new(ForeachSingleUnit));
        reg.register(2, Box::new(ForeachBlockParallel));
        reg.register(0, Box::new(GroupQuantSingleGroup));
        reg.register(2, Box::new(GroupQuantRowSplit));
        reg
    }

    /// Adds a candidate at the given priority (lower runs first).
    pub fn register(&mut self, priority: i32, candidate: Box<dyn StrategyCandidate>) {
        self.entries.push(Entry {
            priority,
            candidate,
        });
        // Stable: equal priorities keep registration order.
        self.entries.sort_by_key(|e| e.priority);
    }

    /// Number of registered candidates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no candidates are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Phase 3, CheckCapability: probes candidates for the context's
    /// operator kind in ascending priority order.
    ///
    /// Returns the first capable candidate; an incapable candidate is not
    /// an error, only the exhaustion of the chain is.
    pub fn resolve<'r>(
        &'r self,
        ctx: &PlanContext<'_>,
    ) -> Result<&'r dyn StrategyCandidate, PlanError> {
        let kind = ctx.descriptor().kind;
        for entry in self.entries.iter().filter(|e| e.candidate.supports(kind)) {
            if entry.candidate.is_capable(ctx) {
                return Ok(entry.candidate.as_ref());
            }
            tracing::debug!(
                strategy = entry.candidate.name(),
                priority = entry.priority,
                "candidate declined"
            );
        }
        Err(PlanError::NoStrategy { op: kind.as_str() })
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// The process-wide registry used by [`crate::plan`].
pub fn global() -> &'static StrategyRegistry {
    static REGISTRY: OnceLock<StrategyRegistry> = OnceLock::new();
    REGISTRY.get_or_init(StrategyRegistry::builtin)
}
