// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The planning pipeline: six phases, short-circuiting on first failure.
//!
//! ```text
//! ReadPlatform → ReadShapesAndAttrs → CheckCapability
//!     → ComputeTileParams → ComputeWorkspaceSize → EmitPlan
//! ```
//!
//! The two read phases are pure extraction into a [`PlanContext`] and fail
//! only on malformed input. Capability probing walks the registry; once a
//! candidate accepts, the remaining phases run without fallback. The
//! context value is the only thread through the pipeline — no mutable state
//! survives between planning calls.

use crate::registry::StrategyRegistry;
use crate::{PlanError, PlanSummary};
use device_profile::DeviceProfile;
use op_descriptor::{ElemType, OperatorDescriptor, Validated};

/// Destination type of the quantization families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DstType {
    Int8,
    Int4,
}

impl DstType {
    /// Dispatch-key mode axis value.
    pub(crate) fn mode(self) -> u64 {
        match self {
            DstType::Int8 => 0,
            DstType::Int4 => 1,
        }
    }
}

/// Shape/attr extraction result, normalized per operator family.
pub(crate) enum WorkloadView {
    /// Ragged list of independently sized tensors (foreach family).
    Ragged {
        lengths: Vec<i64>,
        total_elements: i64,
        elem: ElemType,
    },
    /// 2-D activation quantized against grouped scales.
    GroupedMatrix {
        rows: i64,
        cols: i64,
        groups: i64,
        has_offset: bool,
        dst: DstType,
        elem: ElemType,
    },
}

/// Everything the strategies read: validated inputs plus the normalized
/// workload view. Built fresh per planning call, dropped when it returns.
pub struct PlanContext<'a> {
    descriptor: &'a OperatorDescriptor<Validated>,
    profile: &'a DeviceProfile,
    pub(crate) view: WorkloadView,
}

impl<'a> PlanContext<'a> {
    /// Phases 1–2: ReadPlatform and ReadShapesAndAttrs.
    pub fn read(
        descriptor: &'a OperatorDescriptor<Validated>,
        profile: &'a DeviceProfile,
    ) -> Result<Self, PlanError> {
        profile.validate()?;
        tracing::debug!(profile = %profile.summary(), "platform info read");

        let view = extract_view(descriptor)?;
        tracing::debug!(op = %descriptor.kind, inputs = descriptor.num_inputs(), "shapes and attrs read");

        Ok(Self {
            descriptor,
            profile,
            view,
        })
    }

    /// The validated operator descriptor.
    pub fn descriptor(&self) -> &OperatorDescriptor<Validated> {
        self.descriptor
    }

    /// The device resource profile.
    pub fn profile(&self) -> &DeviceProfile {
        self.profile
    }
}

fn extract_view(desc: &OperatorDescriptor<Validated>) -> Result<WorkloadView, PlanError> {
    if desc.kind.is_foreach() {
        return extract_ragged(desc);
    }
    extract_grouped_matrix(desc)
}

fn extract_ragged(desc: &OperatorDescriptor<Validated>) -> Result<WorkloadView, PlanError> {
    let op = desc.kind.as_str();
    let elem = desc.inputs()[0].elem;
    if desc.inputs().iter().any(|arg| arg.elem != elem) {
        return Err(PlanError::BadShape {
            op,
            detail: "all tensors in a foreach list must share one element type".into(),
        });
    }
    let lengths = desc.element_counts();
    let total_elements = lengths.iter().sum();
    Ok(WorkloadView::Ragged {
        lengths,
        total_elements,
        elem,
    })
}

fn extract_grouped_matrix(desc: &OperatorDescriptor<Validated>) -> Result<WorkloadView, PlanError> {
    let op = desc.kind.as_str();
    let bad = |detail: &str| PlanError::BadShape {
        op,
        detail: detail.into(),
    };

    if desc.num_inputs() != 3 && desc.num_inputs() != 4 {
        return Err(bad("expects x, scale, group_index and optional offset"));
    }
    let x = &desc.inputs()[0];
    let scale = &desc.inputs()[1];
    let group_index = &desc.inputs()[2];

    if !matches!(x.elem, ElemType::F32 | ElemType::F16 | ElemType::BF16) {
        return Err(bad("x element type must be f32, f16 or bf16"));
    }
    if x.shape.rank() != 2 {
        return Err(bad("x must be rank 2"));
    }
    if scale.shape.rank() != 2 {
        return Err(bad("scale must be rank 2"));
    }
    if group_index.shape.rank() != 1 {
        return Err(bad("group_index must be rank 1"));
    }

    let rows = x.shape.dim(0).unwrap_or(0);
    let cols = x.shape.dim(1).unwrap_or(0);
    let groups = scale.shape.dim(0).unwrap_or(0);

    if scale.shape.dim(1) != Some(cols) {
        return Err(bad("scale columns must match x columns"));
    }
    if group_index.shape.dim(0) != Some(groups) {
        return Err(bad("group_index length must match scale rows"));
    }

    let has_offset = if let Some(offset) = desc.input(3) {
        if offset.shape.rank() != 1 || offset.shape.dim(0) != Some(1) {
            return Err(bad("offset must be a single-element vector"));
        }
        if offset.elem != scale.elem {
            return Err(bad("offset element type must match scale"));
        }
        true
    } else {
        false
    };

    let dst = match desc.attrs().str_or("dst_type", "int8")? {
        "int8" => DstType::Int8,
        "int4" => DstType::Int4,
        other => {
            return Err(PlanError::BadShape {
                op,
                detail: format!("dst_type '{other}' unsupported (int8, int4)"),
            })
        }
    };
    if dst == DstType::Int4 && cols % 2 != 0 {
        return Err(bad("int4 output requires an even column count"));
    }

    Ok(WorkloadView::GroupedMatrix {
        rows,
        cols,
        groups,
        has_offset,
        dst,
        elem: x.elem,
    })
}

/// Phases 3–6: capability probe, tiling math, workspace check, emission.
pub fn run(
    registry: &StrategyRegistry,
    descriptor: &OperatorDescriptor<Validated>,
    profile: &DeviceProfile,
    buffer: &mut [u8],
) -> Result<PlanSummary, PlanError> {
    let ctx = PlanContext::read(descriptor, profile)?;

    let candidate = registry.resolve(&ctx)?;
    tracing::info!(op = %descriptor.kind, strategy = candidate.name(), "strategy committed");

    let outcome = candidate.compute(&ctx)?;

    if outcome.workspace_bytes > profile.shared_staging_bytes {
        return Err(PlanError::WorkspaceOverflow {
            needed: outcome.workspace_bytes,
            available: profile.shared_staging_bytes,
        });
    }

    let plan_bytes = outcome.record.encode_into(buffer)?;
    tracing::debug!(
        units = outcome.tile.compute_units_used,
        key = outcome.dispatch_key,
        plan_bytes,
        "plan emitted"
    );

    Ok(PlanSummary {
        strategy: candidate.name(),
        compute_units_used: outcome.tile.compute_units_used,
        workspace_bytes: outcome.workspace_bytes,
        dispatch_key: outcome.dispatch_key,
        plan_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use op_descriptor::{AttrValue, OpKind, TensorArg, TensorShape};

    fn quant_draft() -> op_descriptor::OperatorDescriptor {
        op_descriptor::OperatorDescriptor::new(OpKind::GroupQuant)
            .with_input(TensorArg::new(
                "x",
                TensorShape::matrix(16, 64),
                ElemType::F16,
            ))
            .with_input(TensorArg::new(
                "scale",
                TensorShape::matrix(4, 64),
                ElemType::F16,
            ))
            .with_input(TensorArg::new(
                "group_index",
                TensorShape::vector(4),
                ElemType::I32,
            ))
    }

    #[test]
    fn test_extract_grouped_matrix() {
        let desc = quant_draft().validate().unwrap();
        let profile = DeviceProfile::datacenter();
        let ctx = PlanContext::read(&desc, &profile).unwrap();
        match ctx.view {
            WorkloadView::GroupedMatrix {
                rows,
                cols,
                groups,
                has_offset,
                dst,
                ..
            } => {
                assert_eq!((rows, cols, groups), (16, 64, 4));
                assert!(!has_offset);
                assert_eq!(dst, DstType::Int8);
            }
            WorkloadView::Ragged { .. } => panic!("wrong view"),
        }
    }

    #[test]
    fn test_extract_rejects_scale_mismatch() {
        let desc = op_descriptor::OperatorDescriptor::new(OpKind::GroupQuant)
            .with_input(TensorArg::new(
                "x",
                TensorShape::matrix(16, 64),
                ElemType::F16,
            ))
            .with_input(TensorArg::new(
                "scale",
                TensorShape::matrix(4, 32),
                ElemType::F16,
            ))
            .with_input(TensorArg::new(
                "group_index",
                TensorShape::vector(4),
                ElemType::I32,
            ))
            .validate()
            .unwrap();
        let profile = DeviceProfile::datacenter();
        let r = PlanContext::read(&desc, &profile);
        assert!(matches!(r, Err(PlanError::BadShape { .. })));
    }

    #[test]
    fn test_extract_rejects_odd_cols_for_int4() {
        let desc = op_descriptor::OperatorDescriptor::new(OpKind::GroupQuant)
            .with_input(TensorArg::new(
                "x",
                TensorShape::matrix(16, 63),
                ElemType::F16,
            ))
            .with_input(TensorArg::new(
                "scale",
                TensorShape::matrix(4, 63),
                ElemType::F16,
            ))
            .with_input(TensorArg::new(
                "group_index",
                TensorShape::vector(4),
                ElemType::I32,
            ))
            .with_attr("dst_type", AttrValue::Str("int4".into()))
            .validate()
            .unwrap();
        let profile = DeviceProfile::datacenter();
        let r = PlanContext::read(&desc, &profile);
        assert!(matches!(r, Err(PlanError::BadShape { .. })));
    }

    #[test]
    fn test_extract_rejects_mixed_foreach_elem_types() {
        let desc = op_descriptor::OperatorDescriptor::new(OpKind::ForeachUnary)
            .with_input(TensorArg::new(
                "x0",
                TensorShape::vector(64),
                ElemType::F32,
            ))
            .with_input(TensorArg::new(
                "x1",
                TensorShape::vector(64),
                ElemType::F16,
            ))
            .validate()
            .unwrap();
        let profile = DeviceProfile::edge();
        let r = PlanContext::read(&desc, &profile);
        assert!(matches!(r, Err(PlanError::BadShape { .. })));
    }
}
