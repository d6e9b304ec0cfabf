// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The operator descriptor and its `Draft → Validated` type-state.
//!
//! Shape and attribute *inference* happens upstream in the host compiler;
//! this module only rejects obviously-impossible inputs (no tensors,
//! non-positive dims) so the planner can assume positive element counts
//! throughout.

use crate::{AttrMap, AttrValue, DescriptorError, ElemType, TensorShape};
use std::marker::PhantomData;

/// The operator family being planned.
///
/// Each kind maps to a priority-ordered chain of strategy candidates in the
/// planner's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    /// Element-wise op over a ragged tensor list, one live operand list
    /// (e.g. in-place negate, log).
    ForeachUnary,
    /// Element-wise op combining two ragged tensor lists.
    ForeachBinaryList,
    /// Point-wise op over four ragged tensor lists (addcmul/addcdiv style).
    ForeachPointwiseList,
    /// Per-group quantization of a 2-D activation against grouped scales.
    GroupQuant,
}

impl OpKind {
    /// Returns `true` for the ragged foreach family.
    pub fn is_foreach(self) -> bool {
        matches!(
            self,
            OpKind::ForeachUnary | OpKind::ForeachBinaryList | OpKind::ForeachPointwiseList
        )
    }

    /// Returns a human-readable label for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            OpKind::ForeachUnary => "foreach_unary",
            OpKind::ForeachBinaryList => "foreach_binary_list",
            OpKind::ForeachPointwiseList => "foreach_pointwise_list",
            OpKind::GroupQuant => "group_quant",
        }
    }
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named input tensor: shape plus element type.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TensorArg {
    /// Name of the input (positional contract is per operator family).
    pub name: String,
    /// Dimensions.
    pub shape: TensorShape,
    /// Element type.
    pub elem: ElemType,
}

impl TensorArg {
    /// Creates a new input tensor argument.
    pub fn new(name: impl Into<String>, shape: TensorShape, elem: ElemType) -> Self {
        Self {
            name: name.into(),
            shape,
            elem,
        }
    }

    /// Number of elements in this input.
    pub fn num_elements(&self) -> i64 {
        self.shape.num_elements()
    }
}

// ── Type-state markers ─────────────────────────────────────────────

/// Marker: descriptor as parsed, unchecked.
#[derive(Debug, Clone, Copy)]
pub struct Draft;

/// Marker: descriptor checked, ready for planning.
#[derive(Debug, Clone, Copy)]
pub struct Validated;

/// Sealed set of descriptor states.
pub trait DescState: sealed::Sealed {}
impl DescState for Draft {}
impl DescState for Validated {}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Draft {}
    impl Sealed for super::Validated {}
}

/// A single operator invocation as seen by the planner.
///
/// Immutable input: ordered tensor arguments plus a typed attribute map.
/// Deserializes in the [`Draft`] state; call [`OperatorDescriptor::validate`]
/// to obtain the `Validated` descriptor the planner entry point requires.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(bound = "")]
pub struct OperatorDescriptor<S: DescState = Draft> {
    /// Operator family.
    pub kind: OpKind,
    /// Ordered input tensors.
    inputs: Vec<TensorArg>,
    /// Typed attributes.
    attrs: AttrMap,
    #[serde(skip, default)]
    _state: PhantomData<S>,
}

impl OperatorDescriptor<Draft> {
    /// Creates an empty draft descriptor for the given operator kind.
    pub fn new(kind: OpKind) -> Self {
        Self {
            kind,
            inputs: Vec::new(),
            attrs: AttrMap::new(),
            _state: PhantomData,
        }
    }

    /// Appends an input tensor (builder style).
    pub fn with_input(mut self, arg: TensorArg) -> Self {
        self.inputs.push(arg);
        self
    }

    /// Sets an attribute (builder style).
    pub fn with_attr(mut self, name: impl Into<String>, value: AttrValue) -> Self {
        self.attrs.set(name, value);
        self
    }

    /// Validates the descriptor and transitions to the `Validated` state.
    ///
    /// Checks:
    /// - At least one input tensor is present.
    /// - Every input dimension is strictly positive (zero-sized tensors are
    ///   rejected here; the planner never sees them).
    /// - Every input's element count fits an `i64` (the planner's counting
    ///   arithmetic relies on exact products).
    pub fn validate(self) -> Result<OperatorDescriptor<Validated>, DescriptorError> {
        if self.inputs.is_empty() {
            return Err(DescriptorError::NoInputs {
                op: self.kind.as_str(),
            });
        }
        for arg in &self.inputs {
            if !arg.shape.is_positive() {
                return Err(DescriptorError::NonPositiveShape {
                    name: arg.name.clone(),
                    shape: arg.shape.clone(),
                });
            }
            if arg.shape.checked_num_elements().is_none() {
                return Err(DescriptorError::ElementCountOverflow {
                    name: arg.name.clone(),
                    shape: arg.shape.clone(),
                });
            }
        }
        Ok(OperatorDescriptor {
            kind: self.kind,
            inputs: self.inputs,
            attrs: self.attrs,
            _state: PhantomData,
        })
    }
}

impl<S: DescState> OperatorDescriptor<S> {
    /// Returns the ordered input tensors.
    pub fn inputs(&self) -> &[TensorArg] {
        &self.inputs
    }

    /// Returns the number of inputs.
    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Returns the input at `index`, if present.
    pub fn input(&self, index: usize) -> Option<&TensorArg> {
        self.inputs.get(index)
    }

    /// Returns the attribute map.
    pub fn attrs(&self) -> &AttrMap {
        &self.attrs
    }
}

impl OperatorDescriptor<Validated> {
    /// Per-tensor element counts in input order.
    pub fn element_counts(&self) -> Vec<i64> {
        self.inputs.iter().map(TensorArg::num_elements).collect()
    }

    /// Total elements across all inputs.
    pub fn total_elements(&self) -> i64 {
        self.inputs.iter().map(TensorArg::num_elements).sum()
    }
}
