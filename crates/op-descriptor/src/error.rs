// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for operator descriptors.

use crate::TensorShape;

/// Errors that can occur while validating an operator descriptor.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// The descriptor declares no input tensors.
    #[error("operator '{op}' has no input tensors")]
    NoInputs { op: &'static str },

    /// An input tensor has a non-positive dimension.
    #[error("input '{name}' has non-positive shape {shape}")]
    NonPositiveShape { name: String, shape: TensorShape },

    /// An input tensor's element count does not fit an `i64`.
    #[error("input '{name}' shape {shape} has an element count beyond i64 range")]
    ElementCountOverflow { name: String, shape: TensorShape },

    /// A required attribute is missing.
    #[error("missing attribute '{name}'")]
    MissingAttr { name: &'static str },

    /// An attribute exists but holds the wrong type of value.
    #[error("attribute '{name}' has wrong type: expected {expected}")]
    AttrTypeMismatch {
        name: &'static str,
        expected: &'static str,
    },

    /// An attribute holds a value outside its allowed set.
    #[error("attribute '{name}' has unsupported value '{value}'")]
    AttrValueUnsupported { name: &'static str, value: String },
}
