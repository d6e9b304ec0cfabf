// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor shape descriptors.

use crate::ElemType;
use std::fmt;

/// Describes the dimensionality of one operator input or output.
///
/// Shapes are immutable once created. Dimensions are signed (`i64`) because
/// that is the unit the emitted plan traffics in; validation rejects
/// non-positive dims before planning ever sees them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TensorShape {
    dims: Vec<i64>,
}

impl TensorShape {
    /// Creates a new shape from the given dimensions.
    ///
    /// # Examples
    /// ```
    /// use op_descriptor::TensorShape;
    /// let s = TensorShape::new(vec![2, 3, 4]);
    /// assert_eq!(s.rank(), 3);
    /// assert_eq!(s.num_elements(), 24);
    /// ```
    pub fn new(dims: Vec<i64>) -> Self {
        Self { dims }
    }

    /// Creates a 1-D shape.
    pub fn vector(len: i64) -> Self {
        Self { dims: vec![len] }
    }

    /// Creates a 2-D shape.
    pub fn matrix(rows: i64, cols: i64) -> Self {
        Self {
            dims: vec![rows, cols],
        }
    }

    /// Returns the number of dimensions (rank).
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the total number of elements, saturating at `i64::MAX`.
    ///
    /// For a scalar shape (rank 0), returns 1. Shapes whose element count
    /// overflows `i64` never survive [`crate::OperatorDescriptor::validate`],
    /// so validated callers always see the exact count.
    pub fn num_elements(&self) -> i64 {
        self.checked_num_elements().unwrap_or(i64::MAX)
    }

    /// Returns the total number of elements, or `None` when the product
    /// overflows `i64`.
    pub fn checked_num_elements(&self) -> Option<i64> {
        self.dims.iter().try_fold(1i64, |acc, &d| acc.checked_mul(d))
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[i64] {
        &self.dims
    }

    /// Returns the size of a specific dimension, or `None` if out of bounds.
    pub fn dim(&self, index: usize) -> Option<i64> {
        self.dims.get(index).copied()
    }

    /// Returns `true` if every dimension is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.dims.iter().all(|&d| d > 0)
    }

    /// Computes the memory footprint in bytes for a given element type,
    /// saturating at `i64::MAX`.
    pub fn size_bytes(&self, elem: ElemType) -> i64 {
        self.num_elements()
            .saturating_mul(i64::from(elem.width_bytes()))
    }
}

impl fmt::Display for TensorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}
