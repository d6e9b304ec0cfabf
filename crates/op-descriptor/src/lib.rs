// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # op-descriptor
//!
//! The validated input side of the tiling planner: tensor shapes, element
//! types, and typed operator attributes, bundled into an
//! [`OperatorDescriptor`].
//!
//! # Type-State Validation
//!
//! A descriptor is deserialized (or built programmatically) in the `Draft`
//! state and must pass [`OperatorDescriptor::validate`] before the planner
//! will accept it:
//!
//! ```text
//! OperatorDescriptor<Draft>      — as parsed, unchecked.
//! OperatorDescriptor<Validated>  — dims positive, inputs present,
//!                                  ready for planning.
//! ```
//!
//! The transition is zero runtime cost — the marker types are `PhantomData`
//! (ZST), so the compiler enforces that unvalidated descriptors never reach
//! the planner.
//!
//! # Example
//! ```
//! use op_descriptor::{AttrValue, ElemType, OpKind, OperatorDescriptor, TensorArg, TensorShape};
//!
//! let desc = OperatorDescriptor::new(OpKind::ForeachUnary)
//!     .with_input(TensorArg::new("x0", TensorShape::new(vec![100]), ElemType::F32))
//!     .with_input(TensorArg::new("x1", TensorShape::new(vec![60]), ElemType::F32))
//!     .validate()
//!     .unwrap();
//! assert_eq!(desc.num_inputs(), 2);
//! ```

mod attrs;
mod descriptor;
mod elem;
mod error;
mod shape;

pub use attrs::{AttrMap, AttrValue};
pub use descriptor::{DescState, Draft, OpKind, OperatorDescriptor, TensorArg, Validated};
pub use elem::ElemType;
pub use error::DescriptorError;
pub use shape::TensorShape;
