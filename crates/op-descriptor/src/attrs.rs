// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Typed operator attributes.
//!
//! Attributes arrive from the host graph as loosely typed name/value pairs.
//! [`AttrMap`] stores them in a [`std::collections::BTreeMap`] so iteration
//! order (and therefore everything derived from it) is deterministic, and
//! exposes typed getters that surface [`DescriptorError`] on mismatch.

use crate::DescriptorError;
use std::collections::BTreeMap;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating-point scalar.
    Float(f64),
    /// String / enumeration token.
    Str(String),
}

impl AttrValue {
    /// Returns a label for the contained type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Bool(_) => "bool",
            AttrValue::Int(_) => "int",
            AttrValue::Float(_) => "float",
            AttrValue::Str(_) => "str",
        }
    }
}

/// Name → value attribute mapping with typed accessors.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AttrMap {
    entries: BTreeMap<String, AttrValue>,
}

impl AttrMap {
    /// Creates an empty attribute map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an attribute, replacing any previous value under the name.
    pub fn set(&mut self, name: impl Into<String>, value: AttrValue) {
        self.entries.insert(name.into(), value);
    }

    /// Returns the raw value for `name`, if present.
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries.get(name)
    }

    /// Returns `true` if no attributes are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Typed getter: boolean attribute, or `default` when absent.
    pub fn bool_or(&self, name: &'static str, default: bool) -> Result<bool, DescriptorError> {
        match self.entries.get(name) {
            None => Ok(default),
            Some(AttrValue::Bool(b)) => Ok(*b),
            Some(_) => Err(DescriptorError::AttrTypeMismatch {
                name,
                expected: "bool",
            }),
        }
    }

    /// Typed getter: integer attribute, or `default` when absent.
    pub fn int_or(&self, name: &'static str, default: i64) -> Result<i64, DescriptorError> {
        match self.entries.get(name) {
            None => Ok(default),
            Some(AttrValue::Int(v)) => Ok(*v),
            Some(_) => Err(DescriptorError::AttrTypeMismatch {
                name,
                expected: "int",
            }),
        }
    }

    /// Typed getter: required string attribute.
    pub fn str_required(&self, name: &'static str) -> Result<&str, DescriptorError> {
        match self.entries.get(name) {
            None => Err(DescriptorError::MissingAttr { name }),
            Some(AttrValue::Str(s)) => Ok(s),
            Some(_) => Err(DescriptorError::AttrTypeMismatch {
                name,
                expected: "str",
            }),
        }
    }

    /// Typed getter: string attribute, or `default` when absent.
    pub fn str_or<'a>(
        &'a self,
        name: &'static str,
        default: &'a str,
    ) -> Result<&'a str, DescriptorError> {
        match self.entries.get(name) {
            None => Ok(default),
            Some(AttrValue::Str(s)) => Ok(s),
            Some(_) => Err(DescriptorError::AttrTypeMismatch {
                name,
                expected: "str",
            }),
        }
    }
}
