// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Supported tensor element types.

/// Enumerates the element types a planned operator can consume.
///
/// The planner uses `ElemType` for three things: computing per-element byte
/// costs, deriving the alignment granularity in elements from the 32-byte
/// transfer block, and contributing the element-class axis of the dispatch
/// key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElemType {
    /// 32-bit IEEE 754 floating point.
    F32,
    /// 16-bit IEEE 754 floating point.
    F16,
    /// 16-bit brain floating point.
    BF16,
    /// 32-bit signed integer.
    I32,
    /// 8-bit signed integer (quantised data).
    I8,
}

impl ElemType {
    /// Returns the size of a single element in bytes.
    pub fn width_bytes(self) -> u8 {
        match self {
            ElemType::F32 => 4,
            ElemType::F16 => 2,
            ElemType::BF16 => 2,
            ElemType::I32 => 4,
            ElemType::I8 => 1,
        }
    }

    /// Returns the dispatch-key class of this element type.
    ///
    /// Half-width floats share a kernel specialization (class 1), full-width
    /// floats are class 2, and integer types are class 3.
    pub fn key_class(self) -> u64 {
        match self {
            ElemType::F16 | ElemType::BF16 => 1,
            ElemType::F32 => 2,
            ElemType::I32 | ElemType::I8 => 3,
        }
    }

    /// Returns a human-readable label for this element type.
    pub fn as_str(self) -> &'static str {
        match self {
            ElemType::F32 => "f32",
            ElemType::F16 => "f16",
            ElemType::BF16 => "bf16",
            ElemType::I32 => "i32",
            ElemType::I8 => "i8",
        }
    }
}

impl std::fmt::Display for ElemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths() {
        assert_eq!(ElemType::F32.width_bytes(), 4);
        assert_eq!(ElemType::F16.width_bytes(), 2);
        assert_eq!(ElemType::BF16.width_bytes(), 2);
        assert_eq!(ElemType::I8.width_bytes(), 1);
    }

    #[test]
    fn test_key_classes_are_distinct_per_kernel_family() {
        assert_eq!(ElemType::F16.key_class(), ElemType::BF16.key_class());
        assert_ne!(ElemType::F32.key_class(), ElemType::F16.key_class());
        assert_ne!(ElemType::F32.key_class(), ElemType::I32.key_class());
    }

    #[test]
    fn test_serde_lowercase() {
        let e: ElemType = serde_json::from_str("\"bf16\"").unwrap();
        assert_eq!(e, ElemType::BF16);
        assert_eq!(serde_json::to_string(&ElemType::F32).unwrap(), "\"f32\"");
    }
}
