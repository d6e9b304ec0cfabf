// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for device profiles.

/// Errors that can occur while building or parsing a device profile.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// A capacity string could not be parsed.
    #[error("invalid capacity string '{input}': expected a number with an optional K/M/G suffix")]
    InvalidCapacity { input: String },

    /// A capacity computation overflowed.
    #[error("capacity overflow in '{input}'")]
    CapacityOverflow { input: String },

    /// A capacity of zero bytes is never meaningful for planning.
    #[error("capacity must be non-zero")]
    ZeroCapacity,

    /// The profile describes a device with no compute units.
    #[error("device profile has zero compute units")]
    NoComputeUnits,

    /// Unknown preset name.
    #[error("unknown device preset '{name}' (available: {available})")]
    UnknownPreset { name: String, available: &'static str },
}
