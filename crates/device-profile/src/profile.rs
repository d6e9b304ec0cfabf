// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The accelerator resource profile consumed by the planner.

use crate::{Capacity, ProfileError};

/// Static resource description of one accelerator target.
///
/// Immutable, supplied once per planning call. The planner reads it in its
/// first pipeline phase and threads it through every later computation; no
/// global platform state exists anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeviceProfile {
    /// Number of parallel compute units (execution lanes).
    pub compute_units: u32,
    /// Scratch memory owned by each compute unit, in bytes.
    pub scratch_bytes_per_unit: u64,
    /// Shared staging memory available for workspace spill, in bytes.
    pub shared_staging_bytes: u64,
}

impl DeviceProfile {
    /// Creates a profile from explicit capacities.
    pub fn new(compute_units: u32, scratch_per_unit: Capacity, shared_staging: Capacity) -> Self {
        Self {
            compute_units,
            scratch_bytes_per_unit: scratch_per_unit.as_bytes(),
            shared_staging_bytes: shared_staging.as_bytes(),
        }
    }

    /// A small edge accelerator: 8 units, 128 KiB scratch each, 48 MiB staging.
    pub fn edge() -> Self {
        Self::new(8, Capacity::from_kb(128), Capacity::from_mb(48))
    }

    /// A datacenter accelerator: 48 units, 192 KiB scratch each, 64 MiB staging.
    pub fn datacenter() -> Self {
        Self::new(48, Capacity::from_kb(192), Capacity::from_mb(64))
    }

    /// Looks up a named preset.
    pub fn preset(name: &str) -> Result<Self, ProfileError> {
        match name {
            "edge" => Ok(Self::edge()),
            "datacenter" => Ok(Self::datacenter()),
            _ => Err(ProfileError::UnknownPreset {
                name: name.into(),
                available: "edge, datacenter",
            }),
        }
    }

    /// Checks the profile describes a usable device.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.compute_units == 0 {
            return Err(ProfileError::NoComputeUnits);
        }
        if self.scratch_bytes_per_unit == 0 || self.shared_staging_bytes == 0 {
            return Err(ProfileError::ZeroCapacity);
        }
        Ok(())
    }

    /// Returns a human-readable one-line summary.
    pub fn summary(&self) -> String {
        format!(
            "{} units × {} scratch, {} staging",
            self.compute_units,
            Capacity::from_bytes(self.scratch_bytes_per_unit),
            Capacity::from_bytes(self.shared_staging_bytes),
        )
    }
}
