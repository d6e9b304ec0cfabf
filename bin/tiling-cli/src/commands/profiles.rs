// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tile-plan profiles` command: list the built-in device presets.

use device_profile::DeviceProfile;

pub fn execute() -> anyhow::Result<()> {
    println!(
        "  {:<12} {:>6} {:>14} {:>14}",
        "Preset", "Units", "Scratch/unit", "Staging"
    );
    println!("  {}", "-".repeat(50));

    for (name, profile) in [
        ("edge", DeviceProfile::edge()),
        ("datacenter", DeviceProfile::datacenter()),
    ] {
        println!(
            "  {:<12} {:>6} {:>11} KiB {:>10} MiB",
            name,
            profile.compute_units,
            profile.scratch_bytes_per_unit / 1024,
            profile.shared_staging_bytes / (1024 * 1024),
        );
    }

    Ok(())
}
