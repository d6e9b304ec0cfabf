// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tile-plan plan` command: plan one operator invocation.
//!
//! Reads a draft descriptor from JSON, validates it, resolves a device
//! profile (preset or custom geometry), runs the planner, and prints the
//! resulting schedule.

use std::path::PathBuf;

use anyhow::Context;
use device_profile::{Capacity, DeviceProfile};
use op_descriptor::OperatorDescriptor;

/// Large enough for every built-in plan record.
const PLAN_BUFFER_BYTES: usize = 4096;

#[allow(clippy::too_many_arguments)]
pub fn execute(
    descriptor: PathBuf,
    profile: String,
    units: Option<u32>,
    scratch: String,
    staging: String,
    json: bool,
    hex: bool,
) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&descriptor)
        .with_context(|| format!("failed to read descriptor '{}'", descriptor.display()))?;
    let draft: OperatorDescriptor = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse descriptor '{}'", descriptor.display()))?;
    let desc = draft.validate().context("descriptor rejected")?;

    let profile = resolve_profile(&profile, units, &scratch, &staging)?;
    tracing::info!(op = %desc.kind, profile = %profile.summary(), "planning");

    let mut buf = vec![0u8; PLAN_BUFFER_BYTES];
    let summary = tiling_planner::plan(&desc, &profile, &mut buf)
        .with_context(|| format!("planning failed for operator '{}'", desc.kind))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("  Operator:       {}", desc.kind);
        println!("  Strategy:       {}", summary.strategy);
        println!("  Compute units:  {}", summary.compute_units_used);
        println!("  Workspace:      {} B", summary.workspace_bytes);
        println!("  Dispatch key:   {}", summary.dispatch_key);
        println!("  Plan record:    {} B", summary.plan_bytes);
    }

    if hex {
        println!();
        dump_hex(&buf[..summary.plan_bytes]);
    }

    Ok(())
}

fn resolve_profile(
    preset: &str,
    units: Option<u32>,
    scratch: &str,
    staging: &str,
) -> anyhow::Result<DeviceProfile> {
    match units {
        Some(n) => {
            let scratch = Capacity::parse(scratch).context("invalid --scratch")?;
            let staging = Capacity::parse(staging).context("invalid --staging")?;
            Ok(DeviceProfile::new(n, scratch, staging))
        }
        None => DeviceProfile::preset(preset).map_err(Into::into),
    }
}

fn dump_hex(bytes: &[u8]) {
    for (row, chunk) in bytes.chunks(16).enumerate() {
        let hexes: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
        println!("  {:06x}  {}", row * 16, hexes.join(" "));
    }
}
