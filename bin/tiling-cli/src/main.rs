// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tile-plan
//!
//! Command-line interface for the tiling planner.
//!
//! ## Usage
//! ```bash
//! # Plan an operator invocation against a device preset
//! tile-plan plan --descriptor ./op.json --profile edge
//!
//! # Custom device geometry, machine-readable output
//! tile-plan plan --descriptor ./op.json --units 16 --scratch 96K --staging 32M --json
//!
//! # List the built-in device presets
//! tile-plan profiles
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tile-plan",
    about = "Resource-aware execution-plan generator for accelerator kernels",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan one operator invocation and print the resulting schedule.
    Plan {
        /// Path to the operator descriptor (JSON).
        #[arg(short, long)]
        descriptor: std::path::PathBuf,

        /// Device preset: edge, datacenter. Ignored when --units is given.
        #[arg(short, long, default_value = "edge")]
        profile: String,

        /// Custom device: number of compute units.
        #[arg(long)]
        units: Option<u32>,

        /// Custom device: scratch memory per unit (e.g., "128K").
        #[arg(long, default_value = "128K")]
        scratch: String,

        /// Custom device: shared staging memory (e.g., "48M").
        #[arg(long, default_value = "48M")]
        staging: String,

        /// Emit the plan summary as JSON instead of a table.
        #[arg(long)]
        json: bool,

        /// Also dump the encoded plan record as hex.
        #[arg(long)]
        hex: bool,
    },

    /// List the built-in device presets.
    Profiles,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Plan {
            descriptor,
            profile,
            units,
            scratch,
            staging,
            json,
            hex,
        } => commands::plan::execute(descriptor, profile, units, scratch, staging, json, hex),
        Commands::Profiles => commands::profiles::execute(),
    }
}
