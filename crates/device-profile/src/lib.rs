// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # device-profile
//!
//! Static resource description of the target accelerator: how many compute
//! units it has, how much scratch memory each unit owns, and how much shared
//! staging memory is available for workspace spill.
//!
//! A [`DeviceProfile`] is supplied once per planning call by an external
//! device-query pass; the planner treats it as immutable. For CLI and test
//! ergonomics this crate also ships named presets and human-readable
//! capacity parsing (`"192K"`, `"64M"`).
//!
//! # Example
//! ```
//! use device_profile::{Capacity, DeviceProfile};
//!
//! let p = DeviceProfile::preset("datacenter").unwrap();
//! assert_eq!(p.compute_units, 48);
//!
//! let custom = DeviceProfile::new(8, Capacity::parse("128K").unwrap(), Capacity::from_mb(48));
//! assert_eq!(custom.scratch_bytes_per_unit, 128 * 1024);
//! ```

mod capacity;
mod error;
mod profile;

pub use capacity::Capacity;
pub use error::ProfileError;
pub use profile::DeviceProfile;
