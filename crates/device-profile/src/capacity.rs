// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Byte-capacity newtype with human-readable parsing.
//!
//! Capacities are hard ceilings: the planner never schedules a tile whose
//! cost exceeds the capacity it was solved against.

use crate::ProfileError;
use std::fmt;

/// A memory capacity in bytes.
///
/// # Parsing
/// Supports SI-style suffixes, case-insensitive:
/// - `"192K"` or `"192KB"` → 192 × 1024 bytes
/// - `"64M"` or `"64MB"` → 64 × 1024² bytes
/// - `"1G"` or `"1GB"` → 1 × 1024³ bytes
/// - `"196608"` → raw byte count
///
/// # Examples
/// ```
/// use device_profile::Capacity;
///
/// let c = Capacity::parse("192K").unwrap();
/// assert_eq!(c.as_bytes(), 192 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Capacity {
    bytes: u64,
}

impl Capacity {
    /// Creates a capacity from a byte count.
    pub fn from_bytes(bytes: u64) -> Self {
        Self { bytes }
    }

    /// Creates a capacity from kibibytes.
    pub fn from_kb(kb: u64) -> Self {
        Self { bytes: kb * 1024 }
    }

    /// Creates a capacity from mebibytes.
    pub fn from_mb(mb: u64) -> Self {
        Self {
            bytes: mb * 1024 * 1024,
        }
    }

    /// Returns the capacity in bytes.
    pub fn as_bytes(&self) -> u64 {
        self.bytes
    }

    /// Parses a human-readable capacity string.
    ///
    /// Accepted formats: `"192K"`, `"192KB"`, `"64M"`, `"1G"`, or a plain
    /// byte count like `"196608"`. Case-insensitive.
    pub fn parse(s: &str) -> Result<Self, ProfileError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ProfileError::InvalidCapacity { input: s.into() });
        }

        let upper = s.to_uppercase();
        let (num_str, multiplier): (&str, u64) = if upper.ends_with("GB") {
            (&s[..s.len() - 2], 1024 * 1024 * 1024)
        } else if upper.ends_with('G') {
            (&s[..s.len() - 1], 1024 * 1024 * 1024)
        } else if upper.ends_with("MB") {
            (&s[..s.len() - 2], 1024 * 1024)
        } else if upper.ends_with('M') {
            (&s[..s.len() - 1], 1024 * 1024)
        } else if upper.ends_with("KB") {
            (&s[..s.len() - 2], 1024)
        } else if upper.ends_with('K') {
            (&s[..s.len() - 1], 1024)
        } else if upper.ends_with('B') {
            (&s[..s.len() - 1], 1)
        } else {
            (s, 1)
        };

        let value: u64 = num_str
            .trim()
            .parse()
            .map_err(|_| ProfileError::InvalidCapacity { input: s.into() })?;

        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| ProfileError::CapacityOverflow { input: s.into() })?;

        if bytes == 0 {
            return Err(ProfileError::ZeroCapacity);
        }

        Ok(Self { bytes })
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const KB: u64 = 1024;
        const MB: u64 = 1024 * 1024;
        const GB: u64 = 1024 * 1024 * 1024;
        if self.bytes >= GB && self.bytes % GB == 0 {
            write!(f, "{}G", self.bytes / GB)
        } else if self.bytes >= MB && self.bytes % MB == 0 {
            write!(f, "{}M", self.bytes / MB)
        } else if self.bytes >= KB && self.bytes % KB == 0 {
            write!(f, "{}K", self.bytes / KB)
        } else {
            write!(f, "{}B", self.bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_suffixes() {
        assert_eq!(Capacity::parse("192K").unwrap().as_bytes(), 192 * 1024);
        assert_eq!(Capacity::parse("192kb").unwrap().as_bytes(), 192 * 1024);
        assert_eq!(Capacity::parse("64M").unwrap().as_bytes(), 64 * 1024 * 1024);
        assert_eq!(Capacity::parse("1G").unwrap().as_bytes(), 1 << 30);
        assert_eq!(Capacity::parse("4096").unwrap().as_bytes(), 4096);
        assert_eq!(Capacity::parse("512B").unwrap().as_bytes(), 512);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Capacity::parse("").is_err());
        assert!(Capacity::parse("12Q").is_err());
        assert!(Capacity::parse("K").is_err());
        assert!(matches!(
            Capacity::parse("0M"),
            Err(ProfileError::ZeroCapacity)
        ));
    }

    #[test]
    fn test_display_round_trips_suffix() {
        assert_eq!(Capacity::from_kb(192).to_string(), "192K");
        assert_eq!(Capacity::from_mb(64).to_string(), "64M");
        assert_eq!(Capacity::from_bytes(100).to_string(), "100B");
    }
}
