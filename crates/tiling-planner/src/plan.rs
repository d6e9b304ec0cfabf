// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Execution-plan records: the byte-layout contract with the device kernel.
//!
//! A plan record is a fixed schema of primitive fields (`i64`, `u32`, `f32`,
//! fixed-size arrays thereof) written little-endian into a caller-owned
//! buffer in declaration order. Records declare their widest fields first so
//! natural alignment introduces no padding; the layout is identical across
//! repeated calls for the same operator family and is treated as a stable
//! ABI between planner and kernel loader. The record is written once and
//! never mutated afterward.
//!
//! `serde` never touches this path — the device reads raw offsets.

use crate::PlanError;

/// Alignment granularity of device memory transfers, in bytes.
pub const BYTE_BLOCK: u32 = 32;

/// Upper bound on tensors in one ragged workload; the plan record carries
/// fixed-size tables of this length.
pub const MAX_TENSORS: usize = 256;

/// Upper bound on compute units a plan can address.
pub const MAX_UNITS: usize = 64;

/// What a successful planning call hands back to the host compiler.
///
/// The encoded record itself lands in the caller's buffer; this summary
/// carries the scheduling contract the device dispatcher needs up front.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PlanSummary {
    /// Strategy that produced the plan.
    pub strategy: &'static str,
    /// Compute units the plan schedules (the kernel's block dim).
    pub compute_units_used: u32,
    /// Shared staging bytes the kernel requires.
    pub workspace_bytes: u64,
    /// Kernel-variant selector (see [`DispatchAxes`]).
    pub dispatch_key: u64,
    /// Bytes written into the caller's plan buffer.
    pub plan_bytes: usize,
}

// ── Dispatch key ───────────────────────────────────────────────────

/// The orthogonal categorical axes folded into a dispatch key.
///
/// Each axis carries a distinct power-of-ten weight so the resulting
/// integer uniquely identifies the combination and stays readable in logs:
/// element class at weight 1, optional-input presence at 10, quantization
/// mode at 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchAxes {
    /// Element-type class (1 = half, 2 = float, 3 = int).
    pub elem_class: u64,
    /// Whether the operator's optional input is present.
    pub has_optional: bool,
    /// Small enumerated mode (operator-family specific, < 10).
    pub mode: u64,
}

impl DispatchAxes {
    const OPTIONAL_WEIGHT: u64 = 10;
    const MODE_WEIGHT: u64 = 100;

    /// Folds the axes into the integer key the device dispatcher decodes.
    pub fn compose(self) -> u64 {
        debug_assert!(self.elem_class < Self::OPTIONAL_WEIGHT);
        debug_assert!(self.mode < 10);
        self.elem_class
            + u64::from(self.has_optional) * Self::OPTIONAL_WEIGHT
            + self.mode * Self::MODE_WEIGHT
    }

    /// Recovers the axes from a key; the inverse of [`Self::compose`].
    pub fn decompose(key: u64) -> Self {
        Self {
            elem_class: key % Self::OPTIONAL_WEIGHT,
            has_optional: (key / Self::OPTIONAL_WEIGHT) % 10 != 0,
            mode: (key / Self::MODE_WEIGHT) % 10,
        }
    }
}

// ── Record trait ───────────────────────────────────────────────────

/// A fixed-layout plan record that can be emitted into a caller buffer.
pub trait PlanRecord: std::fmt::Debug {
    /// Exact number of bytes [`Self::encode_into`] will write.
    fn serialized_size(&self) -> usize;

    /// Writes the record into `buffer`, returning the bytes written.
    ///
    /// Fails with a capacity error when the buffer is too small; nothing is
    /// written in that case.
    fn encode_into(&self, buffer: &mut [u8]) -> Result<usize, PlanError>;
}

// ── Field-level writer / reader ────────────────────────────────────

/// Sequential little-endian field writer used by record implementations.
pub(crate) struct PlanWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> PlanWriter<'a> {
    /// Starts a writer after checking the record fits the buffer whole.
    pub fn begin(buf: &'a mut [u8], needed: usize) -> Result<Self, PlanError> {
        if needed > buf.len() {
            return Err(PlanError::BufferTooSmall {
                needed,
                available: buf.len(),
            });
        }
        Ok(Self { buf, pos: 0 })
    }

    pub fn put_i64(&mut self, v: i64) {
        self.put_bytes(&v.to_le_bytes());
    }

    pub fn put_u32(&mut self, v: u32) {
        self.put_bytes(&v.to_le_bytes());
    }

    pub fn put_i64_slice(&mut self, vs: &[i64]) {
        for &v in vs {
            self.put_i64(v);
        }
    }

    pub fn put_u32_slice(&mut self, vs: &[u32]) {
        for &v in vs {
            self.put_u32(v);
        }
    }

    pub fn finish(self) -> usize {
        self.pos
    }

    fn put_bytes(&mut self, bytes: &[u8]) {
        // `begin` sized the buffer; a miss here is a record bug.
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }
}

/// Sequential little-endian field reader; the decode mirror of
/// [`PlanWriter`], used by tests and the CLI inspector.
pub(crate) struct PlanReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> PlanReader<'a> {
    pub fn begin(buf: &'a [u8], needed: usize) -> Result<Self, PlanError> {
        if needed > buf.len() {
            return Err(PlanError::BufferTooSmall {
                needed,
                available: buf.len(),
            });
        }
        Ok(Self { buf, pos: 0 })
    }

    pub fn get_i64(&mut self) -> i64 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&self.buf[self.pos..self.pos + 8]);
        self.pos += 8;
        i64::from_le_bytes(raw)
    }

    pub fn get_u32(&mut self) -> u32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.buf[self.pos..self.pos + 4]);
        self.pos += 4;
        u32::from_le_bytes(raw)
    }

    pub fn get_i64_array<const N: usize>(&mut self) -> [i64; N] {
        let mut out = [0i64; N];
        for slot in &mut out {
            *slot = self.get_i64();
        }
        out
    }

    pub fn get_u32_array<const N: usize>(&mut self) -> [u32; N] {
        let mut out = [0u32; N];
        for slot in &mut out {
            *slot = self.get_u32();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_key_round_trip() {
        for elem_class in 1..=3u64 {
            for has_optional in [false, true] {
                for mode in 0..4u64 {
                    let axes = DispatchAxes {
                        elem_class,
                        has_optional,
                        mode,
                    };
                    assert_eq!(DispatchAxes::decompose(axes.compose()), axes);
                }
            }
        }
    }

    #[test]
    fn test_dispatch_key_values_are_readable() {
        let axes = DispatchAxes {
            elem_class: 2,
            has_optional: true,
            mode: 1,
        };
        assert_eq!(axes.compose(), 112);
    }

    #[test]
    fn test_writer_reader_round_trip() {
        let mut buf = [0u8; 64];
        let mut w = PlanWriter::begin(&mut buf, 8 + 16 + 4).unwrap();
        w.put_i64(-7);
        w.put_i64_slice(&[1, i64::MAX]);
        w.put_u32(42);
        assert_eq!(w.finish(), 28);

        let mut r = PlanReader::begin(&buf, 28).unwrap();
        assert_eq!(r.get_i64(), -7);
        assert_eq!(r.get_i64_array::<2>(), [1, i64::MAX]);
        assert_eq!(r.get_u32(), 42);
    }

    #[test]
    fn test_writer_rejects_short_buffer() {
        let mut buf = [0u8; 8];
        let r = PlanWriter::begin(&mut buf, 16);
        assert!(matches!(r, Err(PlanError::BufferTooSmall { .. })));
    }
}
