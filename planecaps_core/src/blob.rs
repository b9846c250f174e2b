// Copyright 2026 the Planecaps Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capability blob decoding.
//!
//! The device attaches a fixed-layout restriction blob to each channel. The
//! layout is versionless and made of little-endian fixed-width fields:
//!
//! ```text
//! offset  field
//! ------  ---------------------------------------------------------------
//!      0  id: i32
//!      4  reserved: u32
//!      8  attr: u64
//!     16  src_f_w, src_f_h, src_w, src_h          4 x {min, max, align}: u32
//!     64  src_x_align, src_y_align                u32
//!     72  dst_f_w, dst_f_h, dst_w, dst_h          4 x {min, max, align}: u32
//!    120  dst_x_align, dst_y_align                u32
//!    128  blk_w, blk_h                            2 x {min, max, align}: u32
//!    152  blk_x_align, blk_y_align                u32
//!    160  src_h_rot_max, scale_down, scale_up     u32
//!    172  end
//! ```
//!
//! The buffer comes from outside this crate, so [`RawChannelRestriction::decode`]
//! checks its length before reading any field. Trailing bytes are ignored.

use alloc::vec::Vec;
use core::fmt;

use crate::restriction::SizeRange;

/// A capability blob as laid out by the device, before normalization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawChannelRestriction {
    /// Hardware channel index.
    pub id: i32,
    /// Attribute word.
    pub attr: u64,
    /// Full source buffer width.
    pub src_f_w: SizeRange,
    /// Full source buffer height.
    pub src_f_h: SizeRange,
    /// Source crop width.
    pub src_w: SizeRange,
    /// Source crop height.
    pub src_h: SizeRange,
    /// Source x alignment.
    pub src_x_align: u32,
    /// Source y alignment.
    pub src_y_align: u32,
    /// Full destination width.
    pub dst_f_w: SizeRange,
    /// Full destination height.
    pub dst_f_h: SizeRange,
    /// Destination width.
    pub dst_w: SizeRange,
    /// Destination height.
    pub dst_h: SizeRange,
    /// Destination x alignment.
    pub dst_x_align: u32,
    /// Destination y alignment.
    pub dst_y_align: u32,
    /// Blocking region width.
    pub blk_w: SizeRange,
    /// Blocking region height.
    pub blk_h: SizeRange,
    /// Blocking region x alignment.
    pub blk_x_align: u32,
    /// Blocking region y alignment.
    pub blk_y_align: u32,
    /// Maximum source height under rotation.
    pub src_h_rot_max: u32,
    /// Raw scale-down ratio; `0` means unset.
    pub scale_down: u32,
    /// Raw scale-up ratio; `0` means unset.
    pub scale_up: u32,
}

/// Errors from [`RawChannelRestriction::decode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlobError {
    /// The buffer is shorter than the fixed layout.
    Truncated {
        /// Length of the retrieved buffer.
        len: usize,
        /// Length the layout requires.
        expected: usize,
    },
}

impl fmt::Display for BlobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { len, expected } => {
                write!(f, "restriction blob truncated ({len} of {expected} bytes)")
            }
        }
    }
}

impl core::error::Error for BlobError {}

impl RawChannelRestriction {
    /// Encoded size of the layout in bytes.
    pub const ENCODED_LEN: usize = 172;

    /// Decodes a blob.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError::Truncated`] if `bytes` is shorter than
    /// [`Self::ENCODED_LEN`].
    pub fn decode(bytes: &[u8]) -> Result<Self, BlobError> {
        let truncated = BlobError::Truncated {
            len: bytes.len(),
            expected: Self::ENCODED_LEN,
        };
        if bytes.len() < Self::ENCODED_LEN {
            return Err(truncated);
        }
        Reader { data: bytes, pos: 0 }
            .read_restriction()
            .ok_or(truncated)
    }

    /// Encodes the blob in device layout.
    ///
    /// Device simulators and fixtures use this to produce blobs.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer {
            buf: Vec::with_capacity(Self::ENCODED_LEN),
        };
        w.write_u32(self.id.cast_unsigned());
        w.write_u32(0);
        w.write_u64(self.attr);
        for range in [self.src_f_w, self.src_f_h, self.src_w, self.src_h] {
            w.write_range(range);
        }
        w.write_u32(self.src_x_align);
        w.write_u32(self.src_y_align);
        for range in [self.dst_f_w, self.dst_f_h, self.dst_w, self.dst_h] {
            w.write_range(range);
        }
        w.write_u32(self.dst_x_align);
        w.write_u32(self.dst_y_align);
        w.write_range(self.blk_w);
        w.write_range(self.blk_h);
        w.write_u32(self.blk_x_align);
        w.write_u32(self.blk_y_align);
        w.write_u32(self.src_h_rot_max);
        w.write_u32(self.scale_down);
        w.write_u32(self.scale_up);
        w.buf
    }
}

// ---------------------------------------------------------------------------
// Encoding helpers
// ---------------------------------------------------------------------------

struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_range(&mut self, r: SizeRange) {
        self.write_u32(r.min);
        self.write_u32(r.max);
        self.write_u32(r.align);
    }
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_range(&mut self) -> Option<SizeRange> {
        Some(SizeRange {
            min: self.read_u32()?,
            max: self.read_u32()?,
            align: self.read_u32()?,
        })
    }

    fn read_restriction(&mut self) -> Option<RawChannelRestriction> {
        let id = self.read_u32()?.cast_signed();
        let _reserved = self.read_u32()?;
        Some(RawChannelRestriction {
            id,
            attr: self.read_u64()?,
            src_f_w: self.read_range()?,
            src_f_h: self.read_range()?,
            src_w: self.read_range()?,
            src_h: self.read_range()?,
            src_x_align: self.read_u32()?,
            src_y_align: self.read_u32()?,
            dst_f_w: self.read_range()?,
            dst_f_h: self.read_range()?,
            dst_w: self.read_range()?,
            dst_h: self.read_range()?,
            dst_x_align: self.read_u32()?,
            dst_y_align: self.read_u32()?,
            blk_w: self.read_range()?,
            blk_h: self.read_range()?,
            blk_x_align: self.read_u32()?,
            blk_y_align: self.read_u32()?,
            src_h_rot_max: self.read_u32()?,
            scale_down: self.read_u32()?,
            scale_up: self.read_u32()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawChannelRestriction {
        RawChannelRestriction {
            id: 3,
            attr: 0x5_0021,
            src_f_w: SizeRange::new(64, 65534, 1),
            src_f_h: SizeRange::new(16, 8190, 1),
            src_w: SizeRange::new(16, 4096, 1),
            src_h: SizeRange::new(8, 4096, 1),
            src_x_align: 1,
            src_y_align: 1,
            dst_f_w: SizeRange::new(16, 8190, 1),
            dst_f_h: SizeRange::new(8, 4096, 1),
            dst_w: SizeRange::new(16, 4096, 1),
            dst_h: SizeRange::new(8, 4096, 1),
            dst_x_align: 1,
            dst_y_align: 1,
            blk_w: SizeRange::new(4, 4096, 1),
            blk_h: SizeRange::new(1, 4096, 1),
            blk_x_align: 1,
            blk_y_align: 1,
            src_h_rot_max: 2160,
            scale_down: 2,
            scale_up: 8,
        }
    }

    #[test]
    fn encoded_length_matches_layout() {
        assert_eq!(sample().encode().len(), RawChannelRestriction::ENCODED_LEN);
    }

    #[test]
    fn decode_reads_fields_at_layout_offsets() {
        let bytes = sample().encode();
        assert_eq!(&bytes[0..4], &3_u32.to_le_bytes());
        assert_eq!(&bytes[8..16], &0x5_0021_u64.to_le_bytes());
        assert_eq!(&bytes[16..20], &64_u32.to_le_bytes());
        assert_eq!(&bytes[160..164], &2160_u32.to_le_bytes());
        assert_eq!(&bytes[168..172], &8_u32.to_le_bytes());

        let decoded = RawChannelRestriction::decode(&bytes).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn decode_rejects_short_buffers() {
        let bytes = sample().encode();
        for len in [0, 4, 16, RawChannelRestriction::ENCODED_LEN - 1] {
            assert_eq!(
                RawChannelRestriction::decode(&bytes[..len]),
                Err(BlobError::Truncated {
                    len,
                    expected: RawChannelRestriction::ENCODED_LEN,
                }),
                "length {len} must be rejected"
            );
        }
    }

    #[test]
    fn decode_ignores_trailing_bytes() {
        let mut bytes = sample().encode();
        bytes.extend_from_slice(&[0xff; 12]);
        assert_eq!(RawChannelRestriction::decode(&bytes), Ok(sample()));
    }

    #[test]
    fn negative_hardware_id_survives_decoding() {
        let raw = RawChannelRestriction {
            id: -1,
            ..sample()
        };
        assert_eq!(RawChannelRestriction::decode(&raw.encode()).unwrap().id, -1);
    }
}
