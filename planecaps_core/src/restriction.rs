// Copyright 2026 the Planecaps Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Normalized per-channel restrictions.
//!
//! A [`ChannelRestriction`] is built from a decoded capability blob
//! ([`RawChannelRestriction`]) plus the channel's normalized formats. All
//! geometric fields are copied verbatim; the only normalization is on the
//! scale ratios, see [`ScaleLimits::normalized`].

use bitflags::bitflags;

use crate::blob::RawChannelRestriction;
use crate::channel::ChannelId;
use crate::format::FormatList;

/// An inclusive size range with a required step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SizeRange {
    /// Smallest accepted value.
    pub min: u32,
    /// Largest accepted value.
    pub max: u32,
    /// Required alignment of the value.
    pub align: u32,
}

impl SizeRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(min: u32, max: u32, align: u32) -> Self {
        Self { min, max, align }
    }

    /// Returns `true` if `value` lies within `min..=max` and is a multiple of
    /// `align`. An alignment of `0` or `1` accepts any value.
    #[must_use]
    pub const fn accepts(&self, value: u32) -> bool {
        let aligned = self.align <= 1 || value % self.align == 0;
        value >= self.min && value <= self.max && aligned
    }
}

/// Maximum scale-down and scale-up ratios of a channel.
///
/// Ratios are never zero once normalized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScaleLimits {
    /// Largest supported downscale factor (`src / dst`).
    pub down: u32,
    /// Largest supported upscale factor (`dst / src`).
    pub up: u32,
}

impl ScaleLimits {
    /// No scaling in either direction.
    pub const IDENTITY: Self = Self { down: 1, up: 1 };

    /// Builds limits from raw blob values, mapping a raw `0` to `1`.
    #[must_use]
    pub const fn normalized(down: u32, up: u32) -> Self {
        Self {
            down: if down == 0 { 1 } else { down },
            up: if up == 0 { 1 } else { up },
        }
    }

    /// Returns `true` if the channel can scale at all.
    #[must_use]
    pub const fn can_scale(&self) -> bool {
        self.down > 1 || self.up > 1
    }
}

impl Default for ScaleLimits {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Geometric limits of a channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GeometryLimits {
    /// Full source buffer width.
    pub src_full_width: SizeRange,
    /// Full source buffer height.
    pub src_full_height: SizeRange,
    /// Source crop width.
    pub src_width: SizeRange,
    /// Source crop height.
    pub src_height: SizeRange,
    /// Source crop x position alignment.
    pub src_x_align: u32,
    /// Source crop y position alignment.
    pub src_y_align: u32,
    /// Full destination width.
    pub dst_full_width: SizeRange,
    /// Full destination height.
    pub dst_full_height: SizeRange,
    /// Destination window width.
    pub dst_width: SizeRange,
    /// Destination window height.
    pub dst_height: SizeRange,
    /// Destination x position alignment.
    pub dst_x_align: u32,
    /// Destination y position alignment.
    pub dst_y_align: u32,
    /// Blocking region width.
    pub block_width: SizeRange,
    /// Blocking region height.
    pub block_height: SizeRange,
    /// Blocking region x position alignment.
    pub block_x_align: u32,
    /// Blocking region y position alignment.
    pub block_y_align: u32,
    /// Maximum source height when the channel rotates.
    pub src_height_rot_max: u32,
    /// Scale ratios.
    pub scale: ScaleLimits,
}

bitflags! {
    /// Role and capability tags a device reports for a channel.
    ///
    /// Bit positions follow the device's attribute word. Bits the device sets
    /// but this type does not name are retained.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ChannelAttributes: u64 {
        /// Reads compressed (AFBC) buffers.
        const AFBC = 1 << 0;
        /// Supports a blocking region.
        const BLOCK = 1 << 1;
        /// Supports flips.
        const FLIP = 1 << 2;
        /// Supports rotation.
        const ROTATION = 1 << 3;
        /// Has a color-space converter.
        const CSC = 1 << 4;
        /// Has a scaler.
        const SCALE = 1 << 5;
        /// Has an HDR block.
        const HDR = 1 << 6;
        /// Has a custom HDR block.
        const CUSTOM_HDR = 1 << 7;
        /// Has a custom HDR10+ block.
        const CUSTOM_HDR10_PLUS = 1 << 8;
        /// Supports wide color gamut.
        const WCG = 1 << 9;
        /// Reads SBWC compressed buffers.
        const SBWC = 1 << 10;
        /// Supports HDR10+.
        const HDR10_PLUS = 1 << 11;
        /// Fetches input through its own DMA.
        const INPUT_DMA = 1 << 16;
        /// Writes output through its own DMA.
        const OUTPUT_DMA = 1 << 17;
        /// Is a display post-processor.
        const DPP = 1 << 18;
        /// Has SRAM compression.
        const SRAM_COMPRESSION = 1 << 19;
    }
}

/// Normalized restriction record of one channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelRestriction {
    /// Enumeration id of the channel this record belongs to.
    pub channel: ChannelId,
    /// Hardware index the device reports inside the blob.
    pub hw_id: i32,
    /// Role tags.
    pub attributes: ChannelAttributes,
    /// Geometric limits, with normalized scale ratios.
    pub limits: GeometryLimits,
    /// Normalized formats the channel accepts.
    pub formats: FormatList,
}

impl ChannelRestriction {
    /// Normalizes a decoded blob into a record for `channel`.
    ///
    /// The format list starts empty; the resolver fills it afterwards.
    #[must_use]
    pub fn from_raw(channel: ChannelId, raw: &RawChannelRestriction) -> Self {
        let limits = GeometryLimits {
            src_full_width: raw.src_f_w,
            src_full_height: raw.src_f_h,
            src_width: raw.src_w,
            src_height: raw.src_h,
            src_x_align: raw.src_x_align,
            src_y_align: raw.src_y_align,
            dst_full_width: raw.dst_f_w,
            dst_full_height: raw.dst_f_h,
            dst_width: raw.dst_w,
            dst_height: raw.dst_h,
            dst_x_align: raw.dst_x_align,
            dst_y_align: raw.dst_y_align,
            block_width: raw.blk_w,
            block_height: raw.blk_h,
            block_x_align: raw.blk_x_align,
            block_y_align: raw.blk_y_align,
            src_height_rot_max: raw.src_h_rot_max,
            scale: ScaleLimits::normalized(raw.scale_down, raw.scale_up),
        };
        Self {
            channel,
            hw_id: raw.id,
            attributes: ChannelAttributes::from_bits_retain(raw.attr),
            limits,
            formats: FormatList::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_scale_ratios_become_identity() {
        assert_eq!(ScaleLimits::normalized(0, 0), ScaleLimits::IDENTITY);
        assert_eq!(ScaleLimits::normalized(0, 3), ScaleLimits { down: 1, up: 3 });
        assert_eq!(ScaleLimits::normalized(4, 0), ScaleLimits { down: 4, up: 1 });
    }

    #[test]
    fn nonzero_scale_ratios_pass_through() {
        for down in 1..=8 {
            for up in 1..=8 {
                let limits = ScaleLimits::normalized(down, up);
                assert_eq!(limits.down, down, "down ratio changed");
                assert_eq!(limits.up, up, "up ratio changed");
            }
        }
        assert!(!ScaleLimits::IDENTITY.can_scale());
        assert!(ScaleLimits::normalized(2, 1).can_scale());
    }

    #[test]
    fn size_range_accepts_aligned_values_in_bounds() {
        let range = SizeRange::new(16, 4096, 2);
        assert!(range.accepts(16));
        assert!(range.accepts(4096));
        assert!(!range.accepts(17));
        assert!(!range.accepts(8));
        assert!(!range.accepts(4098));
        assert!(SizeRange::new(1, 10, 0).accepts(7));
    }

    #[test]
    fn from_raw_copies_geometry_and_normalizes_scale() {
        let raw = RawChannelRestriction {
            id: 2,
            attr: (ChannelAttributes::INPUT_DMA | ChannelAttributes::ROTATION).bits() | 1 << 40,
            src_f_w: SizeRange::new(64, 8192, 1),
            src_h_rot_max: 2160,
            scale_down: 0,
            scale_up: 8,
            ..RawChannelRestriction::default()
        };
        let record = ChannelRestriction::from_raw(ChannelId(5), &raw);
        assert_eq!(record.channel, ChannelId(5));
        assert_eq!(record.hw_id, 2);
        assert!(record.attributes.contains(ChannelAttributes::ROTATION));
        assert_eq!(record.attributes.bits() & (1 << 40), 1 << 40);
        assert_eq!(record.limits.src_full_width, SizeRange::new(64, 8192, 1));
        assert_eq!(record.limits.src_height_rot_max, 2160);
        assert_eq!(record.limits.scale, ScaleLimits { down: 1, up: 8 });
        assert!(record.formats.is_empty());
    }
}
