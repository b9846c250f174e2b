// Copyright 2026 the Planecaps Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in restrictions.
//!
//! When the device's restriction table is unavailable the planner must assume
//! these conservative limits for every channel.

use crate::format::{FormatList, PixelFormat};
use crate::restriction::{GeometryLimits, ScaleLimits, SizeRange};

/// Conservative limits that every supported device meets.
pub const DEFAULT_LIMITS: GeometryLimits = GeometryLimits {
    src_full_width: SizeRange::new(16, 8192, 1),
    src_full_height: SizeRange::new(16, 8192, 1),
    src_width: SizeRange::new(16, 4096, 1),
    src_height: SizeRange::new(16, 4096, 1),
    src_x_align: 2,
    src_y_align: 2,
    dst_full_width: SizeRange::new(16, 8192, 1),
    dst_full_height: SizeRange::new(16, 8192, 1),
    dst_width: SizeRange::new(16, 4096, 1),
    dst_height: SizeRange::new(16, 4096, 1),
    dst_x_align: 1,
    dst_y_align: 1,
    block_width: SizeRange::new(16, 4096, 1),
    block_height: SizeRange::new(16, 4096, 1),
    block_x_align: 1,
    block_y_align: 1,
    src_height_rot_max: 2160,
    scale: ScaleLimits::IDENTITY,
};

/// Formats every channel is assumed to accept: 32-bit RGB variants and
/// RGB565.
pub const DEFAULT_FORMATS: [PixelFormat; 4] = [
    PixelFormat(1), // RGBA_8888
    PixelFormat(2), // RGBX_8888
    PixelFormat(4), // RGB_565
    PixelFormat(5), // BGRA_8888
];

/// Returns [`DEFAULT_FORMATS`] as a [`FormatList`].
#[must_use]
pub fn default_formats() -> FormatList {
    DEFAULT_FORMATS.into_iter().collect()
}
