// Copyright 2026 the Planecaps Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scan-out channel identification.
//!
//! An [`OutputChannel`] is one hardware plane as enumerated by the device.
//! The device bring-up code creates the channel list once; this crate only
//! reads it.

use alloc::vec::Vec;
use core::fmt;

/// Identifies a scan-out channel by its enumeration order (`0..N`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ChannelId(pub u32);

impl ChannelId {
    /// Returns the id as a table index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChannelId({})", self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channel {}", self.0)
    }
}

/// Opaque 64-bit key of a capability blob held by the device.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlobId(pub u64);

impl fmt::Debug for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobId({})", self.0)
    }
}

/// A raw format code as reported by the device (a DRM fourcc).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fourcc(pub u32);

impl Fourcc {
    /// Builds a fourcc from its four characters, first character in the low
    /// byte.
    #[must_use]
    pub const fn from_chars(code: [u8; 4]) -> Self {
        Self(u32::from_le_bytes(code))
    }

    /// Returns the four characters, or `None` if any byte is not printable
    /// ASCII.
    #[must_use]
    pub fn chars(self) -> Option<[u8; 4]> {
        let bytes = self.0.to_le_bytes();
        bytes
            .iter()
            .all(|b| b.is_ascii_graphic() || *b == b' ')
            .then_some(bytes)
    }
}

impl fmt::Debug for Fourcc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.chars() {
            Some([a, b, c, d]) => write!(
                f,
                "Fourcc({}{}{}{})",
                char::from(a),
                char::from(b),
                char::from(c),
                char::from(d)
            ),
            None => write!(f, "Fourcc({:#010x})", self.0),
        }
    }
}

/// One scan-out channel as enumerated by the device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputChannel {
    /// Position in enumeration order.
    pub id: ChannelId,
    /// Capability blob carrying the channel's restrictions, if the device
    /// exposes one for this channel.
    pub restriction_blob: Option<BlobId>,
    /// Raw format codes the channel can scan out, in device order.
    pub formats: Vec<Fourcc>,
}

impl OutputChannel {
    /// Creates a channel description.
    #[must_use]
    pub fn new(id: ChannelId, restriction_blob: Option<BlobId>, formats: Vec<Fourcc>) -> Self {
        Self {
            id,
            restriction_blob,
            formats,
        }
    }
}
