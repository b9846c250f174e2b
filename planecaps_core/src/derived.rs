// Copyright 2026 the Planecaps Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Derived views built from the per-channel records.
//!
//! Once every channel resolved, two passes run over the collected records:
//!
//! - [`MergedRestrictions::build`] groups channels by [`ChannelClass`] and
//!   merges their limits and formats into one record per class. The planner
//!   uses it to reason about "any channel of this class".
//! - [`FeatureTable::build`] derives per-channel [`ChannelFeatures`] indexed by
//!   the hardware id reported in each blob.
//!
//! Either pass failing invalidates the whole table.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use bitflags::bitflags;

use crate::channel::ChannelId;
use crate::format::FormatList;
use crate::restriction::{ChannelAttributes, ChannelRestriction, GeometryLimits};

/// Errors from the post-processing passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DerivedError {
    /// Two channels of one class report different geometry limits.
    ConflictingClassLimits {
        /// Class both channels belong to.
        class: ChannelClass,
        /// Channel whose limits were recorded first.
        first: ChannelId,
        /// Channel disagreeing with `first`.
        conflicting: ChannelId,
    },
    /// A blob reports a hardware id outside `0..channel_count`.
    ChannelIdOutOfRange {
        /// Channel carrying the blob.
        channel: ChannelId,
        /// Reported hardware id.
        hw_id: i32,
        /// Number of enumerated channels.
        count: usize,
    },
    /// Two blobs report the same hardware id.
    DuplicateChannelId {
        /// Reported hardware id.
        hw_id: i32,
        /// Channel that claimed the id first.
        first: ChannelId,
        /// Channel claiming it again.
        second: ChannelId,
    },
}

impl fmt::Display for DerivedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConflictingClassLimits {
                class,
                first,
                conflicting,
            } => write!(
                f,
                "{class:?} limits of {conflicting} differ from {first}"
            ),
            Self::ChannelIdOutOfRange {
                channel,
                hw_id,
                count,
            } => write!(
                f,
                "{channel} reports hw id {hw_id}, outside 0..{count}"
            ),
            Self::DuplicateChannelId {
                hw_id,
                first,
                second,
            } => write!(f, "hw id {hw_id} reported by both {first} and {second}"),
        }
    }
}

impl core::error::Error for DerivedError {}

// ---------------------------------------------------------------------------
// Merged restrictions
// ---------------------------------------------------------------------------

/// Hardware class of an input channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelClass {
    /// RGB-only channel without scaler.
    Graphics,
    /// Channel with color conversion, no scaler.
    Video,
    /// Channel with a scaler.
    VideoScale,
    /// Channel with a scaler and rotation.
    VideoScaleRotate,
}

impl ChannelClass {
    /// Classifies a channel from its attributes.
    ///
    /// Returns `None` for channels that do not fetch input (e.g. writeback).
    /// Compression support (`AFBC`, `SBWC`) does not affect the class, so a
    /// compressed and an uncompressed channel of one class must report
    /// identical limits.
    #[must_use]
    pub fn classify(attributes: ChannelAttributes) -> Option<Self> {
        if !attributes.contains(ChannelAttributes::INPUT_DMA) {
            return None;
        }
        let scale = attributes.contains(ChannelAttributes::SCALE);
        let rotate = attributes.contains(ChannelAttributes::ROTATION);
        Some(match (scale, rotate) {
            (true, true) => Self::VideoScaleRotate,
            (true, false) => Self::VideoScale,
            (false, _) if attributes.contains(ChannelAttributes::CSC) => Self::Video,
            (false, _) => Self::Graphics,
        })
    }
}

/// Merged restrictions of all channels in one class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassRestriction {
    /// The class.
    pub class: ChannelClass,
    /// Limits shared by every channel of the class.
    pub limits: GeometryLimits,
    /// Union of the class's formats, in channel order.
    pub formats: FormatList,
    /// Channels in the class, in enumeration order.
    pub channels: Vec<ChannelId>,
}

/// Per-class view of the channel records.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergedRestrictions {
    classes: Vec<ClassRestriction>,
}

impl MergedRestrictions {
    /// Groups `records` by class.
    ///
    /// Channels without input DMA are left out.
    ///
    /// # Errors
    ///
    /// Returns [`DerivedError::ConflictingClassLimits`] if channels of one
    /// class disagree on geometry.
    pub fn build(records: &[ChannelRestriction]) -> Result<Self, DerivedError> {
        let mut classes: Vec<ClassRestriction> = Vec::new();
        for record in records {
            let Some(class) = ChannelClass::classify(record.attributes) else {
                continue;
            };
            match classes.iter_mut().find(|c| c.class == class) {
                Some(entry) => {
                    if entry.limits != record.limits {
                        return Err(DerivedError::ConflictingClassLimits {
                            class,
                            first: entry.channels[0],
                            conflicting: record.channel,
                        });
                    }
                    entry.formats.extend_from(&record.formats);
                    entry.channels.push(record.channel);
                }
                None => classes.push(ClassRestriction {
                    class,
                    limits: record.limits,
                    formats: record.formats.clone(),
                    channels: vec![record.channel],
                }),
            }
        }
        Ok(Self { classes })
    }

    /// Returns the merged record for `class`, if any channel belongs to it.
    #[must_use]
    pub fn class(&self, class: ChannelClass) -> Option<&ClassRestriction> {
        self.classes.iter().find(|c| c.class == class)
    }

    /// Iterates classes in order of first appearance.
    pub fn iter(&self) -> core::slice::Iter<'_, ClassRestriction> {
        self.classes.iter()
    }

    /// Returns the number of classes present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` if no input channel was classified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Feature table
// ---------------------------------------------------------------------------

bitflags! {
    /// Composition features a channel offers to the planner.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ChannelFeatures: u32 {
        /// Reads compressed buffers.
        const COMPRESSED_INPUT = 1 << 0;
        /// Rotates.
        const ROTATION = 1 << 1;
        /// Scales.
        const SCALING = 1 << 2;
        /// Converts color spaces (YUV input).
        const COLOR_CONVERSION = 1 << 3;
        /// Processes HDR content.
        const HDR = 1 << 4;
        /// Processes HDR10+ metadata.
        const HDR10_PLUS = 1 << 5;
        /// Handles wide color gamut.
        const WIDE_COLOR_GAMUT = 1 << 6;
        /// Supports a blocking region.
        const BLOCKING = 1 << 7;
        /// Flips.
        const FLIP = 1 << 8;
    }
}

impl ChannelFeatures {
    /// Derives features from channel attributes.
    #[must_use]
    pub fn from_attributes(attr: ChannelAttributes) -> Self {
        let map = [
            (ChannelAttributes::AFBC, Self::COMPRESSED_INPUT),
            (ChannelAttributes::SBWC, Self::COMPRESSED_INPUT),
            (ChannelAttributes::ROTATION, Self::ROTATION),
            (ChannelAttributes::SCALE, Self::SCALING),
            (ChannelAttributes::CSC, Self::COLOR_CONVERSION),
            (ChannelAttributes::HDR, Self::HDR),
            (ChannelAttributes::CUSTOM_HDR, Self::HDR),
            (ChannelAttributes::CUSTOM_HDR10_PLUS, Self::HDR | Self::HDR10_PLUS),
            (ChannelAttributes::HDR10_PLUS, Self::HDR | Self::HDR10_PLUS),
            (ChannelAttributes::WCG, Self::WIDE_COLOR_GAMUT),
            (ChannelAttributes::BLOCK, Self::BLOCKING),
            (ChannelAttributes::FLIP, Self::FLIP),
        ];
        map.iter()
            .filter(|(a, _)| attr.contains(*a))
            .fold(Self::empty(), |acc, (_, f)| acc | *f)
    }
}

/// Features of one channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureEntry {
    /// Channel the entry was derived from.
    pub channel: ChannelId,
    /// Derived features.
    pub features: ChannelFeatures,
}

/// Per-channel features indexed by hardware id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeatureTable {
    entries: Vec<FeatureEntry>,
}

impl FeatureTable {
    /// Builds the table.
    ///
    /// # Errors
    ///
    /// Returns [`DerivedError::ChannelIdOutOfRange`] or
    /// [`DerivedError::DuplicateChannelId`] if the hardware ids reported in
    /// the blobs are not a permutation of `0..records.len()`.
    pub fn build(records: &[ChannelRestriction]) -> Result<Self, DerivedError> {
        let count = records.len();
        let mut slots: Vec<Option<FeatureEntry>> = vec![None; count];
        for record in records {
            let slot = usize::try_from(record.hw_id)
                .ok()
                .and_then(|idx| slots.get_mut(idx))
                .ok_or(DerivedError::ChannelIdOutOfRange {
                    channel: record.channel,
                    hw_id: record.hw_id,
                    count,
                })?;
            if let Some(existing) = slot.as_ref() {
                return Err(DerivedError::DuplicateChannelId {
                    hw_id: record.hw_id,
                    first: existing.channel,
                    second: record.channel,
                });
            }
            *slot = Some(FeatureEntry {
                channel: record.channel,
                features: ChannelFeatures::from_attributes(record.attributes),
            });
        }
        // `count` records with distinct in-range ids fill every slot.
        Ok(Self {
            entries: slots.into_iter().flatten().collect(),
        })
    }

    /// Returns the entry for hardware id `hw_id`.
    #[must_use]
    pub fn get(&self, hw_id: usize) -> Option<&FeatureEntry> {
        self.entries.get(hw_id)
    }

    /// Returns the features of enumeration channel `channel`.
    #[must_use]
    pub fn features_of(&self, channel: ChannelId) -> Option<ChannelFeatures> {
        self.entries
            .iter()
            .find(|e| e.channel == channel)
            .map(|e| e.features)
    }

    /// Iterates entries in hardware id order.
    pub fn iter(&self) -> core::slice::Iter<'_, FeatureEntry> {
        self.entries.iter()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
