// Copyright 2026 the Planecaps Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Restriction resolution.
//!
//! [`Resolver::resolve`] walks the enumerated channels in order, fetches and
//! decodes each channel's capability blob, translates its formats, and then
//! runs the [derived](crate::derived) passes over the collected records.
//!
//! # Failure model
//!
//! Resolution is all-or-nothing. A channel without a blob, a blob the device
//! cannot return, a malformed blob, or a failing derived pass each produce a
//! [`RestrictionTable`] with `is_valid() == false` and no channel records; the
//! planner must then use the [built-in defaults](crate::defaults). Nothing is
//! returned as an error. The reasons are kept on the table
//! ([`RestrictionTable::failures`]) and reported to the [`Tracer`].
//!
//! A format that fails translation is the only non-fatal failure: it is
//! skipped, reported, and recorded in [`RestrictionTable::warnings`].

use alloc::borrow::Cow;
use alloc::vec::Vec;

use crate::blob::RawChannelRestriction;
use crate::channel::{BlobId, ChannelId, OutputChannel};
use crate::defaults::{DEFAULT_LIMITS, default_formats};
use crate::derived::{FeatureTable, MergedRestrictions};
use crate::error::ResolveError;
use crate::format::{FormatList, FormatTranslator};
use crate::restriction::{ChannelRestriction, GeometryLimits};
use crate::trace::{FormatSkippedEvent, ResolveFailedEvent, ResolveSummary, Tracer};

/// Fetches capability blobs from the device.
pub trait BlobSource {
    /// Returns the contents of blob `id`, or `None` if the device cannot
    /// provide it.
    fn get_blob(&self, id: BlobId) -> Option<Vec<u8>>;
}

impl<T: BlobSource + ?Sized> BlobSource for &T {
    fn get_blob(&self, id: BlobId) -> Option<Vec<u8>> {
        (**self).get_blob(id)
    }
}

impl BlobSource for alloc::collections::BTreeMap<BlobId, Vec<u8>> {
    fn get_blob(&self, id: BlobId) -> Option<Vec<u8>> {
        self.get(&id).cloned()
    }
}

#[cfg(feature = "std")]
impl<S: core::hash::BuildHasher> BlobSource for std::collections::HashMap<BlobId, Vec<u8>, S> {
    fn get_blob(&self, id: BlobId) -> Option<Vec<u8>> {
        self.get(&id).cloned()
    }
}

/// How far resolution continues after a channel fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DiagnosticMode {
    /// Stop at the first failing channel.
    FailFast,
    /// Keep scanning the remaining channels to report every failing one. The
    /// table is invalid either way.
    #[default]
    CollectAll,
}

/// Resolver configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ResolveOptions {
    /// Diagnostic completeness after a failure.
    pub diagnostics: DiagnosticMode,
}

/// Device-wide restriction table.
///
/// Either every enumerated channel has a record and the table is valid, or the
/// table is invalid and exposes no records.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RestrictionTable {
    channels: Vec<ChannelRestriction>,
    merged: MergedRestrictions,
    features: FeatureTable,
    channel_count: usize,
    valid: bool,
    failures: Vec<ResolveError>,
    warnings: Vec<ResolveError>,
}

impl RestrictionTable {
    /// An invalid table with no recorded reason, used before the first
    /// resolve.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::default()
    }

    fn invalid(channel_count: usize, failures: Vec<ResolveError>, warnings: Vec<ResolveError>) -> Self {
        Self {
            channel_count,
            failures,
            warnings,
            ..Self::default()
        }
    }

    /// Returns `true` if the table holds queried restrictions for every
    /// channel. Callers must check this before using the records.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Per-channel records in enumeration order; empty if invalid.
    #[must_use]
    pub fn channels(&self) -> &[ChannelRestriction] {
        &self.channels
    }

    /// Record of `id`; `None` if invalid or if no channel carries `id`.
    ///
    /// Devices normally number channels by enumeration position, which is
    /// tried first.
    #[must_use]
    pub fn channel(&self, id: ChannelId) -> Option<&ChannelRestriction> {
        self.channels
            .get(id.index())
            .filter(|c| c.channel == id)
            .or_else(|| self.channels.iter().find(|c| c.channel == id))
    }

    /// Per-class merged view; empty if invalid.
    #[must_use]
    pub fn merged(&self) -> &MergedRestrictions {
        &self.merged
    }

    /// Per-channel feature table; empty if invalid.
    #[must_use]
    pub fn features(&self) -> &FeatureTable {
        &self.features
    }

    /// Number of channels the device enumerated, whether or not they
    /// resolved.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Failures that invalidated the table.
    #[must_use]
    pub fn failures(&self) -> &[ResolveError] {
        &self.failures
    }

    /// Non-fatal failures (skipped formats).
    #[must_use]
    pub fn warnings(&self) -> &[ResolveError] {
        &self.warnings
    }

    /// Limits the planner should apply to `id`: the queried limits when the
    /// table is valid, [`DEFAULT_LIMITS`] otherwise.
    #[must_use]
    pub fn effective_limits(&self, id: ChannelId) -> GeometryLimits {
        self.channel(id).map_or(DEFAULT_LIMITS, |c| c.limits)
    }

    /// Formats the planner should assume for `id`: the queried list when the
    /// table is valid, the built-in defaults otherwise.
    #[must_use]
    pub fn effective_formats(&self, id: ChannelId) -> Cow<'_, FormatList> {
        match self.channel(id) {
            Some(c) => Cow::Borrowed(&c.formats),
            None => Cow::Owned(default_formats()),
        }
    }
}

/// Builds [`RestrictionTable`]s from enumerated channels.
#[derive(Clone, Debug, Default)]
pub struct Resolver<T> {
    translator: T,
    options: ResolveOptions,
}

impl<T: FormatTranslator> Resolver<T> {
    /// Creates a resolver with default options.
    #[must_use]
    pub fn new(translator: T) -> Self {
        Self::with_options(translator, ResolveOptions::default())
    }

    /// Creates a resolver with explicit options.
    #[must_use]
    pub fn with_options(translator: T, options: ResolveOptions) -> Self {
        Self {
            translator,
            options,
        }
    }

    /// Returns the resolver's options.
    #[must_use]
    pub fn options(&self) -> ResolveOptions {
        self.options
    }

    /// Resolves the restriction table for `channels`.
    ///
    /// Blocks on `blobs`. Each call builds a complete new table; nothing is
    /// carried over from a previous call.
    pub fn resolve(
        &self,
        channels: &[OutputChannel],
        blobs: &dyn BlobSource,
        tracer: &mut Tracer<'_>,
    ) -> RestrictionTable {
        let mut records = Vec::with_capacity(channels.len());
        let mut failures = Vec::new();
        let mut warnings = Vec::new();

        for channel in channels {
            match self.resolve_channel(channel, blobs, &mut warnings, tracer) {
                Ok(record) => {
                    tracer.channel_resolved(&record);
                    records.push(record);
                }
                Err(error) => {
                    tracer.resolve_failed(&ResolveFailedEvent { error });
                    failures.push(error);
                    if self.options.diagnostics == DiagnosticMode::FailFast {
                        break;
                    }
                }
            }
        }

        let resolved_count = records.len();
        let table = if failures.is_empty() {
            match build_derived(&records) {
                Ok((merged, features)) => RestrictionTable {
                    channels: records,
                    merged,
                    features,
                    channel_count: channels.len(),
                    valid: true,
                    failures,
                    warnings,
                },
                Err(error) => {
                    tracer.resolve_failed(&ResolveFailedEvent { error });
                    RestrictionTable::invalid(channels.len(), alloc::vec![error], warnings)
                }
            }
        } else {
            RestrictionTable::invalid(channels.len(), failures, warnings)
        };

        tracer.resolve_summary(&ResolveSummary {
            valid: table.valid,
            channel_count: channels.len(),
            resolved_count,
            skipped_formats: table.warnings.len(),
        });
        table
    }

    fn resolve_channel(
        &self,
        channel: &OutputChannel,
        blobs: &dyn BlobSource,
        warnings: &mut Vec<ResolveError>,
        tracer: &mut Tracer<'_>,
    ) -> Result<ChannelRestriction, ResolveError> {
        let blob = channel
            .restriction_blob
            .ok_or(ResolveError::ChannelDataMissing {
                channel: channel.id,
            })?;
        let bytes = blobs
            .get_blob(blob)
            .ok_or(ResolveError::BlobRetrievalFailed {
                channel: channel.id,
                blob,
            })?;
        let raw = RawChannelRestriction::decode(&bytes).map_err(|error| {
            ResolveError::BlobMalformed {
                channel: channel.id,
                blob,
                error,
            }
        })?;

        let mut record = ChannelRestriction::from_raw(channel.id, &raw);
        for &code in &channel.formats {
            match self.translator.translate(code) {
                Ok(formats) => {
                    for format in formats {
                        record.formats.insert(format);
                    }
                }
                Err(error) => {
                    tracer.format_skipped(&FormatSkippedEvent {
                        channel: channel.id,
                        code,
                    });
                    warnings.push(ResolveError::FormatTranslationFailed {
                        channel: channel.id,
                        error,
                    });
                }
            }
        }
        Ok(record)
    }
}

fn build_derived(
    records: &[ChannelRestriction],
) -> Result<(MergedRestrictions, FeatureTable), ResolveError> {
    let merged =
        MergedRestrictions::build(records).map_err(ResolveError::DerivedTableBuildFailed)?;
    let features = FeatureTable::build(records).map_err(ResolveError::DerivedTableBuildFailed)?;
    Ok((merged, features))
}
