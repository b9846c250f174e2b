// Copyright 2026 the Planecaps Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for resolution and connection-change dispatch.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! resolver and the dispatcher call at each step. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.

use crate::channel::{ChannelId, Fourcc};
use crate::display::DisplaySlot;
use crate::error::ResolveError;
use crate::restriction::ChannelRestriction;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a raw format code is dropped from a channel's list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatSkippedEvent {
    /// Channel reporting the format.
    pub channel: ChannelId,
    /// Raw code that failed translation.
    pub code: Fourcc,
}

/// Emitted once per failure that invalidates the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolveFailedEvent {
    /// What failed.
    pub error: ResolveError,
}

/// Emitted at the end of every resolve pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolveSummary {
    /// Whether the table is usable.
    pub valid: bool,
    /// Number of enumerated channels.
    pub channel_count: usize,
    /// Number of channels that resolved before the pass ended.
    pub resolved_count: usize,
    /// Number of formats skipped across all channels.
    pub skipped_formats: usize,
}

/// Emitted when a new table replaces the published one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TablePublishedEvent {
    /// Publication counter, starting at 1 for the first table.
    pub generation: u64,
    /// Whether the published table is usable.
    pub valid: bool,
}

/// What happened to a connection-change notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConnectionChangeOutcome {
    /// Delivered to the display in the slot.
    Forwarded,
    /// No display occupies the slot; dropped.
    NoDisplay,
    /// The handler is not registered (yet or anymore); dropped.
    Inactive,
}

/// Emitted for every connection-change notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionChangeEvent {
    /// Event timestamp in microseconds, as delivered by the device.
    pub timestamp_us: u64,
    /// Slot the notification targets.
    pub slot: DisplaySlot,
    /// Outcome.
    pub outcome: ConnectionChangeOutcome,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the resolver and the dispatcher.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after a channel's record is complete.
    fn on_channel_resolved(&mut self, restriction: &ChannelRestriction) {
        _ = restriction;
    }

    /// Called when a format fails translation and is skipped.
    fn on_format_skipped(&mut self, e: &FormatSkippedEvent) {
        _ = e;
    }

    /// Called for each failure that invalidates the table.
    fn on_resolve_failed(&mut self, e: &ResolveFailedEvent) {
        _ = e;
    }

    /// Called at the end of a resolve pass.
    fn on_resolve_summary(&mut self, s: &ResolveSummary) {
        _ = s;
    }

    /// Called when a table is published.
    fn on_table_published(&mut self, e: &TablePublishedEvent) {
        _ = e;
    }

    /// Called for each connection-change notification.
    fn on_connection_change(&mut self, e: &ConnectionChangeEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a resolved channel record.
    #[inline]
    pub fn channel_resolved(&mut self, restriction: &ChannelRestriction) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_channel_resolved(restriction);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = restriction;
        }
    }

    /// Emits a [`FormatSkippedEvent`].
    #[inline]
    pub fn format_skipped(&mut self, e: &FormatSkippedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_format_skipped(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ResolveFailedEvent`].
    #[inline]
    pub fn resolve_failed(&mut self, e: &ResolveFailedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_resolve_failed(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ResolveSummary`].
    #[inline]
    pub fn resolve_summary(&mut self, s: &ResolveSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_resolve_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits a [`TablePublishedEvent`].
    #[inline]
    pub fn table_published(&mut self, e: &TablePublishedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_table_published(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ConnectionChangeEvent`].
    #[inline]
    pub fn connection_change(&mut self, e: &ConnectionChangeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_connection_change(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
