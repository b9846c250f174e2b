// Copyright 2026 the Planecaps Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bridge to the `tracing` ecosystem.
//!
//! [`TracingSink`] turns every event into a `tracing` event under the
//! `planecaps` target, so planecaps diagnostics show up in whatever
//! subscriber the host process installs. Failures are logged at `warn`,
//! resolved channels and dropped notifications at `debug`, everything else
//! at `info`.

use planecaps_core::restriction::ChannelRestriction;
use planecaps_core::trace::{
    ConnectionChangeEvent, ConnectionChangeOutcome, FormatSkippedEvent, ResolveFailedEvent,
    ResolveSummary, TablePublishedEvent, TraceSink,
};

/// Forwards trace events to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn on_channel_resolved(&mut self, r: &ChannelRestriction) {
        tracing::debug!(
            target: "planecaps",
            channel = r.channel.0,
            hw_id = r.hw_id,
            attributes = r.attributes.bits(),
            formats = r.formats.len(),
            "channel resolved"
        );
    }

    fn on_format_skipped(&mut self, e: &FormatSkippedEvent) {
        tracing::warn!(
            target: "planecaps",
            channel = e.channel.0,
            code = ?e.code,
            "failed to convert format, skipping"
        );
    }

    fn on_resolve_failed(&mut self, e: &ResolveFailedEvent) {
        tracing::warn!(target: "planecaps", error = %e.error, "restriction query failed");
    }

    fn on_resolve_summary(&mut self, s: &ResolveSummary) {
        if s.valid {
            tracing::info!(
                target: "planecaps",
                channels = s.channel_count,
                skipped_formats = s.skipped_formats,
                "restrictions resolved"
            );
        } else {
            tracing::warn!(
                target: "planecaps",
                channels = s.channel_count,
                resolved = s.resolved_count,
                "no usable restriction information, using default values"
            );
        }
    }

    fn on_table_published(&mut self, e: &TablePublishedEvent) {
        tracing::info!(
            target: "planecaps",
            generation = e.generation,
            valid = e.valid,
            "restriction table published"
        );
    }

    fn on_connection_change(&mut self, e: &ConnectionChangeEvent) {
        match e.outcome {
            ConnectionChangeOutcome::Forwarded => tracing::info!(
                target: "planecaps",
                timestamp_us = e.timestamp_us,
                slot = ?e.slot,
                "connection change forwarded"
            ),
            outcome => tracing::debug!(
                target: "planecaps",
                timestamp_us = e.timestamp_us,
                slot = ?e.slot,
                ?outcome,
                "connection change dropped"
            ),
        }
    }
}
