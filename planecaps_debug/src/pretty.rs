// Copyright 2026 the Planecaps Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes to a
//! [`Write`](std::io::Write) destination (default: stderr). Each resolved
//! channel is dumped as a block listing every limit; other events take one
//! line each.

use std::io::Write;

use planecaps_core::restriction::{ChannelRestriction, SizeRange};
use planecaps_core::trace::{
    ConnectionChangeEvent, ConnectionChangeOutcome, FormatSkippedEvent, ResolveFailedEvent,
    ResolveSummary, TablePublishedEvent, TraceSink,
};

/// Writes human-readable trace output to a [`Write`](std::io::Write)
/// destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write + Send>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the destination.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn range(&mut self, name: &str, r: SizeRange) {
        let _ = writeln!(
            self.writer,
            "  {name:<12} min={} max={} align={}",
            r.min, r.max, r.align,
        );
    }
}

fn outcome_name(outcome: ConnectionChangeOutcome) -> &'static str {
    match outcome {
        ConnectionChangeOutcome::Forwarded => "forwarded",
        ConnectionChangeOutcome::NoDisplay => "no-display",
        ConnectionChangeOutcome::Inactive => "inactive",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_channel_resolved(&mut self, r: &ChannelRestriction) {
        let l = r.limits;
        let _ = writeln!(
            self.writer,
            "[channel] {} hw_id={} attr={:#x} formats={}",
            r.channel,
            r.hw_id,
            r.attributes.bits(),
            r.formats.len(),
        );
        self.range("src_f_w", l.src_full_width);
        self.range("src_f_h", l.src_full_height);
        self.range("src_w", l.src_width);
        self.range("src_h", l.src_height);
        let _ = writeln!(
            self.writer,
            "  src_align    x={} y={}",
            l.src_x_align, l.src_y_align,
        );
        self.range("dst_f_w", l.dst_full_width);
        self.range("dst_f_h", l.dst_full_height);
        self.range("dst_w", l.dst_width);
        self.range("dst_h", l.dst_height);
        let _ = writeln!(
            self.writer,
            "  dst_align    x={} y={}",
            l.dst_x_align, l.dst_y_align,
        );
        self.range("blk_w", l.block_width);
        self.range("blk_h", l.block_height);
        let _ = writeln!(
            self.writer,
            "  blk_align    x={} y={}",
            l.block_x_align, l.block_y_align,
        );
        let _ = writeln!(
            self.writer,
            "  rot_max_h={} scale_down={} scale_up={}",
            l.src_height_rot_max, l.scale.down, l.scale.up,
        );
        let formats: Vec<String> = r.formats.iter().map(|f| format!("{:#x}", f.0)).collect();
        let _ = writeln!(self.writer, "  formats: [{}]", formats.join(", "));
    }

    fn on_format_skipped(&mut self, e: &FormatSkippedEvent) {
        let _ = writeln!(
            self.writer,
            "[format:skip] {} code={:?}",
            e.channel, e.code,
        );
    }

    fn on_resolve_failed(&mut self, e: &ResolveFailedEvent) {
        let _ = writeln!(self.writer, "[resolve:fail] {}", e.error);
    }

    fn on_resolve_summary(&mut self, s: &ResolveSummary) {
        let valid = if s.valid { "ok" } else { "INVALID" };
        let _ = writeln!(
            self.writer,
            "[resolve] {valid} channels={}/{} skipped_formats={}",
            s.resolved_count, s.channel_count, s.skipped_formats,
        );
    }

    fn on_table_published(&mut self, e: &TablePublishedEvent) {
        let source = if e.valid { "queried" } else { "defaults" };
        let _ = writeln!(
            self.writer,
            "[publish] generation={} using={source}",
            e.generation,
        );
    }

    fn on_connection_change(&mut self, e: &ConnectionChangeEvent) {
        let _ = writeln!(
            self.writer,
            "[hotplug] ts={}µs slot={:?} {}",
            e.timestamp_us,
            e.slot,
            outcome_name(e.outcome),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planecaps_core::channel::{BlobId, ChannelId};
    use planecaps_core::display::DisplaySlot;
    use planecaps_core::error::ResolveError;
    use planecaps_core::format::{FormatList, PixelFormat};
    use planecaps_core::restriction::{ChannelAttributes, GeometryLimits};

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn channel_block_lists_limits_and_formats() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        let formats: FormatList = [PixelFormat(1), PixelFormat(0x11)].into_iter().collect();
        sink.on_channel_resolved(&ChannelRestriction {
            channel: ChannelId(3),
            hw_id: 2,
            attributes: ChannelAttributes::INPUT_DMA | ChannelAttributes::AFBC,
            limits: GeometryLimits {
                src_width: SizeRange::new(16, 4096, 2),
                ..GeometryLimits::default()
            },
            formats,
        });
        let out = output(sink);
        assert!(out.contains("[channel] channel 3 hw_id=2 attr=0x10001"), "got: {out}");
        assert!(out.contains("min=16 max=4096 align=2"), "got: {out}");
        assert!(out.contains("formats: [0x1, 0x11]"), "got: {out}");
    }

    #[test]
    fn one_line_events() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_resolve_failed(&ResolveFailedEvent {
            error: ResolveError::BlobRetrievalFailed {
                channel: ChannelId(2),
                blob: BlobId(41),
            },
        });
        sink.on_resolve_summary(&ResolveSummary {
            valid: false,
            channel_count: 3,
            resolved_count: 2,
            skipped_formats: 0,
        });
        sink.on_table_published(&TablePublishedEvent {
            generation: 1,
            valid: false,
        });
        sink.on_connection_change(&ConnectionChangeEvent {
            timestamp_us: 7,
            slot: DisplaySlot::External,
            outcome: ConnectionChangeOutcome::Forwarded,
        });
        let out = output(sink);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 4, "got: {out}");
        assert!(lines[0].starts_with("[resolve:fail] channel 2"), "got: {out}");
        assert_eq!(lines[1], "[resolve] INVALID channels=2/3 skipped_formats=0");
        assert_eq!(lines[2], "[publish] generation=1 using=defaults");
        assert_eq!(lines[3], "[hotplug] ts=7µs slot=External forwarded");
    }
}
