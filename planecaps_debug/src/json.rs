// Copyright 2026 the Planecaps Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export.
//!
//! [`JsonSink`] writes one JSON object per event, newline separated, so a
//! bring-up log can be filtered with line-oriented tools. [`table_to_json`]
//! dumps a complete [`RestrictionTable`].

use std::io::Write;

use serde_json::{Value, json};

use planecaps_core::derived::ChannelClass;
use planecaps_core::format::FormatList;
use planecaps_core::resolve::RestrictionTable;
use planecaps_core::restriction::{ChannelRestriction, GeometryLimits, SizeRange};
use planecaps_core::trace::{
    ConnectionChangeEvent, FormatSkippedEvent, ResolveFailedEvent, ResolveSummary,
    TablePublishedEvent, TraceSink,
};

/// Writes one JSON object per event to a [`Write`](std::io::Write)
/// destination.
pub struct JsonSink<W: Write> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for JsonSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSink").finish_non_exhaustive()
    }
}

impl<W: Write> JsonSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the destination.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self, value: &Value) {
        let _ = writeln!(self.writer, "{value}");
    }
}

fn range(r: SizeRange) -> Value {
    json!({ "min": r.min, "max": r.max, "align": r.align })
}

fn limits(l: &GeometryLimits) -> Value {
    json!({
        "src_full_width": range(l.src_full_width),
        "src_full_height": range(l.src_full_height),
        "src_width": range(l.src_width),
        "src_height": range(l.src_height),
        "src_x_align": l.src_x_align,
        "src_y_align": l.src_y_align,
        "dst_full_width": range(l.dst_full_width),
        "dst_full_height": range(l.dst_full_height),
        "dst_width": range(l.dst_width),
        "dst_height": range(l.dst_height),
        "dst_x_align": l.dst_x_align,
        "dst_y_align": l.dst_y_align,
        "block_width": range(l.block_width),
        "block_height": range(l.block_height),
        "block_x_align": l.block_x_align,
        "block_y_align": l.block_y_align,
        "src_height_rot_max": l.src_height_rot_max,
        "scale_down": l.scale.down,
        "scale_up": l.scale.up,
    })
}

fn formats(list: &FormatList) -> Value {
    list.iter().map(|f| f.0).collect()
}

fn channel(r: &ChannelRestriction) -> Value {
    json!({
        "channel": r.channel.0,
        "hw_id": r.hw_id,
        "attributes": r.attributes.bits(),
        "limits": limits(&r.limits),
        "formats": formats(&r.formats),
    })
}

fn class_name(class: ChannelClass) -> &'static str {
    match class {
        ChannelClass::Graphics => "graphics",
        ChannelClass::Video => "video",
        ChannelClass::VideoScale => "video_scale",
        ChannelClass::VideoScaleRotate => "video_scale_rotate",
    }
}

/// Converts a whole table to JSON.
///
/// Failures and warnings are rendered with their `Display` text.
#[must_use]
pub fn table_to_json(table: &RestrictionTable) -> Value {
    let merged: Vec<Value> = table
        .merged()
        .iter()
        .map(|c| {
            json!({
                "class": class_name(c.class),
                "limits": limits(&c.limits),
                "formats": formats(&c.formats),
                "channels": c.channels.iter().map(|id| id.0).collect::<Vec<_>>(),
            })
        })
        .collect();
    let features: Vec<Value> = table
        .features()
        .iter()
        .map(|e| json!({ "channel": e.channel.0, "features": e.features.bits() }))
        .collect();
    json!({
        "valid": table.is_valid(),
        "channel_count": table.channel_count(),
        "channels": table.channels().iter().map(channel).collect::<Vec<_>>(),
        "merged": merged,
        "features": features,
        "failures": table.failures().iter().map(ToString::to_string).collect::<Vec<_>>(),
        "warnings": table.warnings().iter().map(ToString::to_string).collect::<Vec<_>>(),
    })
}

impl<W: Write> TraceSink for JsonSink<W> {
    fn on_channel_resolved(&mut self, r: &ChannelRestriction) {
        self.emit(&json!({ "event": "channel_resolved", "record": channel(r) }));
    }

    fn on_format_skipped(&mut self, e: &FormatSkippedEvent) {
        self.emit(&json!({
            "event": "format_skipped",
            "channel": e.channel.0,
            "code": format!("{:?}", e.code),
        }));
    }

    fn on_resolve_failed(&mut self, e: &ResolveFailedEvent) {
        self.emit(&json!({
            "event": "resolve_failed",
            "channel": e.error.channel().map(|c| c.0),
            "error": e.error.to_string(),
        }));
    }

    fn on_resolve_summary(&mut self, s: &ResolveSummary) {
        self.emit(&json!({
            "event": "resolve_summary",
            "valid": s.valid,
            "channel_count": s.channel_count,
            "resolved_count": s.resolved_count,
            "skipped_formats": s.skipped_formats,
        }));
    }

    fn on_table_published(&mut self, e: &TablePublishedEvent) {
        self.emit(&json!({
            "event": "table_published",
            "generation": e.generation,
            "valid": e.valid,
        }));
    }

    fn on_connection_change(&mut self, e: &ConnectionChangeEvent) {
        self.emit(&json!({
            "event": "connection_change",
            "timestamp_us": e.timestamp_us,
            "slot": format!("{:?}", e.slot),
            "outcome": format!("{:?}", e.outcome),
        }));
    }
}
