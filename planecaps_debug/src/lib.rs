// Copyright 2026 the Planecaps Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing, JSON export, and `tracing` bridges for planecaps
//! diagnostics.
//!
//! This crate provides [`TraceSink`](planecaps_core::trace::TraceSink)
//! implementations for development and bring-up:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable output, one block per
//!   resolved channel and one line per other event.
//! - [`json::JsonSink`]: one JSON object per event, plus [`json::table_to_json`]
//!   for dumping a whole [`RestrictionTable`](planecaps_core::resolve::RestrictionTable).
//! - [`tracing_sink::TracingSink`]: forwards events to the `tracing` macros.

pub mod json;
pub mod pretty;
pub mod tracing_sink;
