// Copyright 2026 the Planecaps Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scan-out channel restriction model and resolver.
//!
//! `planecaps_core` turns the vendor-defined capability blobs that a display
//! device attaches to each of its scan-out channels (hardware planes) into a
//! normalized restriction table. A composition planner reads that table each
//! frame to decide which layers can be offloaded to hardware. It is `no_std`
//! compatible (with `alloc`).
//!
//! # Architecture
//!
//! ```text
//!   OutputChannel[] ──► Resolver::resolve() ──► RestrictionTable
//!        │                   │    ▲                  │
//!        │ BlobId            │    │ PixelFormat[]    ├─ channels()
//!        ▼                   │    │                  ├─ merged()
//!   BlobSource::get_blob()   │  FormatTranslator     └─ features()
//!        │                   ▼
//!        └──► RawChannelRestriction::decode()
//! ```
//!
//! **[`channel`]**: Channel identity, blob ids and raw format codes as
//! enumerated by the device.
//!
//! **[`blob`]**: Bounds-checked decoding of the fixed-layout capability blob.
//!
//! **[`format`]**: Normalized pixel formats, the [`FormatTranslator`]
//! collaborator seam and the deduplicating [`FormatList`].
//!
//! **[`restriction`]**: The normalized per-channel record.
//!
//! **[`derived`]**: Post-processing passes: per-class merged restrictions and
//! the per-channel feature table.
//!
//! **[`resolve`]**: The all-or-nothing [`Resolver`] and [`RestrictionTable`].
//!
//! **[`defaults`]**: Built-in restrictions used when the table is unavailable.
//!
//! **[`display`]**: Display slots and the narrow connection-change capability
//! implemented by hot-pluggable displays.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types, with
//! zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Implements
//!   [`BlobSource`](resolve::BlobSource) for `std::collections::HashMap`.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//!
//! [`FormatTranslator`]: format::FormatTranslator
//! [`FormatList`]: format::FormatList
//! [`Resolver`]: resolve::Resolver
//! [`RestrictionTable`]: resolve::RestrictionTable

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod blob;
pub mod channel;
pub mod defaults;
pub mod derived;
pub mod display;
pub mod error;
pub mod format;
pub mod resolve;
pub mod restriction;
pub mod trace;
