// Copyright 2026 the Planecaps Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The device seam.

use std::sync::Arc;

use planecaps_core::channel::OutputChannel;
use planecaps_core::resolve::BlobSource;

use crate::event::EventSource;

/// A brought-up display device.
///
/// Device enumeration and lifecycle live outside this crate. Implementations
/// expose the enumerated channels, blob retrieval (through [`BlobSource`]),
/// and the device's event source.
pub trait DrmDevice: BlobSource + Send + Sync {
    /// Channels in enumeration order. Fixed for the device's lifetime.
    fn channels(&self) -> &[OutputChannel];

    /// The source delivering connection-change events.
    fn event_source(&self) -> Arc<dyn EventSource>;
}
