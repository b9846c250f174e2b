// Copyright 2026 the Planecaps Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device interface for planecaps.
//!
//! This crate owns the process-lifetime state of one display device:
//!
//! - The published [`RestrictionTable`], rebuilt by an explicit resolve and
//!   swapped in whole ([`TableCell`]).
//! - The connection-change dispatcher, registered with the device's
//!   [`EventSource`] at construction and unregistered on every teardown path
//!   ([`HotplugRegistration`]).
//!
//! [`DeviceInterface`] ties both together and is the only object integrators
//! need to keep alive.
//!
//! # Execution contexts
//!
//! ```text
//!   owning context                     event-delivery context
//!   --------------                     ----------------------
//!   DeviceInterface::new()
//!     ├─ resolve() ──► TableCell::publish()
//!     └─ HotplugRegistration::register()
//!                                      EventSource ──► on_event(ts)
//!   planner: current_table() (snapshot)     └─ HandleConnectionChange
//!   DeviceInterface drop / shutdown()
//!     └─ close gate (waits for in-flight on_event) ──► unregister
//! ```
//!
//! [`RestrictionTable`]: planecaps_core::resolve::RestrictionTable

mod config;
mod device;
mod event;
mod hotplug;
mod interface;
mod publish;
#[cfg(test)]
mod testing;

use std::sync::Arc;

use parking_lot::Mutex;
use planecaps_core::restriction::ChannelRestriction;
use planecaps_core::trace::{
    ConnectionChangeEvent, FormatSkippedEvent, NoopSink, ResolveFailedEvent, ResolveSummary,
    TablePublishedEvent, TraceSink,
};

pub use config::DeviceConfig;
pub use device::DrmDevice;
pub use event::{EventHandler, EventSource, HotplugListener};
pub use hotplug::{ConnectionChangeForwarder, HotplugRegistration};
pub use interface::DeviceInterface;
pub use publish::TableCell;

/// A trace sink shared between the owning and event-delivery contexts.
pub type SharedSink = Arc<Mutex<dyn TraceSink + Send>>;

/// Returns a [`SharedSink`] that discards every event.
#[must_use]
pub fn noop_sink() -> SharedSink {
    Arc::new(Mutex::new(NoopSink))
}

/// Wraps `sink` for sharing.
#[must_use]
pub fn shared_sink<S: TraceSink + Send + 'static>(sink: S) -> SharedSink {
    Arc::new(Mutex::new(sink))
}

/// Borrows a [`SharedSink`], locking it once per event.
///
/// The lock is never held between events, so a long resolve does not stall
/// connection-change tracing in the delivery context.
pub(crate) struct LockPerEvent<'a>(pub(crate) &'a SharedSink);

impl TraceSink for LockPerEvent<'_> {
    fn on_channel_resolved(&mut self, restriction: &ChannelRestriction) {
        self.0.lock().on_channel_resolved(restriction);
    }

    fn on_format_skipped(&mut self, e: &FormatSkippedEvent) {
        self.0.lock().on_format_skipped(e);
    }

    fn on_resolve_failed(&mut self, e: &ResolveFailedEvent) {
        self.0.lock().on_resolve_failed(e);
    }

    fn on_resolve_summary(&mut self, s: &ResolveSummary) {
        self.0.lock().on_resolve_summary(s);
    }

    fn on_table_published(&mut self, e: &TablePublishedEvent) {
        self.0.lock().on_table_published(e);
    }

    fn on_connection_change(&mut self, e: &ConnectionChangeEvent) {
        self.0.lock().on_connection_change(e);
    }
}
