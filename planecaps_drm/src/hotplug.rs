// Copyright 2026 the Planecaps Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Connection-change dispatch.
//!
//! [`ConnectionChangeForwarder`] is the handler installed with the device's
//! [`EventSource`]. On each event it looks up the display in its configured
//! slot and calls [`HandleConnectionChange::handle_connection_change`] on it,
//! synchronously, in the delivery context. An empty slot drops the event.
//!
//! # Registration lifetime
//!
//! The forwarder moves through `Unregistered -> Registered -> Closed` exactly
//! once. [`HotplugRegistration`] is the only way to reach `Registered`, and
//! its `Drop` is the only way to reach `Closed`, so a forwarder is registered
//! and unregistered once per device interface. Any other transition is a
//! programming error and panics.
//!
//! Delivery holds the read side of the forwarder's gate for the whole
//! forward; closing takes the write side. Closing therefore waits for every
//! in-flight delivery, and no delivery reaches a display after the
//! registration is gone, even if the source still holds the handler.
//! Displays must not tear down the registration from inside
//! `handle_connection_change`.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use planecaps_core::display::{DisplayRegistry, DisplaySlot};
use planecaps_core::trace::{ConnectionChangeEvent, ConnectionChangeOutcome, Tracer};

use crate::event::{EventHandler, EventSource};
use crate::{LockPerEvent, SharedSink};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GateState {
    Unregistered,
    Registered,
    Closed,
}

#[cold]
#[track_caller]
fn lifecycle_misuse(op: &str, state: GateState) -> ! {
    panic!("connection-change handler misuse: {op} while {state:?}");
}

/// Forwards device connection changes to the display in one slot.
pub struct ConnectionChangeForwarder {
    displays: Arc<dyn DisplayRegistry>,
    slot: DisplaySlot,
    gate: RwLock<GateState>,
    sink: SharedSink,
}

impl fmt::Debug for ConnectionChangeForwarder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ConnectionChangeForwarder");
        s.field("slot", &self.slot);
        // A waiting `close` blocks new readers, so never wait here.
        match self.gate.try_read() {
            Some(gate) => s.field("gate", &*gate),
            None => s.field("gate", &format_args!("<locked>")),
        };
        s.finish_non_exhaustive()
    }
}

impl ConnectionChangeForwarder {
    /// Creates an unregistered forwarder targeting `slot`.
    #[must_use]
    pub fn new(displays: Arc<dyn DisplayRegistry>, slot: DisplaySlot, sink: SharedSink) -> Self {
        Self {
            displays,
            slot,
            gate: RwLock::new(GateState::Unregistered),
            sink,
        }
    }

    /// Slot this forwarder targets.
    #[must_use]
    pub fn slot(&self) -> DisplaySlot {
        self.slot
    }

    /// Returns `true` between registration and close.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        *self.gate.read() == GateState::Registered
    }

    fn open(&self) {
        let mut gate = self.gate.write();
        match *gate {
            GateState::Unregistered => *gate = GateState::Registered,
            state => lifecycle_misuse("register", state),
        }
    }

    /// Blocks until in-flight deliveries finish, then stops forwarding.
    fn close(&self) {
        let mut gate = self.gate.write();
        match *gate {
            GateState::Registered => *gate = GateState::Closed,
            state => lifecycle_misuse("unregister", state),
        }
    }

    fn trace(&self, timestamp_us: u64, outcome: ConnectionChangeOutcome) {
        let mut sink = LockPerEvent(&self.sink);
        Tracer::new(&mut sink).connection_change(&ConnectionChangeEvent {
            timestamp_us,
            slot: self.slot,
            outcome,
        });
    }
}

impl EventHandler for ConnectionChangeForwarder {
    fn on_event(&self, timestamp_us: u64) {
        let gate = self.gate.read();
        if *gate != GateState::Registered {
            drop(gate);
            self.trace(timestamp_us, ConnectionChangeOutcome::Inactive);
            return;
        }
        let outcome = match self.displays.connection_target(self.slot) {
            Some(display) => {
                display.handle_connection_change(timestamp_us);
                ConnectionChangeOutcome::Forwarded
            }
            None => ConnectionChangeOutcome::NoDisplay,
        };
        drop(gate);
        self.trace(timestamp_us, outcome);
    }
}

/// Scoped registration of a [`ConnectionChangeForwarder`] with an
/// [`EventSource`].
///
/// Dropping the registration closes the forwarder, waiting for in-flight
/// deliveries, and removes it from the source.
#[must_use = "dropping the registration unregisters the handler"]
pub struct HotplugRegistration {
    source: Arc<dyn EventSource>,
    forwarder: Arc<ConnectionChangeForwarder>,
}

impl fmt::Debug for HotplugRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HotplugRegistration")
            .field("forwarder", &self.forwarder)
            .finish_non_exhaustive()
    }
}

impl HotplugRegistration {
    /// Registers `forwarder` with `source`.
    ///
    /// # Panics
    ///
    /// Panics if `forwarder` was registered before.
    pub fn register(source: Arc<dyn EventSource>, forwarder: Arc<ConnectionChangeForwarder>) -> Self {
        forwarder.open();
        source.register_handler(Arc::clone(&forwarder) as Arc<dyn EventHandler>);
        Self { source, forwarder }
    }

    /// The registered forwarder.
    #[must_use]
    pub fn forwarder(&self) -> &Arc<ConnectionChangeForwarder> {
        &self.forwarder
    }

    /// Unregisters now. Equivalent to dropping the registration.
    pub fn unregister(self) {
        drop(self);
    }
}

impl Drop for HotplugRegistration {
    fn drop(&mut self) {
        self.forwarder.close();
        let handler: Arc<dyn EventHandler> = Arc::clone(&self.forwarder) as Arc<dyn EventHandler>;
        self.source.unregister_handler(&handler);
    }
}
