// Copyright 2026 the Planecaps Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display slots and the capabilities the device layer needs from displays.
//!
//! The device layer never sees concrete display types. A display that reacts
//! to connection changes implements [`HandleConnectionChange`]; the owner of
//! the displays implements [`DisplayRegistry`] to hand it out per slot.

use alloc::sync::Arc;

/// Well-known display slots of a device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DisplaySlot {
    /// The built-in panel.
    Primary,
    /// The hot-pluggable output.
    External,
    /// A virtual (writeback) display.
    Virtual,
}

impl DisplaySlot {
    /// Slots that receive the device at initialization.
    pub const PHYSICAL: [Self; 2] = [Self::Primary, Self::External];
}

/// Reacts to a change in the device's connector topology.
///
/// Called synchronously from the device's event-delivery context, possibly
/// concurrently with the composition planner.
pub trait HandleConnectionChange: Send + Sync {
    /// Handles one connection change observed at `timestamp_us`.
    fn handle_connection_change(&self, timestamp_us: u64);
}

/// Looks up displays by slot.
pub trait DisplayRegistry: Send + Sync {
    /// Returns the connection-change target in `slot`, if a display that
    /// handles connection changes is instantiated there.
    fn connection_target(&self, slot: DisplaySlot) -> Option<Arc<dyn HandleConnectionChange>>;

    /// Hands the initialized device to the display in `slot`.
    ///
    /// Returns `true` if a display occupies the slot. The default does
    /// nothing and reports an empty slot.
    fn bind_device(&self, slot: DisplaySlot) -> bool {
        _ = slot;
        false
    }
}

impl<T: DisplayRegistry + ?Sized> DisplayRegistry for Arc<T> {
    fn connection_target(&self, slot: DisplaySlot) -> Option<Arc<dyn HandleConnectionChange>> {
        (**self).connection_target(slot)
    }

    fn bind_device(&self, slot: DisplaySlot) -> bool {
        (**self).bind_device(slot)
    }
}
