// Copyright 2026 the Planecaps Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The device interface context object.

use std::fmt;
use std::sync::Arc;

use planecaps_core::display::{DisplayRegistry, DisplaySlot};
use planecaps_core::format::FormatTranslator;
use planecaps_core::resolve::{RestrictionTable, Resolver};
use planecaps_core::trace::{TablePublishedEvent, Tracer};

use crate::config::DeviceConfig;
use crate::device::DrmDevice;
use crate::hotplug::{ConnectionChangeForwarder, HotplugRegistration};
use crate::publish::TableCell;
use crate::{LockPerEvent, SharedSink};

/// Per-device state: the published restriction table and the
/// connection-change registration.
///
/// Constructed once per device. Dropping it, or calling
/// [`shutdown`](Self::shutdown), unregisters the connection-change handler,
/// waiting for an in-flight delivery first.
pub struct DeviceInterface<D: DrmDevice + 'static, T: FormatTranslator> {
    device: Arc<D>,
    resolver: Resolver<T>,
    table: TableCell,
    sink: SharedSink,
    config: DeviceConfig,
    hotplug: Option<HotplugRegistration>,
}

impl<D: DrmDevice + 'static, T: FormatTranslator> fmt::Debug for DeviceInterface<D, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceInterface")
            .field("config", &self.config)
            .field("table", &self.table)
            .field("hotplug", &self.hotplug)
            .finish_non_exhaustive()
    }
}

impl<D: DrmDevice + 'static, T: FormatTranslator> DeviceInterface<D, T> {
    /// Initializes the interface for `device`.
    ///
    /// Resolves and publishes the restriction table, registers the
    /// connection-change dispatcher with the device's event source, then
    /// hands the device to the displays in [`DisplaySlot::PHYSICAL`].
    ///
    /// A failed resolve is not an error: the interface comes up with an
    /// invalid table and the planner falls back to the built-in defaults.
    pub fn new(
        device: Arc<D>,
        displays: Arc<dyn DisplayRegistry>,
        translator: T,
        config: DeviceConfig,
        sink: SharedSink,
    ) -> Self {
        let mut this = Self {
            device,
            resolver: Resolver::with_options(translator, config.resolve),
            table: TableCell::new(),
            sink,
            config,
            hotplug: None,
        };
        this.resolve();

        let forwarder = Arc::new(ConnectionChangeForwarder::new(
            Arc::clone(&displays),
            config.connection_change_slot,
            Arc::clone(&this.sink),
        ));
        this.hotplug = Some(HotplugRegistration::register(
            this.device.event_source(),
            forwarder,
        ));

        for slot in DisplaySlot::PHYSICAL {
            displays.bind_device(slot);
        }
        this
    }

    /// Rebuilds and publishes the restriction table.
    ///
    /// Blocks on blob retrieval. Must not be called from the event-delivery
    /// context.
    pub fn resolve(&self) -> Arc<RestrictionTable> {
        let mut sink = LockPerEvent(&self.sink);
        let mut tracer = Tracer::new(&mut sink);
        let table = self
            .resolver
            .resolve(self.device.channels(), &*self.device, &mut tracer);
        let valid = table.is_valid();
        let (table, generation) = self.table.publish(table);
        tracer.table_published(&TablePublishedEvent { generation, valid });
        table
    }

    /// The currently published table.
    #[must_use]
    pub fn current_table(&self) -> Arc<RestrictionTable> {
        self.table.snapshot()
    }

    /// Returns `true` if the planner should use the queried restrictions
    /// rather than the built-in defaults.
    #[must_use]
    pub fn uses_queried_restrictions(&self) -> bool {
        self.table.snapshot().is_valid()
    }

    /// Slot receiving connection-change notifications.
    #[must_use]
    pub fn connection_change_slot(&self) -> DisplaySlot {
        self.config.connection_change_slot
    }

    /// The device.
    #[must_use]
    pub fn device(&self) -> &Arc<D> {
        &self.device
    }

    /// Tears the interface down, unregistering the dispatcher.
    pub fn shutdown(mut self) {
        if let Some(hotplug) = self.hotplug.take() {
            hotplug.unregister();
        }
    }
}

impl<D: DrmDevice + 'static, T: FormatTranslator> Drop for DeviceInterface<D, T> {
    fn drop(&mut self) {
        // Explicit so the dispatcher is gone before any other field.
        drop(self.hotplug.take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noop_sink;
    use crate::testing::{ARGB, Displays, FakeDevice, NV12, RecordingSink, translator};
    use parking_lot::Mutex;
    use planecaps_core::channel::ChannelId;
    use planecaps_core::defaults::{DEFAULT_LIMITS, default_formats};
    use planecaps_core::error::ResolveError;
    use planecaps_core::format::{FormatTable, PixelFormat};
    use planecaps_core::resolve::{DiagnosticMode, ResolveOptions};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    type Interface = DeviceInterface<FakeDevice, FormatTable>;

    fn interface(device: FakeDevice, displays: &Arc<Displays>) -> (Interface, Arc<FakeDevice>) {
        let device = Arc::new(device);
        let interface = DeviceInterface::new(
            Arc::clone(&device),
            Arc::clone(displays) as Arc<dyn DisplayRegistry>,
            translator(),
            DeviceConfig::default(),
            noop_sink(),
        );
        (interface, device)
    }

    #[test]
    fn init_resolves_registers_and_binds() {
        let displays = Arc::new(Displays::default());
        let external = displays.insert_external();
        let (interface, device) =
            interface(FakeDevice::with_channels(&[&[ARGB], &[NV12]]), &displays);

        assert!(interface.uses_queried_restrictions());
        let table = interface.current_table();
        assert_eq!(table.channels().len(), 2);
        assert_eq!(
            table.effective_formats(ChannelId(1)).as_slice(),
            &[PixelFormat(0x11)]
        );
        assert_eq!(device.listener.handler_count(), 1);
        assert_eq!(*displays.bound.lock(), DisplaySlot::PHYSICAL);
        assert_eq!(interface.connection_change_slot(), DisplaySlot::External);

        device.listener.dispatch(42);
        assert_eq!(external.received(), [42]);
    }

    #[test]
    fn connection_changes_stop_after_teardown() {
        let displays = Arc::new(Displays::default());
        let external = displays.insert_external();
        let (interface, device) = interface(FakeDevice::with_channels(&[&[ARGB]]), &displays);

        device.listener.dispatch(1);
        device.listener.dispatch(2);
        interface.shutdown();
        device.listener.dispatch(3);

        assert_eq!(external.received(), [1, 2]);
        assert_eq!(device.listener.handler_count(), 0);
    }

    #[test]
    fn drop_unregisters() {
        let displays = Arc::new(Displays::default());
        let external = displays.insert_external();
        let (interface, device) = interface(FakeDevice::with_channels(&[&[ARGB]]), &displays);

        drop(interface);
        device.listener.dispatch(9);
        assert!(external.received().is_empty());
        assert_eq!(device.listener.handler_count(), 0);
    }

    #[test]
    fn invalid_table_falls_back_to_defaults() {
        let displays = Arc::new(Displays::default());
        let mut device = FakeDevice::with_channels(&[&[ARGB], &[ARGB]]);
        device.channels[1].restriction_blob = None;
        let (interface, _device) = interface(device, &displays);

        assert!(!interface.uses_queried_restrictions());
        let table = interface.current_table();
        assert!(table.channels().is_empty());
        assert_eq!(table.effective_limits(ChannelId(0)), DEFAULT_LIMITS);
        assert_eq!(*table.effective_formats(ChannelId(0)), default_formats());
        assert_eq!(
            table.failures(),
            &[ResolveError::ChannelDataMissing {
                channel: ChannelId(1)
            }]
        );
    }

    #[test]
    fn re_resolve_publishes_a_new_table() {
        let displays = Arc::new(Displays::default());
        let recording = Arc::new(Mutex::new(RecordingSink::default()));
        let device = Arc::new(FakeDevice::with_channels(&[&[ARGB], &[NV12]]));
        let interface = DeviceInterface::new(
            Arc::clone(&device),
            displays,
            translator(),
            DeviceConfig::default(),
            recording.clone(),
        );
        let first = interface.current_table();
        assert!(first.is_valid());

        // The device stops returning one blob; the next resolve is invalid.
        device.blobs.lock().remove(&101);
        let second = interface.resolve();
        assert!(!second.is_valid());
        assert!(!interface.uses_queried_restrictions());
        // Earlier snapshots are unaffected.
        assert!(first.is_valid());

        let sink = recording.lock();
        let published: Vec<_> = sink
            .published
            .iter()
            .map(|e| (e.generation, e.valid))
            .collect();
        assert_eq!(published, [(1, true), (2, false)]);
        assert_eq!(sink.summaries.len(), 2);
        assert_eq!(sink.failures.len(), 1);
    }

    #[test]
    fn fail_fast_config_reaches_the_resolver() {
        let displays = Arc::new(Displays::default());
        let mut device = FakeDevice::with_channels(&[&[ARGB], &[ARGB], &[ARGB]]);
        device.channels[0].restriction_blob = None;
        device.channels[2].restriction_blob = None;
        let config = DeviceConfig::default().with_resolve_options(ResolveOptions {
            diagnostics: DiagnosticMode::FailFast,
        });
        let interface: Interface = DeviceInterface::new(
            Arc::new(device),
            displays,
            translator(),
            config,
            noop_sink(),
        );
        assert_eq!(interface.current_table().failures().len(), 1);
    }

    #[test]
    fn connection_changes_follow_the_configured_slot() {
        let displays = Arc::new(Displays::default());
        let external = displays.insert_external();
        let primary = displays.insert(DisplaySlot::Primary);
        let device = Arc::new(FakeDevice::with_channels(&[&[ARGB]]));
        let config = DeviceConfig::default().with_connection_change_slot(DisplaySlot::Primary);
        let _interface: Interface = DeviceInterface::new(
            Arc::clone(&device),
            displays,
            translator(),
            config,
            noop_sink(),
        );

        device.listener.dispatch(5);
        assert_eq!(primary.received(), [5]);
        assert!(external.received().is_empty());
    }

    #[test]
    fn connection_changes_are_not_held_up_by_a_slow_resolve() {
        let displays = Arc::new(Displays::default());
        let external = displays.insert_external();
        let recording = Arc::new(Mutex::new(RecordingSink::default()));
        let device = Arc::new(FakeDevice::with_channels(&[&[ARGB], &[NV12]]));
        let interface: Arc<Interface> = Arc::new(DeviceInterface::new(
            Arc::clone(&device),
            displays,
            translator(),
            DeviceConfig::default(),
            recording.clone(),
        ));

        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        *device.stall.lock() = Some((entered_tx, release_rx));
        let resolving = {
            let interface = Arc::clone(&interface);
            thread::spawn(move || interface.resolve().is_valid())
        };
        entered_rx.recv().unwrap();

        // The resolver is now blocked inside blob retrieval.
        let (done_tx, done_rx) = mpsc::channel();
        let delivery = {
            let listener = Arc::clone(&device.listener);
            thread::spawn(move || {
                listener.dispatch(1);
                listener.dispatch(2);
                done_tx.send(()).unwrap();
            })
        };
        assert!(
            done_rx.recv_timeout(Duration::from_secs(5)).is_ok(),
            "delivery must not wait for a resolve in progress"
        );
        assert_eq!(external.received(), [1, 2]);
        assert_eq!(recording.lock().connection_changes.len(), 2);

        release_tx.send(()).unwrap();
        assert!(resolving.join().unwrap());
        delivery.join().unwrap();
        assert_eq!(interface.current_table().channels().len(), 2);
    }
}
