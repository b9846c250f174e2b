// Copyright 2026 the Planecaps Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test doubles shared by the unit tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};

use parking_lot::Mutex;
use planecaps_core::blob::RawChannelRestriction;
use planecaps_core::channel::{BlobId, ChannelId, Fourcc, OutputChannel};
use planecaps_core::display::{DisplayRegistry, DisplaySlot, HandleConnectionChange};
use planecaps_core::format::{FormatTable, PixelFormat};
use planecaps_core::resolve::BlobSource;
use planecaps_core::restriction::{ChannelAttributes, SizeRange};
use planecaps_core::trace::{
    ConnectionChangeEvent, ResolveFailedEvent, ResolveSummary, TablePublishedEvent, TraceSink,
};

use crate::device::DrmDevice;
use crate::event::{EventSource, HotplugListener};

pub(crate) const ARGB: Fourcc = Fourcc::from_chars(*b"AR24");
pub(crate) const NV12: Fourcc = Fourcc::from_chars(*b"NV12");

pub(crate) fn translator() -> FormatTable {
    FormatTable::new()
        .with(ARGB, &[PixelFormat(1)])
        .with(NV12, &[PixelFormat(0x11)])
}

/// A display recording the timestamps it was notified with.
#[derive(Default)]
pub(crate) struct RecordingDisplay {
    received: Mutex<Vec<u64>>,
    /// Signals entry, then waits for release, on every notification.
    handshake: Option<(Mutex<Sender<()>>, Mutex<Receiver<()>>)>,
}

impl RecordingDisplay {
    pub(crate) fn blocking(entered: Sender<()>, release: Receiver<()>) -> Self {
        Self {
            received: Mutex::default(),
            handshake: Some((Mutex::new(entered), Mutex::new(release))),
        }
    }

    pub(crate) fn received(&self) -> Vec<u64> {
        self.received.lock().clone()
    }
}

impl HandleConnectionChange for RecordingDisplay {
    fn handle_connection_change(&self, timestamp_us: u64) {
        if let Some((entered, release)) = &self.handshake {
            entered.lock().send(()).unwrap();
            release.lock().recv().unwrap();
        }
        self.received.lock().push(timestamp_us);
    }
}

/// Display registry keyed by slot. Records `bind_device` calls.
#[derive(Default)]
pub(crate) struct Displays {
    displays: Mutex<HashMap<DisplaySlot, Arc<RecordingDisplay>>>,
    pub(crate) bound: Mutex<Vec<DisplaySlot>>,
}

impl Displays {
    pub(crate) fn insert(&self, slot: DisplaySlot) -> Arc<RecordingDisplay> {
        let display = Arc::new(RecordingDisplay::default());
        self.displays.lock().insert(slot, Arc::clone(&display));
        display
    }

    pub(crate) fn insert_external(&self) -> Arc<RecordingDisplay> {
        self.insert(DisplaySlot::External)
    }

    pub(crate) fn set_external(&self, display: Arc<RecordingDisplay>) {
        self.displays.lock().insert(DisplaySlot::External, display);
    }
}

impl DisplayRegistry for Displays {
    fn connection_target(&self, slot: DisplaySlot) -> Option<Arc<dyn HandleConnectionChange>> {
        self.displays
            .lock()
            .get(&slot)
            .map(|d| Arc::clone(d) as Arc<dyn HandleConnectionChange>)
    }

    fn bind_device(&self, slot: DisplaySlot) -> bool {
        self.bound.lock().push(slot);
        self.displays.lock().contains_key(&slot)
    }
}

/// A sink keeping the events the device layer emits.
#[derive(Default)]
pub(crate) struct RecordingSink {
    pub(crate) connection_changes: Vec<ConnectionChangeEvent>,
    pub(crate) failures: Vec<ResolveFailedEvent>,
    pub(crate) summaries: Vec<ResolveSummary>,
    pub(crate) published: Vec<TablePublishedEvent>,
}

impl TraceSink for RecordingSink {
    fn on_resolve_failed(&mut self, e: &ResolveFailedEvent) {
        self.failures.push(*e);
    }

    fn on_resolve_summary(&mut self, s: &ResolveSummary) {
        self.summaries.push(*s);
    }

    fn on_table_published(&mut self, e: &TablePublishedEvent) {
        self.published.push(*e);
    }

    fn on_connection_change(&mut self, e: &ConnectionChangeEvent) {
        self.connection_changes.push(*e);
    }
}

/// An in-memory device whose events are delivered by a [`HotplugListener`].
pub(crate) struct FakeDevice {
    pub(crate) channels: Vec<OutputChannel>,
    pub(crate) blobs: Mutex<BTreeMap<u64, Vec<u8>>>,
    pub(crate) listener: Arc<HotplugListener>,
    /// Armed by a test to stall the next blob fetch: signals entry, then
    /// waits for release.
    pub(crate) stall: Mutex<Option<(Sender<()>, Receiver<()>)>>,
}

impl FakeDevice {
    /// A device with one channel per entry of `formats`, each with a valid
    /// blob numbered `100 + index`.
    pub(crate) fn with_channels(formats: &[&[Fourcc]]) -> Self {
        let mut blobs = BTreeMap::new();
        let mut channels = Vec::new();
        for (i, f) in formats.iter().enumerate() {
            let hw_id = i32::try_from(i).unwrap();
            let blob = 100 + u64::try_from(i).unwrap();
            let raw = RawChannelRestriction {
                id: hw_id,
                attr: ChannelAttributes::INPUT_DMA.bits(),
                src_f_w: SizeRange::new(16, 8192, 1),
                src_w: SizeRange::new(16, 4096, 1),
                dst_w: SizeRange::new(16, 4096, 1),
                scale_down: 1,
                scale_up: 1,
                ..RawChannelRestriction::default()
            };
            blobs.insert(blob, raw.encode());
            channels.push(OutputChannel::new(
                ChannelId(u32::try_from(i).unwrap()),
                Some(BlobId(blob)),
                f.to_vec(),
            ));
        }
        Self {
            channels,
            blobs: Mutex::new(blobs),
            listener: Arc::new(HotplugListener::new()),
            stall: Mutex::new(None),
        }
    }
}

impl BlobSource for FakeDevice {
    fn get_blob(&self, id: BlobId) -> Option<Vec<u8>> {
        let stall = self.stall.lock().take();
        if let Some((entered, release)) = stall {
            entered.send(()).unwrap();
            release.recv().unwrap();
        }
        self.blobs.lock().get(&id.0).cloned()
    }
}

impl DrmDevice for FakeDevice {
    fn channels(&self) -> &[OutputChannel] {
        &self.channels
    }

    fn event_source(&self) -> Arc<dyn EventSource> {
        Arc::clone(&self.listener) as Arc<dyn EventSource>
    }
}
