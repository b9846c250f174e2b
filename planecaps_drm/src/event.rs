// Copyright 2026 the Planecaps Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device event sources.
//!
//! An [`EventSource`] delivers connection-change notifications to registered
//! [`EventHandler`]s from its own delivery context. [`HotplugListener`] is a
//! ready-made source for device layers that read kernel notifications on a
//! thread of their own and call [`HotplugListener::dispatch`] for each one.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Receives device events.
pub trait EventHandler: Send + Sync {
    /// Handles one event observed at `timestamp_us`.
    fn on_event(&self, timestamp_us: u64);
}

/// Delivers device events to registered handlers.
pub trait EventSource: Send + Sync {
    /// Adds `handler`. It receives events until unregistered.
    fn register_handler(&self, handler: Arc<dyn EventHandler>);

    /// Removes `handler`, identified by pointer.
    fn unregister_handler(&self, handler: &Arc<dyn EventHandler>);
}

/// Returns `true` if both handles point at the same handler object.
pub(crate) fn same_handler(a: &Arc<dyn EventHandler>, b: &Arc<dyn EventHandler>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// An [`EventSource`] dispatching on the caller's thread.
///
/// Dispatches are serialized: a handler never sees two events at once.
#[derive(Default)]
pub struct HotplugListener {
    handlers: Mutex<Vec<Arc<dyn EventHandler>>>,
    dispatching: Mutex<()>,
}

impl fmt::Debug for HotplugListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HotplugListener")
            .field("handlers", &self.handlers.lock().len())
            .finish_non_exhaustive()
    }
}

impl HotplugListener {
    /// Creates a listener with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers an event to every registered handler, in registration order.
    ///
    /// Returns the number of handlers the event was delivered to. The handler
    /// list is snapshotted first, so handlers may (un)register concurrently.
    pub fn dispatch(&self, timestamp_us: u64) -> usize {
        let _serial = self.dispatching.lock();
        let handlers = self.handlers.lock().clone();
        for handler in &handlers {
            handler.on_event(timestamp_us);
        }
        handlers.len()
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.lock().len()
    }
}

impl EventSource for HotplugListener {
    fn register_handler(&self, handler: Arc<dyn EventHandler>) {
        self.handlers.lock().push(handler);
    }

    fn unregister_handler(&self, handler: &Arc<dyn EventHandler>) {
        self.handlers.lock().retain(|h| !same_handler(h, handler));
    }
}
