// Copyright 2026 the Planecaps Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device interface configuration.

use planecaps_core::display::DisplaySlot;
use planecaps_core::resolve::ResolveOptions;

/// Configuration of a [`DeviceInterface`](crate::DeviceInterface).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DeviceConfig {
    /// Slot whose display receives connection-change notifications.
    pub connection_change_slot: DisplaySlot,
    /// Resolver options.
    pub resolve: ResolveOptions,
}

impl DeviceConfig {
    /// Returns a copy routing connection changes to `slot`.
    #[must_use]
    pub const fn with_connection_change_slot(mut self, slot: DisplaySlot) -> Self {
        self.connection_change_slot = slot;
        self
    }

    /// Returns a copy with the given resolver options.
    #[must_use]
    pub const fn with_resolve_options(mut self, resolve: ResolveOptions) -> Self {
        self.resolve = resolve;
        self
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            connection_change_slot: DisplaySlot::External,
            resolve: ResolveOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planecaps_core::resolve::DiagnosticMode;

    #[test]
    fn default_routes_to_external_slot() {
        let config = DeviceConfig::default();
        assert_eq!(config.connection_change_slot, DisplaySlot::External);
        assert_eq!(config.resolve.diagnostics, DiagnosticMode::CollectAll);
    }

    #[test]
    fn builders_override_fields() {
        let config = DeviceConfig::default()
            .with_connection_change_slot(DisplaySlot::Primary)
            .with_resolve_options(ResolveOptions {
                diagnostics: DiagnosticMode::FailFast,
            });
        assert_eq!(config.connection_change_slot, DisplaySlot::Primary);
        assert_eq!(config.resolve.diagnostics, DiagnosticMode::FailFast);
    }
}
