// Copyright 2026 the Planecaps Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Whole-table publication.

use std::sync::Arc;

use parking_lot::Mutex;
use planecaps_core::resolve::RestrictionTable;

#[derive(Debug)]
struct Published {
    table: Arc<RestrictionTable>,
    generation: u64,
}

/// Holds the current [`RestrictionTable`].
///
/// A table is never mutated after publication. [`publish`](Self::publish)
/// swaps in a complete new table; [`snapshot`](Self::snapshot) hands out the
/// current one. The lock is held only for the pointer swap or clone, so
/// readers never observe a partly built table.
#[derive(Debug)]
pub struct TableCell {
    current: Mutex<Published>,
}

impl TableCell {
    /// Creates a cell holding [`RestrictionTable::unavailable`] at
    /// generation `0`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: Mutex::new(Published {
                table: Arc::new(RestrictionTable::unavailable()),
                generation: 0,
            }),
        }
    }

    /// Replaces the current table. Returns the published table and its
    /// generation.
    pub fn publish(&self, table: RestrictionTable) -> (Arc<RestrictionTable>, u64) {
        let table = Arc::new(table);
        let mut current = self.current.lock();
        current.generation += 1;
        current.table = Arc::clone(&table);
        (table, current.generation)
    }

    /// Returns the current table.
    #[must_use]
    pub fn snapshot(&self) -> Arc<RestrictionTable> {
        Arc::clone(&self.current.lock().table)
    }

    /// Number of tables published so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.current.lock().generation
    }
}

impl Default for TableCell {
    fn default() -> Self {
        Self::new()
    }
}
