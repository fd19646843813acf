//! Per-connection held controls.
//!
//! Tracks the repeats an operator WebSocket started and has not yet
//! released, so they can be released when the socket goes away. A press
//! that joined a repeat someone else started is not tracked.

use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::Direction;

/// Repeats started by a single operator connection.
#[derive(Debug, Default)]
pub struct HeldControls {
    held: HashMap<Direction, Uuid>,
}

impl HeldControls {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that this connection started repeat `id` for `direction`.
    pub fn press(&mut self, direction: Direction, id: Uuid) {
        self.held.insert(direction, id);
    }

    /// Records a release. Returns the repeat ID if it was held.
    pub fn release(&mut self, direction: Direction) -> Option<Uuid> {
        self.held.remove(&direction)
    }

    /// Returns the number of held directions.
    #[must_use]
    pub fn count(&self) -> usize {
        self.held.len()
    }

    /// Removes and returns every held direction with its repeat ID.
    pub fn drain(&mut self) -> Vec<(Direction, Uuid)> {
        self.held.drain().collect()
    }
}
