//! Shared aircraft-state blackboard.
//!
//! The sensor bridge publishes one state per tick under a scoped lock; the
//! geometry core only ever sees an already-consistent snapshot. Concurrent
//! queries against different task points or airspace shapes are safe as
//! long as they share a stable projection; projection updates must be
//! serialized with respect to all geometry queries by the caller.

use std::sync::Mutex;

use crate::models::AircraftState;

#[derive(Debug)]
pub struct StateBlackboard {
    state: Mutex<Option<AircraftState>>,
}

impl Default for StateBlackboard {
    fn default() -> Self {
        Self::new()
    }
}

impl StateBlackboard {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(None),
        }
    }

    /// Publish a new state under the lock. The guard is scoped to this
    /// call, so it is released on every path.
    pub fn publish(&self, state: AircraftState) {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            // A writer panicking mid-store cannot corrupt a plain
            // replacement; take the data and continue.
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(state);
    }

    /// Read-only snapshot of the latest published state, if any.
    pub fn snapshot(&self) -> Option<AircraftState> {
        match self.state.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
