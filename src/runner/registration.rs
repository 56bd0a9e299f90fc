//! Registration guard
//!
//! Scoped coupling of a runner to its collection's cursor registry:
//! construction registers, destruction deregisters, on every exit path.
//! Runners without a collection (the EOF case) skip registration.

use std::sync::Arc;

use crate::catalog::{Collection, RunnerId};

use super::runner::Runner;

/// Holds a cursor-registry slot for a runner's lifetime
pub struct RegistrationGuard {
    collection: Option<Arc<Collection>>,
    id: RunnerId,
}

impl RegistrationGuard {
    /// Registers the runner if it has a collection
    pub fn new(runner: &dyn Runner) -> Self {
        let collection = runner.collection().cloned();
        if let Some(c) = &collection {
            c.cursors().register(runner.id());
        }
        Self {
            collection,
            id: runner.id(),
        }
    }

    /// Returns true if a slot is held
    pub fn is_registered(&self) -> bool {
        self.collection
            .as_ref()
            .map(|c| c.cursors().is_registered(self.id))
            .unwrap_or(false)
    }
}

impl Drop for RegistrationGuard {
    fn drop(&mut self) {
        if let Some(c) = &self.collection {
            c.cursors().deregister(self.id);
        }
    }
}
