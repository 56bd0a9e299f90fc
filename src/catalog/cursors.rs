//! Cursor registry
//!
//! Every live runner over a collection holds a slot here so that
//! invalidation events (DDL, yields) can reach it. Registration is
//! scoped through `runner::RegistrationGuard`; the registry itself just
//! tracks slots.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Identifies one runner for the registry's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunnerId(Uuid);

impl RunnerId {
    /// Allocates a fresh id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One registered runner
#[derive(Debug, Clone)]
pub struct CursorSlot {
    /// When the runner registered
    pub registered_at: DateTime<Utc>,
}

/// Registry of live runners over one collection
#[derive(Debug, Default)]
pub struct CursorRegistry {
    slots: Mutex<HashMap<RunnerId, CursorSlot>>,
}

impl CursorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a slot for a runner
    pub fn register(&self, id: RunnerId) {
        self.slots.lock().expect("cursor registry lock").insert(
            id,
            CursorSlot {
                registered_at: Utc::now(),
            },
        );
    }

    /// Releases a runner's slot; releasing an unknown id is a no-op
    pub fn deregister(&self, id: RunnerId) {
        self.slots.lock().expect("cursor registry lock").remove(&id);
    }

    /// Returns true if the runner holds a slot
    pub fn is_registered(&self, id: RunnerId) -> bool {
        self.slots
            .lock()
            .expect("cursor registry lock")
            .contains_key(&id)
    }

    /// Number of live slots
    pub fn len(&self) -> usize {
        self.slots.lock().expect("cursor registry lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
