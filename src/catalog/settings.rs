//! Per-collection query settings
//!
//! Administrative commands pin index choices for a query shape by
//! storing an `AllowedIndices` record. The dispatcher takes a brief
//! owned snapshot at dispatch time; the store itself may be mutated
//! concurrently by the admin path.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::index::KeyPattern;

/// The index filter for one query shape
#[derive(Debug, Clone, PartialEq)]
pub struct AllowedIndices {
    /// Key patterns of the indexes the planner may use
    pub key_patterns: Vec<KeyPattern>,
}

impl AllowedIndices {
    pub fn new(key_patterns: Vec<KeyPattern>) -> Self {
        Self { key_patterns }
    }

    /// Canonical key-pattern membership test
    pub fn allows(&self, pattern: &KeyPattern) -> bool {
        self.key_patterns.iter().any(|p| p == pattern)
    }
}

/// Query-settings store for one collection
#[derive(Debug, Default)]
pub struct QuerySettings {
    entries: Mutex<HashMap<String, AllowedIndices>>,
}

impl QuerySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs (or replaces) the filter for a query shape
    pub fn set_allowed_indices(&self, shape: impl Into<String>, allowed: AllowedIndices) {
        self.entries
            .lock()
            .expect("query settings lock")
            .insert(shape.into(), allowed);
    }

    /// Removes the filter for a query shape
    pub fn remove_allowed_indices(&self, shape: &str) {
        self.entries
            .lock()
            .expect("query settings lock")
            .remove(shape);
    }

    /// Returns an owned snapshot of the filter for a query shape
    pub fn get_allowed_indices(&self, shape: &str) -> Option<AllowedIndices> {
        self.entries
            .lock()
            .expect("query settings lock")
            .get(shape)
            .cloned()
    }
}
