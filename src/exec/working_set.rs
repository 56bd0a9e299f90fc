//! Working set: the per-query scratchpad
//!
//! Stages exchange intermediate rows through working-set slots rather
//! than by value. The dispatch core builds one working set per solution
//! that enters a runner; it never shares one across solutions.

use serde_json::Value;

use crate::index::IndexKey;

/// A document's storage location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(pub u64);

/// Slot id inside one working set
pub type WorkingSetId = usize;

/// Sentinel for "no slot"
pub const INVALID_WORKING_SET_ID: WorkingSetId = usize::MAX;

/// One intermediate row
#[derive(Debug, Clone, Default)]
pub struct WorkingSetMember {
    /// Storage location, when the row came from (or through) a scan
    pub record_id: Option<RecordId>,
    /// Materialized document, when fetched or computed
    pub doc: Option<Value>,
    /// Index key data, for covered plans
    pub key_data: Option<IndexKey>,
}

/// Slot arena for one query execution
#[derive(Debug, Default)]
pub struct WorkingSet {
    members: Vec<Option<WorkingSetMember>>,
    free: Vec<WorkingSetId>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an empty slot and returns its id
    pub fn allocate(&mut self) -> WorkingSetId {
        if let Some(id) = self.free.pop() {
            self.members[id] = Some(WorkingSetMember::default());
            return id;
        }
        self.members.push(Some(WorkingSetMember::default()));
        self.members.len() - 1
    }

    /// Borrow a slot's member
    pub fn get(&self, id: WorkingSetId) -> Option<&WorkingSetMember> {
        self.members.get(id).and_then(|m| m.as_ref())
    }

    /// Mutably borrow a slot's member
    pub fn get_mut(&mut self, id: WorkingSetId) -> Option<&mut WorkingSetMember> {
        self.members.get_mut(id).and_then(|m| m.as_mut())
    }

    /// Releases a slot, returning its member
    pub fn take(&mut self, id: WorkingSetId) -> Option<WorkingSetMember> {
        let member = self.members.get_mut(id)?.take();
        if member.is_some() {
            self.free.push(id);
        }
        member
    }

    /// Number of live slots
    pub fn live(&self) -> usize {
        self.members.iter().filter(|m| m.is_some()).count()
    }
}
