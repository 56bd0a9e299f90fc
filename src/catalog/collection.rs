//! Collection metadata view
//!
//! The dispatch core consumes a collection through this read-only view:
//! namespace, capped flag, ready indexes, the per-collection info cache
//! (query settings + plan cache), the cursor registry, and a document
//! store seam for direct id lookups. Metadata is assumed stable for the
//! duration of one dispatch call (the caller holds the read lock).

use serde_json::Value;

use crate::exec::RecordId;
use crate::index::{IndexPlugin, KeyPattern};
use crate::planner::{NeverCached, PlanCache};
use crate::query::Namespace;

use super::cursors::CursorRegistry;
use super::settings::QuerySettings;

/// A catalog index on one collection
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDescriptor {
    pub name: String,
    pub key_pattern: KeyPattern,
    pub multikey: bool,
    pub sparse: bool,
    pub plugin: IndexPlugin,
    /// Builds in progress are not ready and invisible to planning
    pub ready: bool,
}

impl IndexDescriptor {
    /// A ready, plain b-tree index
    pub fn btree(name: impl Into<String>, key_pattern: KeyPattern) -> Self {
        Self {
            name: name.into(),
            key_pattern,
            multikey: false,
            sparse: false,
            plugin: IndexPlugin::BTree,
            ready: true,
        }
    }

    /// The standard `_id` index
    pub fn id_index() -> Self {
        Self::btree("_id_", KeyPattern::ascending("_id"))
    }

    /// Returns true for the `_id` index
    pub fn is_id_index(&self) -> bool {
        self.key_pattern == KeyPattern::ascending("_id")
    }
}

/// Direct document access, for the id-hack fast path
pub trait DocumentStore: Send + Sync {
    /// Point lookup through the `_id` index
    fn find_by_id(&self, id: &Value) -> Option<(RecordId, Value)>;
}

/// A store with no documents
#[derive(Debug, Default)]
pub struct EmptyStore;

impl DocumentStore for EmptyStore {
    fn find_by_id(&self, _id: &Value) -> Option<(RecordId, Value)> {
        None
    }
}

/// Per-collection info cache: query settings plus the plan cache
pub struct CollectionInfoCache {
    settings: QuerySettings,
    plan_cache: Box<dyn PlanCache>,
}

impl CollectionInfoCache {
    pub fn new(plan_cache: Box<dyn PlanCache>) -> Self {
        Self {
            settings: QuerySettings::new(),
            plan_cache,
        }
    }

    pub fn query_settings(&self) -> &QuerySettings {
        &self.settings
    }

    pub fn plan_cache(&self) -> &dyn PlanCache {
        self.plan_cache.as_ref()
    }
}

impl Default for CollectionInfoCache {
    fn default() -> Self {
        Self::new(Box::new(NeverCached))
    }
}

/// Read-only view of one collection
pub struct Collection {
    ns: Namespace,
    capped: bool,
    indexes: Vec<IndexDescriptor>,
    info: CollectionInfoCache,
    cursors: CursorRegistry,
    store: Box<dyn DocumentStore>,
}

impl Collection {
    /// Creates a collection view with no indexes and an empty store
    pub fn new(ns: Namespace) -> Self {
        Self {
            ns,
            capped: false,
            indexes: Vec::new(),
            info: CollectionInfoCache::default(),
            cursors: CursorRegistry::new(),
            store: Box::new(EmptyStore),
        }
    }

    /// Sets the capped flag
    pub fn with_capped(mut self, capped: bool) -> Self {
        self.capped = capped;
        self
    }

    /// Adds an index
    pub fn with_index(mut self, index: IndexDescriptor) -> Self {
        self.indexes.push(index);
        self
    }

    /// Replaces the plan cache
    pub fn with_plan_cache(mut self, plan_cache: Box<dyn PlanCache>) -> Self {
        self.info = CollectionInfoCache::new(plan_cache);
        self
    }

    /// Replaces the document store
    pub fn with_store(mut self, store: Box<dyn DocumentStore>) -> Self {
        self.store = store;
        self
    }

    pub fn ns(&self) -> &Namespace {
        &self.ns
    }

    pub fn is_capped(&self) -> bool {
        self.capped
    }

    /// Ready indexes only; in-progress builds are invisible
    pub fn ready_indexes(&self) -> impl Iterator<Item = &IndexDescriptor> {
        self.indexes.iter().filter(|d| d.ready)
    }

    /// The `_id` index, if present and ready
    pub fn id_index(&self) -> Option<&IndexDescriptor> {
        self.ready_indexes().find(|d| d.is_id_index())
    }

    pub fn info(&self) -> &CollectionInfoCache {
        &self.info
    }

    pub fn cursors(&self) -> &CursorRegistry {
        &self.cursors
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    struct MapStore {
        docs: HashMap<String, (RecordId, Value)>,
    }

    impl DocumentStore for MapStore {
        fn find_by_id(&self, id: &Value) -> Option<(RecordId, Value)> {
            let key = id.to_string();
            self.docs.get(&key).cloned()
        }
    }

    #[test]
    fn test_ready_index_filtering() {
        let mut building = IndexDescriptor::btree("b_1", KeyPattern::ascending("b"));
        building.ready = false;

        let collection = Collection::new(Namespace::new("db.c"))
            .with_index(IndexDescriptor::id_index())
            .with_index(building);

        let ready: Vec<_> = collection.ready_indexes().collect();
        assert_eq!(ready.len(), 1);
        assert!(collection.id_index().is_some());
    }

    #[test]
    fn test_id_index_detection() {
        let collection = Collection::new(Namespace::new("db.c"))
            .with_index(IndexDescriptor::btree("a_1", KeyPattern::ascending("a")));
        assert!(collection.id_index().is_none());
    }

    #[test]
    fn test_store_lookup() {
        let mut docs = HashMap::new();
        docs.insert(
            json!(7).to_string(),
            (RecordId(42), json!({"_id": 7, "name": "x"})),
        );

        let collection =
            Collection::new(Namespace::new("db.c")).with_store(Box::new(MapStore { docs }));

        let (rid, doc) = collection.store().find_by_id(&json!(7)).unwrap();
        assert_eq!(rid, RecordId(42));
        assert_eq!(doc["name"], "x");
    }
}
