//! Id-hack runner
//!
//! Direct `_id`-index lookup for `{_id: <scalar>}` queries: one point
//! read, no planning, no stage tree.

use std::sync::Arc;

use serde_json::Value;

use crate::catalog::{Collection, RunnerId};
use crate::exec::RecordId;
use crate::query::{CanonicalQuery, Namespace};

use super::runner::{ExplainSummary, Fetched, InvalidationKind, Runner, RunnerKind};

/// Point-lookup runner over the `_id` index
pub struct IdHackRunner {
    id: RunnerId,
    collection: Arc<Collection>,
    ns: Namespace,
    key: Value,
    // Present on the canonical path, absent when the raw entry
    // short-circuited before canonicalization
    _query: Option<CanonicalQuery>,
    done: bool,
    killed: bool,
}

impl std::fmt::Debug for IdHackRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdHackRunner")
            .field("id", &self.id)
            .field("ns", &self.ns)
            .field("key", &self.key)
            .field("done", &self.done)
            .field("killed", &self.killed)
            .finish()
    }
}

impl IdHackRunner {
    /// Builds from a canonical query; `key` is its simple-id value
    pub fn new(collection: Arc<Collection>, key: Value, query: CanonicalQuery) -> Self {
        let ns = collection.ns().clone();
        Self {
            id: RunnerId::new(),
            collection,
            ns,
            key,
            _query: Some(query),
            done: false,
            killed: false,
        }
    }

    /// Builds straight from an extracted `_id` value, bypassing
    /// canonicalization (raw-query entry)
    pub fn from_key(collection: Arc<Collection>, key: Value) -> Self {
        let ns = collection.ns().clone();
        Self {
            id: RunnerId::new(),
            collection,
            ns,
            key,
            _query: None,
            done: false,
            killed: false,
        }
    }
}

impl Runner for IdHackRunner {
    fn kind(&self) -> RunnerKind {
        RunnerKind::IdHack
    }

    fn id(&self) -> RunnerId {
        self.id
    }

    fn get_next(&mut self) -> Fetched {
        if self.killed {
            return Fetched::Dead;
        }
        if self.done {
            return Fetched::Eof;
        }
        self.done = true;
        match self.collection.store().find_by_id(&self.key) {
            Some((record_id, doc)) => Fetched::Advanced {
                doc,
                record_id: Some(record_id),
            },
            None => Fetched::Eof,
        }
    }

    fn save_state(&mut self) {}

    fn restore_state(&mut self) {}

    fn invalidate(&mut self, _record_id: RecordId, _kind: InvalidationKind) {
        // The lookup runs against the index at get_next time, so a
        // mutation needs no action and a deletion simply makes it miss.
    }

    fn kill(&mut self) {
        self.killed = true;
    }

    fn collection(&self) -> Option<&Arc<Collection>> {
        Some(&self.collection)
    }

    fn ns(&self) -> &Namespace {
        &self.ns
    }

    fn explain(&self) -> ExplainSummary {
        ExplainSummary {
            strategy: self.kind().as_str(),
            ns: self.ns.to_string(),
            solution: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DocumentStore;
    use crate::query::ParsedOptions;
    use serde_json::json;
    use std::collections::HashMap;

    struct MapStore {
        docs: HashMap<String, (RecordId, Value)>,
    }

    impl DocumentStore for MapStore {
        fn find_by_id(&self, id: &Value) -> Option<(RecordId, Value)> {
            self.docs.get(&id.to_string()).cloned()
        }
    }

    fn make_collection() -> Arc<Collection> {
        let mut docs = HashMap::new();
        docs.insert(
            json!(7).to_string(),
            (RecordId(100), json!({"_id": 7, "name": "seven"})),
        );
        Arc::new(
            Collection::new(Namespace::new("db.c")).with_store(Box::new(MapStore { docs })),
        )
    }

    fn make_query(filter: Value) -> CanonicalQuery {
        CanonicalQuery::canonicalize(Namespace::new("db.c"), filter, ParsedOptions::default())
            .unwrap()
    }

    #[test]
    fn test_point_lookup_then_eof() {
        let collection = make_collection();
        let query = make_query(json!({"_id": 7}));
        let key = query.simple_id_value().cloned().unwrap();
        let mut runner = IdHackRunner::new(collection, key, query);

        match runner.get_next() {
            Fetched::Advanced { doc, record_id } => {
                assert_eq!(doc["name"], "seven");
                assert_eq!(record_id, Some(RecordId(100)));
            }
            other => panic!("expected a row, got {:?}", other),
        }
        assert_eq!(runner.get_next(), Fetched::Eof);
    }

    #[test]
    fn test_missing_id_is_eof() {
        let mut runner = IdHackRunner::from_key(make_collection(), json!(999));
        assert_eq!(runner.get_next(), Fetched::Eof);
    }

    #[test]
    fn test_kill_wins_over_lookup() {
        let mut runner = IdHackRunner::from_key(make_collection(), json!(7));
        runner.kill();
        assert_eq!(runner.get_next(), Fetched::Dead);
    }
}
