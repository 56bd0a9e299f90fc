//! Sharding catalog seam
//!
//! The dispatcher only needs one question answered: is this namespace
//! sharded, and if so what is its key pattern.

use crate::index::KeyPattern;
use crate::query::Namespace;

/// Read interface of the sharding state
pub trait ShardingCatalog {
    /// The shard key pattern for a namespace, if it is sharded
    fn shard_key(&self, ns: &Namespace) -> Option<KeyPattern>;
}

/// Sharding state of a process that is not part of a cluster
#[derive(Debug, Default)]
pub struct Unsharded;

impl ShardingCatalog for Unsharded {
    fn shard_key(&self, _ns: &Namespace) -> Option<KeyPattern> {
        None
    }
}
