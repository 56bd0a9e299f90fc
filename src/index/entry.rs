//! Index entries as seen by the planner
//!
//! An `IndexEntry` is a snapshot of a catalog index taken at dispatch
//! time and handed to the planner inside the planner params.

use std::fmt;

use super::keys::KeyPattern;

/// Index plugin type
///
/// `BTree` is the plain ordered index; everything else is a special
/// access method that most rewrites must avoid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexPlugin {
    /// Ordinary ordered index
    BTree,
    /// Full-text index
    Text,
    /// Geospatial index
    Geo2d,
    /// Hashed index
    Hashed,
}

impl IndexPlugin {
    /// Returns true for any plugin other than the plain ordered index
    pub fn is_special(&self) -> bool {
        !matches!(self, IndexPlugin::BTree)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IndexPlugin::BTree => "",
            IndexPlugin::Text => "text",
            IndexPlugin::Geo2d => "2d",
            IndexPlugin::Hashed => "hashed",
        }
    }
}

impl fmt::Display for IndexPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A planner-visible index description
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    /// Key pattern, e.g. `{a: 1, b: -1}`
    pub key_pattern: KeyPattern,
    /// Whether any indexed field holds array values
    pub multikey: bool,
    /// Whether documents missing the indexed fields are omitted
    pub sparse: bool,
    /// Index name
    pub name: String,
    /// Access-method plugin
    pub plugin: IndexPlugin,
}

impl IndexEntry {
    /// Creates a plain (b-tree, non-multikey, non-sparse) entry
    pub fn btree(name: impl Into<String>, key_pattern: KeyPattern) -> Self {
        Self {
            key_pattern,
            multikey: false,
            sparse: false,
            name: name.into(),
            plugin: IndexPlugin::BTree,
        }
    }
}
