//! Query-solution tree nodes
//!
//! A solution is a strict tree: each node exclusively owns its children,
//! and a rewrite that replaces a subtree consumes and destroys the old
//! one. The node set is closed; callers match exhaustively on the kind.

use std::fmt;

use serde_json::Value;

use crate::index::{IndexBounds, IndexKey, KeyPattern};
use crate::query::MatchExpression;

/// Node kind tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    CollScan,
    IxScan,
    Fetch,
    Projection,
    Sort,
    Skip,
    Limit,
    Count,
    Distinct,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::CollScan => "COLLSCAN",
            NodeKind::IxScan => "IXSCAN",
            NodeKind::Fetch => "FETCH",
            NodeKind::Projection => "PROJECTION",
            NodeKind::Sort => "SORT",
            NodeKind::Skip => "SKIP",
            NodeKind::Limit => "LIMIT",
            NodeKind::Count => "COUNT",
            NodeKind::Distinct => "DISTINCT",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Full collection scan
#[derive(Debug, Clone, PartialEq)]
pub struct CollScanNode {
    /// 1 forward, -1 backward
    pub direction: i32,
    pub filter: Option<MatchExpression>,
    pub tailable: bool,
}

/// Index scan over one index
#[derive(Debug, Clone, PartialEq)]
pub struct IxScanNode {
    pub index_key_pattern: KeyPattern,
    /// 1 forward, -1 backward
    pub direction: i32,
    pub bounds: IndexBounds,
    /// Bounds supplied verbatim by the user (`.min()`/`.max()`),
    /// bypassing normal bounds analysis
    pub is_simple_range: bool,
    pub filter: Option<MatchExpression>,
}

/// Document fetch by storage location
#[derive(Debug, Clone, PartialEq)]
pub struct FetchNode {
    pub child: Box<QuerySolutionNode>,
    pub filter: Option<MatchExpression>,
}

/// Projection applied to child output
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionNode {
    pub child: Box<QuerySolutionNode>,
    pub projection: Value,
}

/// Blocking sort
#[derive(Debug, Clone, PartialEq)]
pub struct SortNode {
    pub child: Box<QuerySolutionNode>,
    pub pattern: KeyPattern,
}

/// Skip the first N results
#[derive(Debug, Clone, PartialEq)]
pub struct SkipNode {
    pub child: Box<QuerySolutionNode>,
    pub skip: u64,
}

/// Stop after N results
#[derive(Debug, Clone, PartialEq)]
pub struct LimitNode {
    pub child: Box<QuerySolutionNode>,
    pub limit: u64,
}

/// In-index counting over a single key range
#[derive(Debug, Clone, PartialEq)]
pub struct CountNode {
    pub index_key_pattern: KeyPattern,
    pub start_key: IndexKey,
    pub start_inclusive: bool,
    pub end_key: IndexKey,
    pub end_inclusive: bool,
}

/// Next-distinct-key skipping over an index
#[derive(Debug, Clone, PartialEq)]
pub struct DistinctNode {
    pub index_key_pattern: KeyPattern,
    /// 1 forward, -1 backward
    pub direction: i32,
    pub bounds: IndexBounds,
    /// Zero-based position of the distinct field in the key pattern
    pub field_no: usize,
}

/// A node in a query-solution tree
#[derive(Debug, Clone, PartialEq)]
pub enum QuerySolutionNode {
    CollScan(CollScanNode),
    IxScan(IxScanNode),
    Fetch(FetchNode),
    Projection(ProjectionNode),
    Sort(SortNode),
    Skip(SkipNode),
    Limit(LimitNode),
    Count(CountNode),
    Distinct(DistinctNode),
}

impl QuerySolutionNode {
    /// The node's kind tag
    pub fn kind(&self) -> NodeKind {
        match self {
            QuerySolutionNode::CollScan(_) => NodeKind::CollScan,
            QuerySolutionNode::IxScan(_) => NodeKind::IxScan,
            QuerySolutionNode::Fetch(_) => NodeKind::Fetch,
            QuerySolutionNode::Projection(_) => NodeKind::Projection,
            QuerySolutionNode::Sort(_) => NodeKind::Sort,
            QuerySolutionNode::Skip(_) => NodeKind::Skip,
            QuerySolutionNode::Limit(_) => NodeKind::Limit,
            QuerySolutionNode::Count(_) => NodeKind::Count,
            QuerySolutionNode::Distinct(_) => NodeKind::Distinct,
        }
    }

    /// Immediate children, in order
    pub fn children(&self) -> Vec<&QuerySolutionNode> {
        match self {
            QuerySolutionNode::Fetch(n) => vec![&n.child],
            QuerySolutionNode::Projection(n) => vec![&n.child],
            QuerySolutionNode::Sort(n) => vec![&n.child],
            QuerySolutionNode::Skip(n) => vec![&n.child],
            QuerySolutionNode::Limit(n) => vec![&n.child],
            _ => Vec::new(),
        }
    }

    /// The node's residual filter, if its kind carries one
    pub fn filter(&self) -> Option<&MatchExpression> {
        match self {
            QuerySolutionNode::CollScan(n) => n.filter.as_ref(),
            QuerySolutionNode::IxScan(n) => n.filter.as_ref(),
            QuerySolutionNode::Fetch(n) => n.filter.as_ref(),
            _ => None,
        }
    }

    /// Returns true if any node in the subtree is a blocking sort
    pub fn has_blocking_sort(&self) -> bool {
        if self.kind() == NodeKind::Sort {
            return true;
        }
        self.children().iter().any(|c| c.has_blocking_sort())
    }
}

impl fmt::Display for QuerySolutionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())?;
        let children = self.children();
        if !children.is_empty() {
            write!(f, "(")?;
            for (i, c) in children.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", c)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}
