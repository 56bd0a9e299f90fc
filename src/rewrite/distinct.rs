//! Distinct rewrite: project(ixscan) → project(distinct-scan)
//!
//! A distinct over an index prefixed by the distinct field can skip
//! ahead to the next distinct key instead of visiting every entry. The
//! rewrite swaps the projection's index-scan child for a distinct-scan
//! node sharing the same pattern, direction, and bounds.

use crate::solution::{DistinctNode, QuerySolution, QuerySolutionNode};

/// Attempts the distinct rewrite on a solution root.
///
/// Succeeds iff the root is a PROJECTION whose single child is a
/// filter-free, non-simple-range IXSCAN over an index containing the
/// distinct field. On success the scan subtree is consumed and replaced
/// by a DISTINCT node whose `field_no` is the field's position in the
/// index key pattern.
pub fn turn_ixscan_into_distinct(solution: &mut QuerySolution, field: &str) -> bool {
    let distinct = {
        let QuerySolutionNode::Projection(projection) = &solution.root else {
            return false;
        };
        let QuerySolutionNode::IxScan(scan) = projection.child.as_ref() else {
            return false;
        };
        if scan.filter.is_some() || scan.is_simple_range {
            return false;
        }
        let Some(field_no) = scan.index_key_pattern.position_of(field) else {
            return false;
        };
        DistinctNode {
            index_key_pattern: scan.index_key_pattern.clone(),
            direction: scan.direction,
            bounds: scan.bounds.clone(),
            field_no,
        }
    };

    let QuerySolutionNode::Projection(projection) = &mut solution.root else {
        return false;
    };
    // Installs the distinct scan; the old ixscan subtree drops here
    projection.child = Box::new(QuerySolutionNode::Distinct(distinct));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexBounds, KeyPattern};
    use crate::query::{ComparisonExpr, MatchExpression};
    use crate::solution::{IxScanNode, NodeKind, ProjectionNode};
    use serde_json::json;

    fn project_over_ixscan(
        pattern: KeyPattern,
        scan_filter: Option<MatchExpression>,
        is_simple_range: bool,
    ) -> QuerySolution {
        let bounds = IndexBounds::all_values_over(&pattern);
        QuerySolution::new(QuerySolutionNode::Projection(ProjectionNode {
            child: Box::new(QuerySolutionNode::IxScan(IxScanNode {
                index_key_pattern: pattern,
                direction: 1,
                bounds,
                is_simple_range,
                filter: scan_filter,
            })),
            projection: json!({"_id": 0, "x": 1}),
        }))
    }

    #[test]
    fn test_rewrite_swaps_scan_for_distinct() {
        let pattern = KeyPattern::new(vec![("w".into(), 1), ("x".into(), 1)]);
        let mut solution = project_over_ixscan(pattern, None, false);
        assert!(turn_ixscan_into_distinct(&mut solution, "x"));

        let QuerySolutionNode::Projection(projection) = &solution.root else {
            panic!("expected PROJECTION root, got {}", solution.root);
        };
        let QuerySolutionNode::Distinct(distinct) = projection.child.as_ref() else {
            panic!("expected DISTINCT child, got {}", projection.child);
        };
        assert_eq!(distinct.field_no, 1);
        assert_eq!(distinct.direction, 1);
    }

    #[test]
    fn test_field_not_in_pattern_blocks_rewrite() {
        let mut solution = project_over_ixscan(KeyPattern::ascending("w"), None, false);
        assert!(!turn_ixscan_into_distinct(&mut solution, "x"));
        assert_eq!(solution.root.kind(), NodeKind::Projection);
    }

    #[test]
    fn test_scan_filter_blocks_rewrite() {
        let residual = MatchExpression::Comparison(ComparisonExpr::eq("y", json!(1)));
        let mut solution = project_over_ixscan(KeyPattern::ascending("x"), Some(residual), false);
        assert!(!turn_ixscan_into_distinct(&mut solution, "x"));
    }

    #[test]
    fn test_simple_range_blocks_rewrite() {
        let mut solution = project_over_ixscan(KeyPattern::ascending("x"), None, true);
        assert!(!turn_ixscan_into_distinct(&mut solution, "x"));
    }

    #[test]
    fn test_non_projection_root_blocks_rewrite() {
        let pattern = KeyPattern::ascending("x");
        let mut solution = QuerySolution::new(QuerySolutionNode::IxScan(IxScanNode {
            index_key_pattern: pattern.clone(),
            direction: 1,
            bounds: IndexBounds::all_values_over(&pattern),
            is_simple_range: false,
            filter: None,
        }));
        assert!(!turn_ixscan_into_distinct(&mut solution, "x"));
    }
}
