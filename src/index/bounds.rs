//! Index bounds and single-interval analysis
//!
//! Bounds describe what key ranges an index scan traverses: one ordered
//! interval list per key-pattern field. The single-interval analysis
//! decides whether a conjunction of such lists collapses to one
//! `[start_key, end_key]` range over the compound key, which is what
//! lets a fetch+ixscan plan be rewritten into an in-index count.

use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

use super::keys::{IndexKey, KeyPattern, KeyValue};

/// A closed, open, or half-open interval over one key field
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub start: KeyValue,
    pub end: KeyValue,
    pub start_inclusive: bool,
    pub end_inclusive: bool,
}

impl Interval {
    /// `[v, v]`, a point interval
    pub fn point(value: impl Into<Value>) -> Self {
        let v = KeyValue::json(value.into());
        Self {
            start: v.clone(),
            end: v,
            start_inclusive: true,
            end_inclusive: true,
        }
    }

    /// Creates an interval with explicit endpoints and inclusivity
    pub fn new(start: KeyValue, end: KeyValue, start_inclusive: bool, end_inclusive: bool) -> Self {
        Self {
            start,
            end,
            start_inclusive,
            end_inclusive,
        }
    }

    /// `[MinKey, MaxKey]`, every value, ascending
    pub fn all_values() -> Self {
        Self {
            start: KeyValue::MinKey,
            end: KeyValue::MaxKey,
            start_inclusive: true,
            end_inclusive: true,
        }
    }

    /// `[MaxKey, MinKey]`, every value, descending
    pub fn all_values_reversed() -> Self {
        Self {
            start: KeyValue::MaxKey,
            end: KeyValue::MinKey,
            start_inclusive: true,
            end_inclusive: true,
        }
    }

    /// Returns true if start and end are the same included value
    pub fn is_point(&self) -> bool {
        self.start_inclusive
            && self.end_inclusive
            && self.start.canonical_cmp(&self.end) == Ordering::Equal
    }

    /// Returns true for the inclusive full ascending range
    pub fn is_all_values(&self) -> bool {
        self.start == KeyValue::MinKey
            && self.end == KeyValue::MaxKey
            && self.start_inclusive
            && self.end_inclusive
    }

    /// Returns true for the inclusive full descending range
    pub fn is_all_values_reversed(&self) -> bool {
        self.start == KeyValue::MaxKey
            && self.end == KeyValue::MinKey
            && self.start_inclusive
            && self.end_inclusive
    }

    /// Membership test in canonical key order (ascending intervals)
    pub fn contains(&self, value: &KeyValue) -> bool {
        let lo = value.canonical_cmp(&self.start);
        let hi = value.canonical_cmp(&self.end);
        let above = lo == Ordering::Greater || (self.start_inclusive && lo == Ordering::Equal);
        let below = hi == Ordering::Less || (self.end_inclusive && hi == Ordering::Equal);
        above && below
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}, {}{}",
            if self.start_inclusive { "[" } else { "(" },
            self.start,
            self.end,
            if self.end_inclusive { "]" } else { ")" },
        )
    }
}

/// Disjoint, ordered intervals over a single key field
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedIntervalList {
    /// Field this list constrains
    pub field: String,
    /// Disjoint intervals in scan order
    pub intervals: Vec<Interval>,
}

impl OrderedIntervalList {
    pub fn new(field: impl Into<String>, intervals: Vec<Interval>) -> Self {
        Self {
            field: field.into(),
            intervals,
        }
    }

    /// A list holding a single interval
    pub fn single(field: impl Into<String>, interval: Interval) -> Self {
        Self::new(field, vec![interval])
    }
}

/// Bounds for a compound index scan: one interval list per key field
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndexBounds {
    pub fields: Vec<OrderedIntervalList>,
}

impl IndexBounds {
    pub fn new(fields: Vec<OrderedIntervalList>) -> Self {
        Self { fields }
    }

    /// Full ascending bounds over every field of a key pattern
    pub fn all_values_over(pattern: &KeyPattern) -> Self {
        Self {
            fields: pattern
                .fields()
                .iter()
                .map(|(f, _)| OrderedIntervalList::single(f.clone(), Interval::all_values()))
                .collect(),
        }
    }

    /// Number of constrained fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A single `[start_key, end_key]` range over a compound key
#[derive(Debug, Clone, PartialEq)]
pub struct SingleInterval {
    pub start_key: IndexKey,
    pub end_key: IndexKey,
    pub start_inclusive: bool,
    pub end_inclusive: bool,
}

/// Reduces compound bounds to a single `[start_key, end_key]` range.
///
/// Walks the fields left to right in three phases:
///
/// 1. a prefix of point intervals, appended to both keys;
/// 2. at most one non-point interval, whose endpoints and inclusivity
///    the range inherits;
/// 3. an all-values suffix, where each remaining field is extended with
///    MinKey/MaxKey so the range neither admits nor excludes keys that
///    share the prefix.
///
/// Returns `None` for any other shape (multiple intervals outside the
/// point prefix, a malformed suffix, or a short interval list).
pub fn as_single_interval(bounds: &IndexBounds) -> Option<SingleInterval> {
    let mut start_key = IndexKey::new();
    let mut end_key = IndexKey::new();
    let mut start_inclusive = true;
    let mut end_inclusive = true;

    let n = bounds.fields.len();
    let mut i = 0;

    // Phase 1: point prefix
    while i < n {
        let oil = &bounds.fields[i];
        if oil.intervals.len() != 1 || !oil.intervals[0].is_point() {
            break;
        }
        start_key.push(oil.intervals[0].start.clone());
        end_key.push(oil.intervals[0].end.clone());
        i += 1;
    }
    if i == n {
        return Some(SingleInterval {
            start_key,
            end_key,
            start_inclusive,
            end_inclusive,
        });
    }

    // Phase 2: exactly one non-point interval
    let oil = &bounds.fields[i];
    if oil.intervals.len() != 1 {
        return None;
    }
    let interval = &oil.intervals[0];
    start_key.push(interval.start.clone());
    end_key.push(interval.end.clone());
    start_inclusive = interval.start_inclusive;
    end_inclusive = interval.end_inclusive;
    i += 1;

    // Phase 3: all-values suffix. An exclusive prefix bound is extended
    // with the opposite sentinel so that keys sharing the prefix stay
    // outside the range; an inclusive bound keeps them inside.
    while i < n {
        let oil = &bounds.fields[i];
        if oil.intervals.len() != 1 {
            return None;
        }
        let suffix = &oil.intervals[0];
        if suffix.is_all_values() {
            start_key.push(if start_inclusive {
                KeyValue::MinKey
            } else {
                KeyValue::MaxKey
            });
            end_key.push(if end_inclusive {
                KeyValue::MaxKey
            } else {
                KeyValue::MinKey
            });
        } else if suffix.is_all_values_reversed() {
            start_key.push(if start_inclusive {
                KeyValue::MaxKey
            } else {
                KeyValue::MinKey
            });
            end_key.push(if end_inclusive {
                KeyValue::MinKey
            } else {
                KeyValue::MaxKey
            });
        } else {
            return None;
        }
        i += 1;
    }

    Some(SingleInterval {
        start_key,
        end_key,
        start_inclusive,
        end_inclusive,
    })
}
