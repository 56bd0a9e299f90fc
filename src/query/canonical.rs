//! Canonical queries
//!
//! A canonical query is a raw filter document normalized into a
//! match-expression tree plus its parsed options. Full canonicalization
//! lives outside the dispatch core; the parser here covers the scalar
//! and `$`-operator shapes the raw entry points and the dispatcher's
//! own classification need. Canonical queries are immutable once built.

use std::fmt;

use serde_json::Value;

use crate::index::KeyPattern;

use super::ast::{ComparisonExpr, ComparisonOp, MatchExpression};
use super::errors::{QueryError, QueryResult};

/// A fully qualified collection namespace, `db.collection`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(ns: impl Into<String>) -> Self {
        Self(ns.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for `*.system.*` namespaces
    pub fn is_system(&self) -> bool {
        self.0.contains(".system.")
    }

    /// Returns true for namespaces in the `local` database
    pub fn is_local(&self) -> bool {
        self.0.starts_with("local.")
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parsed query options
#[derive(Debug, Clone, Default)]
pub struct ParsedOptions {
    /// Requested sort pattern, e.g. `{a: 1}` or `{$natural: 1}`
    pub sort: Option<KeyPattern>,
    /// Requested projection document
    pub projection: Option<Value>,
    /// Index hint
    pub hint: Option<KeyPattern>,
    /// Verbatim lower index bound (`.min()`)
    pub min_key: Option<Value>,
    /// Verbatim upper index bound (`.max()`)
    pub max_key: Option<Value>,
    /// Client batch-size request; 0 means "no request"
    pub num_to_return: i64,
    /// Explain instead of execute
    pub explain: bool,
    /// Attach storage locations to results
    pub show_record_id: bool,
    /// Tailable cursor requested
    pub tailable: bool,
}

impl ParsedOptions {
    /// Returns true if a non-empty sort was requested
    pub fn has_sort(&self) -> bool {
        self.sort.is_some()
    }
}

/// A normalized, parsed query
#[derive(Debug, Clone)]
pub struct CanonicalQuery {
    ns: Namespace,
    raw_filter: Value,
    root: MatchExpression,
    options: ParsedOptions,
    /// The `_id` value when the filter is a simple id equality
    simple_id: Option<Value>,
}

impl CanonicalQuery {
    /// Canonicalizes a raw filter document under the given options
    pub fn canonicalize(
        ns: Namespace,
        raw_filter: Value,
        options: ParsedOptions,
    ) -> QueryResult<Self> {
        let root = parse_filter(&raw_filter)?;
        let simple_id = simple_id_value(&raw_filter);
        Ok(Self {
            ns,
            raw_filter,
            root,
            options,
            simple_id,
        })
    }

    pub fn ns(&self) -> &Namespace {
        &self.ns
    }

    /// The normalized filter tree
    pub fn root(&self) -> &MatchExpression {
        &self.root
    }

    /// The filter document as received
    pub fn raw_filter(&self) -> &Value {
        &self.raw_filter
    }

    pub fn options(&self) -> &ParsedOptions {
        &self.options
    }

    /// Returns true if the filter is `{_id: <scalar>}` (or an object
    /// with no top-level `$`-operator key)
    pub fn is_simple_id(&self) -> bool {
        self.simple_id.is_some()
    }

    /// The `_id` value of a simple id query
    pub fn simple_id_value(&self) -> Option<&Value> {
        self.simple_id.as_ref()
    }

    /// Stable shape key for query-settings and plan-cache lookups:
    /// filter structure with values elided, plus sort and projection.
    pub fn shape(&self) -> String {
        let sort = self
            .options
            .sort
            .as_ref()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "{}".to_string());
        let projection = self
            .options
            .projection
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "{}".to_string());
        format!("{}|{}|{}", shape_of(&self.root), sort, projection)
    }
}

impl fmt::Display for CanonicalQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ns={} filter={}", self.ns, self.root)
    }
}

/// Filter structure with constants elided, for shape keys
fn shape_of(expr: &MatchExpression) -> String {
    match expr {
        MatchExpression::Empty => "{}".to_string(),
        MatchExpression::Comparison(c) => format!("{{{}: {}}}", c.field, c.op.as_str()),
        MatchExpression::And(children) => {
            let inner: Vec<String> = children.iter().map(shape_of).collect();
            format!("{{$and: [{}]}}", inner.join(", "))
        }
        MatchExpression::Or(children) => {
            let inner: Vec<String> = children.iter().map(shape_of).collect();
            format!("{{$or: [{}]}}", inner.join(", "))
        }
    }
}

/// Classifies a raw filter as a simple id query.
///
/// A simple id query has exactly one field, `_id`, bound to a scalar or
/// to an object with no top-level `$`-operator key. Arrays and `$`-
/// operator objects disqualify it.
pub fn is_simple_id_query(filter: &Value) -> bool {
    simple_id_value(filter).is_some()
}

fn simple_id_value(filter: &Value) -> Option<Value> {
    let obj = filter.as_object()?;
    if obj.len() != 1 {
        return None;
    }
    let value = obj.get("_id")?;
    match value {
        Value::Object(inner) => {
            if inner.keys().any(|k| k.starts_with('$')) {
                None
            } else {
                Some(value.clone())
            }
        }
        Value::Array(_) => None,
        _ => Some(value.clone()),
    }
}

/// Parses a raw filter document into a match-expression tree
fn parse_filter(filter: &Value) -> QueryResult<MatchExpression> {
    let obj = filter
        .as_object()
        .ok_or_else(|| QueryError::invalid("filter must be a document"))?;

    if obj.is_empty() {
        return Ok(MatchExpression::Empty);
    }

    let mut children = Vec::with_capacity(obj.len());
    for (key, value) in obj {
        if key.starts_with('$') {
            match key.as_str() {
                "$and" | "$or" => {
                    let members = value
                        .as_array()
                        .ok_or_else(|| QueryError::invalid(format!("{} requires an array", key)))?;
                    let mut parsed = Vec::with_capacity(members.len());
                    for member in members {
                        parsed.push(parse_filter(member)?);
                    }
                    children.push(if key == "$and" {
                        MatchExpression::And(parsed)
                    } else {
                        MatchExpression::Or(parsed)
                    });
                }
                _ => return Err(QueryError::unsupported_operator(key)),
            }
        } else {
            children.push(parse_predicate(key, value)?);
        }
    }

    if children.len() == 1 {
        Ok(children.pop().expect("one child"))
    } else {
        Ok(MatchExpression::And(children))
    }
}

/// Parses one `field: <spec>` pair
fn parse_predicate(field: &str, spec: &Value) -> QueryResult<MatchExpression> {
    match spec {
        Value::Object(inner) if inner.keys().any(|k| k.starts_with('$')) => {
            let mut comparisons = Vec::with_capacity(inner.len());
            for (op_name, operand) in inner {
                let op = ComparisonOp::parse(op_name)
                    .ok_or_else(|| QueryError::unsupported_operator(op_name))?;
                if op == ComparisonOp::In && !operand.is_array() {
                    return Err(QueryError::invalid("$in requires an array"));
                }
                comparisons.push(MatchExpression::Comparison(ComparisonExpr::new(
                    field,
                    op,
                    operand.clone(),
                )));
            }
            if comparisons.len() == 1 {
                Ok(comparisons.pop().expect("one comparison"))
            } else {
                Ok(MatchExpression::And(comparisons))
            }
        }
        // Scalars, arrays, and plain objects are equality matches
        _ => Ok(MatchExpression::Comparison(ComparisonExpr::eq(
            field,
            spec.clone(),
        ))),
    }
}
