//! Index key patterns and key values
//!
//! A key pattern is the ordered field list of an index, e.g.
//! `{a: 1, b: -1}`. Key values extend JSON values with `MinKey` and
//! `MaxKey` sentinels that sort below and above every other value, so
//! that half-open predicate bounds can be extended over trailing key
//! fields without admitting or excluding keys that share a prefix.

use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

/// An ordered list of (field, direction) pairs describing an index key.
///
/// Direction is `1` for ascending, `-1` for descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPattern {
    fields: Vec<(String, i32)>,
}

impl KeyPattern {
    /// Creates a key pattern from (field, direction) pairs
    pub fn new(fields: Vec<(String, i32)>) -> Self {
        Self { fields }
    }

    /// Single ascending field, e.g. `{a: 1}`
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            fields: vec![(field.into(), 1)],
        }
    }

    /// The `{$natural: 1}` pattern (forward collection order)
    pub fn natural_forward() -> Self {
        Self::ascending("$natural")
    }

    /// Returns the (field, direction) pairs in index order
    pub fn fields(&self) -> &[(String, i32)] {
        &self.fields
    }

    /// Number of key fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the pattern has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Zero-based position of a field in the pattern, if present
    pub fn position_of(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|(f, _)| f == field)
    }

    /// First field name, if any
    pub fn first_field(&self) -> Option<&str> {
        self.fields.first().map(|(f, _)| f.as_str())
    }

    /// Returns true for exactly `{$natural: 1}`
    pub fn is_natural_forward(&self) -> bool {
        self.fields.len() == 1 && self.fields[0] == ("$natural".to_string(), 1)
    }
}

impl fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (field, dir)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", field, dir)?;
        }
        write!(f, "}}")
    }
}

/// A single value in index key space
#[derive(Debug, Clone, PartialEq)]
pub enum KeyValue {
    /// Sorts below every JSON value
    MinKey,
    /// An ordinary JSON value
    Json(Value),
    /// Sorts above every JSON value
    MaxKey,
}

impl KeyValue {
    /// Wraps a JSON value
    pub fn json(value: impl Into<Value>) -> Self {
        KeyValue::Json(value.into())
    }

    /// Returns the inner JSON value, if this is not a sentinel
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            KeyValue::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Total order over key space: MinKey < any JSON value < MaxKey.
    ///
    /// JSON values order by type rank (null, bool, number, string,
    /// array, object), then within type. This is the canonical order
    /// the in-memory index structures use; it only has to be total and
    /// deterministic.
    pub fn canonical_cmp(&self, other: &KeyValue) -> Ordering {
        match (self, other) {
            (KeyValue::MinKey, KeyValue::MinKey) => Ordering::Equal,
            (KeyValue::MinKey, _) => Ordering::Less,
            (_, KeyValue::MinKey) => Ordering::Greater,
            (KeyValue::MaxKey, KeyValue::MaxKey) => Ordering::Equal,
            (KeyValue::MaxKey, _) => Ordering::Greater,
            (_, KeyValue::MaxKey) => Ordering::Less,
            (KeyValue::Json(a), KeyValue::Json(b)) => cmp_json(a, b),
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::MinKey => write!(f, "MinKey"),
            KeyValue::MaxKey => write!(f, "MaxKey"),
            KeyValue::Json(v) => write!(f, "{}", v),
        }
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Canonical total order over JSON values
fn cmp_json(a: &Value, b: &Value) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let xf = x.as_f64().unwrap_or(f64::NAN);
            let yf = y.as_f64().unwrap_or(f64::NAN);
            xf.partial_cmp(&yf).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (xe, ye) in x.iter().zip(y.iter()) {
                let c = cmp_json(xe, ye);
                if c != Ordering::Equal {
                    return c;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => {
            // Keyed comparison; serde_json maps iterate in sorted order
            for ((xk, xv), (yk, yv)) in x.iter().zip(y.iter()) {
                let c = xk.cmp(yk);
                if c != Ordering::Equal {
                    return c;
                }
                let c = cmp_json(xv, yv);
                if c != Ordering::Equal {
                    return c;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => Ordering::Equal,
    }
}

/// A compound index key: one KeyValue per key-pattern field
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndexKey {
    elements: Vec<KeyValue>,
}

impl IndexKey {
    /// Creates an empty key
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    /// Creates a key from its elements
    pub fn from_elements(elements: Vec<KeyValue>) -> Self {
        Self { elements }
    }

    /// Appends an element
    pub fn push(&mut self, element: KeyValue) {
        self.elements.push(element);
    }

    /// The key's elements, in key-pattern order
    pub fn elements(&self) -> &[KeyValue] {
        &self.elements
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if the key has no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Lexicographic comparison in canonical key order
    pub fn canonical_cmp(&self, other: &IndexKey) -> Ordering {
        for (a, b) in self.elements.iter().zip(other.elements.iter()) {
            let c = a.canonical_cmp(b);
            if c != Ordering::Equal {
                return c;
            }
        }
        self.elements.len().cmp(&other.elements.len())
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, e) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "\"\": {}", e)?;
        }
        write!(f, "}}")
    }
}
