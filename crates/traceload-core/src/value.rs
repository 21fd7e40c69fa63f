//! Typed document model produced by the format adapters

use chrono::{DateTime, FixedOffset, NaiveDateTime};

/// A coerced field value.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Null,
    Integer(i64),
    Float(f64),
    /// Timestamp carrying its source UTC offset
    Timestamp(DateTime<FixedOffset>),
    /// Timestamp without zone information (time-of-day traces, W3C logs)
    LocalTimestamp(NaiveDateTime),
    String(String),
    Map(Fields),
    Array(Vec<TypedValue>),
}

impl TypedValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Fields> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short type label used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Timestamp(_) | Self::LocalTimestamp(_) => "timestamp",
            Self::String(_) => "string",
            Self::Map(_) => "map",
            Self::Array(_) => "array",
        }
    }
}

impl From<&str> for TypedValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for TypedValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

/// Insertion-ordered field map.
///
/// Inserting an existing key replaces the value in place, so the first
/// occurrence decides the position and the last one decides the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(String, TypedValue)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: TypedValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = &'a (String, TypedValue);
    type IntoIter = std::slice::Iter<'a, (String, TypedValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// One destination record: run-unique sequential id plus typed fields.
///
/// The id becomes the primary key in the destination collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: u64,
    pub fields: Fields,
}

impl Document {
    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.fields.get(name)
    }
}

/// Sequential id generator owned by an adapter, one per output collection.
///
/// Yields 0, 1, 2, ... in input order with no gaps.
#[derive(Debug, Default)]
pub struct IdSequence {
    next: u64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap `fields` into a document carrying the next id
    pub fn document(&mut self, fields: Fields) -> Document {
        let id = self.next;
        self.next += 1;
        Document { id, fields }
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> u64 {
        self.next
    }
}
