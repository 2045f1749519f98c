use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A database row as returned by the diff backend: column name → JSON value.
///
/// Column order is the order the backend emitted them in (`serde_json` is
/// built with `preserve_order`). There is no declared schema; columns are
/// discovered from the rows themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

/// The content of one column in one row.
///
/// `Absent` means the row has no such column at all. It is distinct from
/// `Present(Value::Null)`, which is a column that exists and holds SQL `NULL`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Absent,
    Present(&'a Value),
}

impl<'a> Cell<'a> {
    /// Look up `column` in an optional row. A missing row yields `Absent`.
    pub fn of(row: Option<&'a Row>, column: &str) -> Self {
        row.map(|r| r.cell(column)).unwrap_or(Cell::Absent)
    }

    /// `true` for `Absent` and for a present JSON `null`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Cell::Absent | Cell::Present(Value::Null))
    }

    pub fn value(&self) -> Option<&'a Value> {
        match self {
            Cell::Absent => None,
            Cell::Present(v) => Some(v),
        }
    }

    /// Value equality: numbers compare by value, so `1` equals `1.0`.
    /// `Absent` only equals `Absent`.
    pub fn same_value(&self, other: &Cell<'_>) -> bool {
        match (self, other) {
            (Cell::Absent, Cell::Absent) => true,
            (Cell::Present(a), Cell::Present(b)) => values_equal(a, b),
            _ => false,
        }
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                x == y
            } else {
                x.as_f64() == y.as_f64()
            }
        }
        _ => a == b,
    }
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(&self, column: &str) -> Cell<'_> {
        match self.0.get(column) {
            Some(v) => Cell::Present(v),
            None => Cell::Absent,
        }
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        self.0.insert(column.into(), value);
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Row(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Deserialize a JSON `null` into `T::default()`.
///
/// The backend serialises missing lists and keys as `null` rather than
/// omitting them.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
