use crate::collections::IndexMap;

/// A single node in a store tree.
///
/// Every value is exactly one of the five variants; containers own their
/// children exclusively, so a value is always a tree. Deep copies come
/// from [`Clone`], and [`PartialEq`] compares structurally: array
/// entries are compared as sets of key-value pairs, list elements in
/// order.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A string value.
    String(String),
    /// A 32-bit signed integer value.
    Int(i32),
    /// A 64-bit floating point number value.
    Float(f64),
    /// An ordered sequence of values.
    List(Vec<Value>),
    /// An associative array mapping string keys to values.
    Array(IndexMap<String, Value>),
}

impl Value {
    /// Creates an empty store: an array with no entries.
    pub fn new() -> Self {
        Value::Array(IndexMap::default())
    }

    /// Creates an empty list value.
    pub fn list() -> Self {
        Value::List(Vec::new())
    }

    /// Creates an empty array value.
    pub fn array() -> Self {
        Value::Array(IndexMap::default())
    }

    /// Returns the string content, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(string) => Some(string),
            _ => None,
        }
    }

    /// Returns the integer content, if this is an integer value.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(integer) => Some(*integer),
            _ => None,
        }
    }

    /// Returns the float content, if this is a float value.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(float) => Some(*float),
            _ => None,
        }
    }

    /// Returns the elements, if this is a list value.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(elements) => Some(elements),
            _ => None,
        }
    }

    /// Returns the elements mutably, if this is a list value.
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(elements) => Some(elements),
            _ => None,
        }
    }

    /// Returns the entries, if this is an array value.
    pub fn as_array(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Array(entries) => Some(entries),
            _ => None,
        }
    }

    /// Returns the entries mutably, if this is an array value.
    pub fn as_array_mut(&mut self) -> Option<&mut IndexMap<String, Value>> {
        match self {
            Value::Array(entries) => Some(entries),
            _ => None,
        }
    }

    /// The name of the value's variant, as it appears in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::List(_) => "list",
            Value::Array(_) => "array",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::new()
    }
}

impl From<&str> for Value {
    fn from(string: &str) -> Self {
        Value::String(string.to_owned())
    }
}

impl From<String> for Value {
    fn from(string: String) -> Self {
        Value::String(string)
    }
}

impl From<i32> for Value {
    fn from(integer: i32) -> Self {
        Value::Int(integer)
    }
}

impl From<f64> for Value {
    fn from(float: f64) -> Self {
        Value::Float(float)
    }
}
