//! Tagged values and semantic type tags for bindable fields.
//!
//! Every field in an [`ArgumentSchema`](crate::ArgumentSchema) is read and
//! written through a [`Value`]. The descriptor's [`ValueType`] tells the
//! binder and the coercion service what shape a value must have.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AccessError;

/// A field value in transit between the command line and a configuration.
///
/// # Examples
///
/// ```
/// use argbind_core::Value;
///
/// let v = Value::from(vec!["a", "b"]);
/// assert_eq!(v.to_string(), "a, b");
/// assert_eq!(Value::from(3).as_i64(), Some(3));
/// assert!(Value::Null.is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// No value (an unset optional field).
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Integer(i64),
    /// Floating point value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Ordered array of values.
    Array(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as `f64`, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Short label of the variant, used in accessor error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "number",
            Value::Text(_) => "string",
            Value::Array(_) => "array",
        }
    }

    /// Converts into a `String`, failing for any non-text variant.
    pub fn into_string(self) -> Result<String, AccessError> {
        match self {
            Value::Text(s) => Ok(s),
            other => Err(AccessError::new("string", other.kind())),
        }
    }

    /// Converts into a `Vec<String>`, failing unless every element is text.
    pub fn into_strings(self) -> Result<Vec<String>, AccessError> {
        match self {
            Value::Array(items) => items.into_iter().map(Value::into_string).collect(),
            other => Err(AccessError::new("array", other.kind())),
        }
    }

    /// Converts into a `Vec<i64>`, failing unless every element is an integer.
    pub fn into_integers(self) -> Result<Vec<i64>, AccessError> {
        match self {
            Value::Array(items) => items
                .into_iter()
                .map(|item| {
                    item.as_i64()
                        .ok_or_else(|| AccessError::new("integer", item.kind()))
                })
                .collect(),
            other => Err(AccessError::new("array", other.kind())),
        }
    }

    pub fn into_bool(self) -> Result<bool, AccessError> {
        self.as_bool()
            .ok_or_else(|| AccessError::new("boolean", self.kind()))
    }

    pub fn into_i64(self) -> Result<i64, AccessError> {
        self.as_i64()
            .ok_or_else(|| AccessError::new("integer", self.kind()))
    }

    pub fn into_f64(self) -> Result<f64, AccessError> {
        self.as_f64()
            .ok_or_else(|| AccessError::new("number", self.kind()))
    }

    /// Converts into `Option<String>`, mapping `Null` to `None`.
    pub fn into_optional_string(self) -> Result<Option<String>, AccessError> {
        match self {
            Value::Null => Ok(None),
            other => other.into_string().map(Some),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<u16> for Value {
    fn from(i: u16) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

/// Element type of a scalar or array field.
///
/// # Examples
///
/// ```
/// use argbind_core::ScalarType;
///
/// assert_eq!(ScalarType::Integer.to_string(), "integer");
/// let choice = ScalarType::Choice(vec!["json".into(), "yaml".into()]);
/// assert_eq!(choice.to_string(), "one of json|yaml");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarType {
    Bool,
    Integer,
    Float,
    String,
    /// One of a fixed set of words, matched case-insensitively.
    Choice(Vec<String>),
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarType::Bool => f.write_str("boolean"),
            ScalarType::Integer => f.write_str("integer"),
            ScalarType::Float => f.write_str("number"),
            ScalarType::String => f.write_str("string"),
            ScalarType::Choice(choices) => write!(f, "one of {}", choices.join("|")),
        }
    }
}

/// Semantic type tag of a bindable field.
///
/// Only `Scalar(Bool)` gets boolean binding rules (bare flag, trailing `-`,
/// fallback to `true`). An array of booleans binds like any other array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    Scalar(ScalarType),
    Array(ScalarType),
}

impl ValueType {
    pub fn bool() -> Self {
        ValueType::Scalar(ScalarType::Bool)
    }

    pub fn string() -> Self {
        ValueType::Scalar(ScalarType::String)
    }

    pub fn integer() -> Self {
        ValueType::Scalar(ScalarType::Integer)
    }

    pub fn float() -> Self {
        ValueType::Scalar(ScalarType::Float)
    }

    pub fn choice<S: Into<String>>(choices: impl IntoIterator<Item = S>) -> Self {
        ValueType::Scalar(ScalarType::Choice(
            choices.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn array(element: ScalarType) -> Self {
        ValueType::Array(element)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, ValueType::Scalar(ScalarType::Bool))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, ValueType::Array(_))
    }

    /// The scalar type, or the element type for arrays.
    pub fn element(&self) -> &ScalarType {
        match self {
            ValueType::Scalar(t) | ValueType::Array(t) => t,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Scalar(t) => write!(f, "{t}"),
            ValueType::Array(t) => write!(f, "array of {t}"),
        }
    }
}

/// A configuration without a Rust struct behind it: field name to value.
///
/// Schemas over a `ValueMap` are built with
/// [`SchemaBuilder::entry`](crate::SchemaBuilder::entry).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueMap {
    values: BTreeMap<String, Value>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored for `name`, or `Null` when absent.
    pub fn get(&self, name: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.values.get(name).unwrap_or(&NULL)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
