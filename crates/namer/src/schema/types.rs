//! Core type definitions for component values, types, coercions and constraints.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single component value.
///
/// `Null` only ever appears inside batch tables, where it marks an absent
/// cell. Validated components never contain it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// Returns true if this is the null marker.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the string slice if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is an integer value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Name of the runtime type, as reported in type mismatches.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
        }
    }

    /// Text form used when a strategy writes the value into a name.
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            Value::Null => Cow::Borrowed(""),
            Value::Boolean(b) => Cow::Owned(b.to_string()),
            Value::Integer(i) => Cow::Owned(i.to_string()),
            Value::Float(f) => Cow::Owned(f.to_string()),
            Value::String(s) => Cow::Borrowed(s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Declared type of a component field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
}

impl FieldType {
    /// Returns true if the value has exactly this type.
    pub fn matches(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (FieldType::String, Value::String(_))
                | (FieldType::Integer, Value::Integer(_))
                | (FieldType::Float, Value::Float(_))
                | (FieldType::Boolean, Value::Boolean(_))
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Signature of a caller-supplied coercion. Returning `None` leaves the value
/// untouched, so the type check that follows reports it.
pub type CoerceFn = dyn Fn(&Value) -> Option<Value> + Send + Sync;

/// Conversion applied to a raw value before its type is checked.
#[derive(Clone)]
pub enum Coercion {
    /// Integers, floats and booleans become their decimal/text form.
    ToString,
    /// Numeric strings and whole floats become integers.
    ToInteger,
    /// Integers and numeric strings become floats.
    ToFloat,
    /// Arbitrary per-value conversion.
    Custom(Arc<CoerceFn>),
}

impl Coercion {
    /// Wrap a closure as a custom coercion.
    pub fn custom(f: impl Fn(&Value) -> Option<Value> + Send + Sync + 'static) -> Self {
        Coercion::Custom(Arc::new(f))
    }

    /// Built-in coercions can be applied to a whole column in one tight loop.
    pub fn is_broadcastable(&self) -> bool {
        !matches!(self, Coercion::Custom(_))
    }

    /// Coerce one value. Values that cannot be converted come back unchanged.
    pub fn apply(&self, value: Value) -> Value {
        match self {
            Coercion::ToString => to_string(value),
            Coercion::ToInteger => to_integer(value),
            Coercion::ToFloat => to_float(value),
            Coercion::Custom(f) => f(&value).unwrap_or(value),
        }
    }

    /// Coerce every non-null cell of a column.
    pub fn apply_column(&self, column: &mut [Value]) {
        let convert: fn(Value) -> Value = match self {
            Coercion::ToString => to_string,
            Coercion::ToInteger => to_integer,
            Coercion::ToFloat => to_float,
            Coercion::Custom(f) => {
                for cell in column.iter_mut().filter(|c| !c.is_null()) {
                    if let Some(coerced) = f(cell) {
                        *cell = coerced;
                    }
                }
                return;
            }
        };

        for cell in column.iter_mut().filter(|c| !c.is_null()) {
            *cell = convert(std::mem::take(cell));
        }
    }
}

impl fmt::Debug for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coercion::ToString => f.write_str("ToString"),
            Coercion::ToInteger => f.write_str("ToInteger"),
            Coercion::ToFloat => f.write_str("ToFloat"),
            Coercion::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

fn to_string(value: Value) -> Value {
    match value {
        Value::Integer(_) | Value::Float(_) | Value::Boolean(_) => {
            Value::String(value.render().into_owned())
        }
        other => other,
    }
}

fn to_integer(value: Value) -> Value {
    match value {
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::String(s),
        },
        // 2^63 itself is out of range; `as` would saturate it
        Value::Float(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Value::Integer(f as i64)
        }
        other => other,
    }
}

fn to_float(value: Value) -> Value {
    match value {
        Value::Integer(i) => Value::Float(i as f64),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(f) => Value::Float(f),
            Err(_) => Value::String(s),
        },
        other => other,
    }
}

/// A constraint on field values, checked after coercion and type checking.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Rendered length in characters.
    Length {
        min: Option<usize>,
        max: Option<usize>,
    },
    /// Rendered value must fully match the regex.
    Pattern(Regex),
}

impl Constraint {
    /// Exact rendered length.
    pub fn exact_length(len: usize) -> Self {
        Constraint::Length {
            min: Some(len),
            max: Some(len),
        }
    }

    /// Compile a full-match pattern constraint.
    pub fn pattern(pattern: &str) -> Result<Self> {
        Ok(Constraint::Pattern(Regex::new(&format!("^(?:{})$", pattern))?))
    }

    /// Check a value, returning the reason on violation.
    pub fn check(&self, value: &Value) -> std::result::Result<(), String> {
        let rendered = value.render();
        match self {
            Constraint::Length { min, max } => {
                let len = rendered.chars().count();
                if min.is_some_and(|m| len < m) || max.is_some_and(|m| len > m) {
                    return Err(format!(
                        "length {} outside [{}, {}]",
                        len,
                        min.map(|v| v.to_string()).unwrap_or("0".to_string()),
                        max.map(|v| v.to_string()).unwrap_or("∞".to_string())
                    ));
                }
                Ok(())
            }
            Constraint::Pattern(regex) => {
                if regex.is_match(&rendered) {
                    Ok(())
                } else {
                    Err(format!("'{}' does not match {}", rendered, regex.as_str()))
                }
            }
        }
    }
}
