//! The components mapping: field name to value, in field order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::Value;

/// Build a [`Components`] mapping from `key => value` pairs.
///
/// ```
/// use namer::components;
///
/// let c = components! { "document_id" => "1234", "tnum" => 3 };
/// assert_eq!(c.len(), 2);
/// ```
#[macro_export]
macro_rules! components {
    () => {
        $crate::Components::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Components::new()$(.with($key, $value))+
    };
}

/// A mapping from field name to value.
///
/// Equality ignores key order; iteration follows insertion order, which for
/// decoded and validated components is the schema's field order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Components(IndexMap<String, Value>);

impl Components {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Create an empty mapping with room for `capacity` fields.
    pub fn with_capacity(capacity: usize) -> Self {
        Self(IndexMap::with_capacity(capacity))
    }

    /// Add a field, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a field, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a field as a string slice, if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Get a field unless it is absent or null.
    pub fn get_present(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|v| !v.is_null())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// New mapping with `overrides` laid over `self`. Override values win.
    pub fn merged(&self, overrides: &Components) -> Components {
        let mut merged = self.clone();
        for (key, value) in overrides.iter() {
            merged.insert(key, value.clone());
        }
        merged
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Components {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Components {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
