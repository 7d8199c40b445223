use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A scalar property value. There is no null variant: a property always
/// carries a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl PropertyValue {
    /// Name of the runtime type, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }

    pub(crate) fn is_finite(&self) -> bool {
        match self {
            Self::Float(f) => f.is_finite(),
            _ => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Value::from(*f),
            Self::String(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

/// An immutable key/value pair attached to a graph element.
#[derive(Debug, Clone)]
pub struct Property {
    key: String,
    value: PropertyValue,
}

impl Property {
    pub fn new(key: impl Into<String>, value: impl Into<PropertyValue>) -> Result<Self, ModelError> {
        let key = key.into();
        let value = value.into();
        if key.is_empty() {
            return Err(ModelError::EmptyPropertyKey);
        }
        if !value.is_finite() {
            return Err(ModelError::NonFiniteValue(key));
        }
        Ok(Self { key, value })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }
}

/// Keys compare case-insensitively; values must share a runtime type and be equal.
impl PartialEq for Property {
    fn eq(&self, other: &Self) -> bool {
        keys_match(&self.key, &other.key) && self.value == other.value
    }
}

fn keys_match(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Insertion-ordered properties with unique keys.
///
/// Adding a key that is already present is rejected rather than overwriting
/// the existing value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyCollection {
    items: IndexMap<String, Property>,
}

impl PropertyCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, property: Property) -> Result<(), ModelError> {
        match self.items.entry(property.key.clone()) {
            Entry::Occupied(e) => Err(ModelError::DuplicateProperty(e.key().clone())),
            Entry::Vacant(e) => {
                e.insert(property);
                Ok(())
            }
        }
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Result<(), ModelError> {
        self.add(Property::new(key, value)?)
    }

    pub fn get(&self, key: &str) -> Option<&Property> {
        self.items.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a PropertyCollection {
    type Item = &'a Property;
    type IntoIter = indexmap::map::Values<'a, String, Property>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.values()
    }
}

impl Serialize for PropertyCollection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.items.len()))?;
        for property in self.items.values() {
            map.serialize_entry(&property.key, &property.value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PropertyCollection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, PropertyValue>::deserialize(deserializer)?;
        let mut collection = Self::new();
        for (key, value) in raw {
            collection.insert(key, value).map_err(serde::de::Error::custom)?;
        }
        Ok(collection)
    }
}
