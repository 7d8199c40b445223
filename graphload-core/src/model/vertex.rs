use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ModelError;

use super::property::{Property, PropertyValue};

/// One value of a (possibly multi-valued) vertex property.
///
/// `id` is the identity token of this particular value. It is normally left
/// empty and generated when the vertex is encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexProperty {
    id: Option<String>,
    property: Property,
}

impl VertexProperty {
    pub fn new(key: impl Into<String>, value: impl Into<PropertyValue>) -> Result<Self, ModelError> {
        Ok(Self {
            id: None,
            property: Property::new(key, value)?,
        })
    }

    /// Pin the identity token instead of generating one at encode time.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn key(&self) -> &str {
        self.property.key()
    }

    pub fn value(&self) -> &PropertyValue {
        self.property.value()
    }
}

/// A graph node: immutable id and label plus a multi-valued property map.
///
/// Property keys keep their insertion order so encoded documents are
/// deterministic apart from generated identity tokens.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "VertexRecord")]
pub struct Vertex {
    id: String,
    label: String,
    properties: IndexMap<String, Vec<VertexProperty>>,
}

impl Vertex {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Result<Self, ModelError> {
        Self::from_parts(id, label, IndexMap::new())
    }

    /// Build a vertex from an already-grouped property map. A key may map to
    /// an empty list; encoding decides whether that is acceptable.
    pub fn from_parts(
        id: impl Into<String>,
        label: impl Into<String>,
        properties: IndexMap<String, Vec<VertexProperty>>,
    ) -> Result<Self, ModelError> {
        let id = id.into();
        let label = label.into();
        if id.is_empty() {
            return Err(ModelError::MissingField {
                element: "Vertex",
                field: "Id",
            });
        }
        if label.is_empty() {
            return Err(ModelError::MissingField {
                element: "Vertex",
                field: "Label",
            });
        }
        for (key, values) in &properties {
            check_pinned_ids(key, values)?;
        }
        Ok(Self {
            id,
            label,
            properties,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Append a value under `key`. Existing values for the key are kept.
    pub fn add_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Result<(), ModelError> {
        let property = VertexProperty::new(key, value)?;
        self.add_vertex_property(property)?;
        Ok(())
    }

    /// Append a prepared vertex property and return a reference to it.
    /// Fails if another value under the same key is pinned to the same id.
    pub fn add_vertex_property(
        &mut self,
        property: VertexProperty,
    ) -> Result<&VertexProperty, ModelError> {
        let values = self
            .properties
            .entry(property.key().to_string())
            .or_default();
        if let Some(id) = property.id() {
            if values.iter().any(|existing| existing.id() == Some(id)) {
                return Err(ModelError::DuplicatePropertyId {
                    key: property.key().to_string(),
                    id: id.to_string(),
                });
            }
        }
        values.push(property);
        Ok(&values[values.len() - 1])
    }

    /// Builder form of [`Vertex::add_property`].
    pub fn with_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Result<Self, ModelError> {
        self.add_property(key, value)?;
        Ok(self)
    }

    pub fn property_keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// All values stored under `key`, in insertion order.
    pub fn vertex_properties(&self, key: &str) -> &[VertexProperty] {
        self.properties
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every value of every key, grouped by key.
    pub fn all_vertex_properties(&self) -> impl Iterator<Item = &VertexProperty> {
        self.properties.values().flatten()
    }

    pub fn first_value(&self, key: &str) -> Option<&PropertyValue> {
        self.vertex_properties(key).first().map(VertexProperty::value)
    }
}

fn check_pinned_ids(key: &str, values: &[VertexProperty]) -> Result<(), ModelError> {
    for (i, value) in values.iter().enumerate() {
        let Some(id) = value.id() else { continue };
        if values[..i].iter().any(|earlier| earlier.id() == Some(id)) {
            return Err(ModelError::DuplicatePropertyId {
                key: key.to_string(),
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ValueList {
    Many(Vec<PropertyValue>),
    One(PropertyValue),
}

#[derive(Deserialize)]
struct VertexRecord {
    id: String,
    label: String,
    #[serde(default)]
    properties: IndexMap<String, ValueList>,
}

impl TryFrom<VertexRecord> for Vertex {
    type Error = ModelError;

    fn try_from(record: VertexRecord) -> Result<Self, Self::Error> {
        let mut properties = IndexMap::with_capacity(record.properties.len());
        for (key, values) in record.properties {
            let values = match values {
                ValueList::Many(values) => values,
                ValueList::One(value) => vec![value],
            };
            if key.is_empty() {
                return Err(ModelError::EmptyPropertyKey);
            }
            let grouped = values
                .into_iter()
                .map(|value| VertexProperty::new(key.clone(), value))
                .collect::<Result<Vec<_>, _>>()?;
            properties.insert(key, grouped);
        }
        Self::from_parts(record.id, record.label, properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_requires_id_and_label() {
        assert_eq!(
            Vertex::new("", "FLOOR").unwrap_err(),
            ModelError::MissingField {
                element: "Vertex",
                field: "Id",
            }
        );
        assert_eq!(
            Vertex::new("First", "").unwrap_err(),
            ModelError::MissingField {
                element: "Vertex",
                field: "Label",
            }
        );
    }

    #[test]
    fn add_property_groups_values_by_key() {
        let mut v = Vertex::new("meep", "FACILITY").unwrap();
        v.add_property("location", "B1").unwrap();
        v.add_property("pk", "/pk").unwrap();
        v.add_property("location", "B2").unwrap();

        let keys: Vec<_> = v.property_keys().collect();
        assert_eq!(keys, ["location", "pk"]);
        let values: Vec<_> = v
            .vertex_properties("location")
            .iter()
            .map(|p| p.value().to_string())
            .collect();
        assert_eq!(values, ["B1", "B2"]);
        assert_eq!(v.all_vertex_properties().count(), 3);
        assert_eq!(v.first_value("pk"), Some(&PropertyValue::from("/pk")));
    }

    #[test]
    fn missing_key_yields_empty_slice() {
        let v = Vertex::new("beep", "FACILITY").unwrap();
        assert!(v.vertex_properties("nope").is_empty());
        assert!(v.first_value("nope").is_none());
    }

    #[test]
    fn add_vertex_property_keeps_pinned_id() {
        let mut v = Vertex::new("beep", "FACILITY").unwrap();
        let added = v
            .add_vertex_property(VertexProperty::new("name", "Beep").unwrap().with_id("n-1"))
            .unwrap();
        assert_eq!(added.id(), Some("n-1"));
    }

    #[test]
    fn pinned_ids_must_differ_within_a_key() {
        let mut v = Vertex::new("beep", "FACILITY").unwrap();
        v.add_vertex_property(VertexProperty::new("tag", "a").unwrap().with_id("t"))
            .unwrap();
        let err = v
            .add_vertex_property(VertexProperty::new("tag", "b").unwrap().with_id("t"))
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicatePropertyId {
                key: "tag".into(),
                id: "t".into(),
            }
        );
        assert_eq!(v.vertex_properties("tag").len(), 1);

        // The same id under another key, or unpinned values, are fine.
        v.add_vertex_property(VertexProperty::new("name", "b").unwrap().with_id("t"))
            .unwrap();
        v.add_property("tag", "c").unwrap();
        v.add_property("tag", "d").unwrap();
        assert_eq!(v.vertex_properties("tag").len(), 3);
    }

    #[test]
    fn from_parts_rejects_duplicate_pinned_ids() {
        let mut props = IndexMap::new();
        props.insert(
            "tag".to_string(),
            vec![
                VertexProperty::new("tag", "a").unwrap().with_id("t"),
                VertexProperty::new("tag", "b").unwrap().with_id("t"),
            ],
        );
        let err = Vertex::from_parts("beep", "FACILITY", props).unwrap_err();
        assert!(matches!(err, ModelError::DuplicatePropertyId { .. }));
    }

    #[test]
    fn deserialize_accepts_single_and_list_values() {
        let v: Vertex = serde_json::from_str(
            r#"{"id":"meep","label":"FACILITY","properties":{"pk":"/pk","tags":["a","b"],"empty":[]}}"#,
        )
        .unwrap();
        assert_eq!(v.vertex_properties("pk").len(), 1);
        assert_eq!(v.vertex_properties("tags").len(), 2);
        assert!(v.vertex_properties("empty").is_empty());
        assert_eq!(v.property_keys().count(), 3);
    }

    #[test]
    fn deserialize_runs_validation() {
        let result: Result<Vertex, _> = serde_json::from_str(r#"{"id":"","label":"FLOOR"}"#);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Vertex must have a valid Id"));
    }
}
