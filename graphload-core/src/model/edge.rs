use serde::Deserialize;

use crate::error::ModelError;

use super::property::{Property, PropertyCollection, PropertyValue};

/// A directed, labeled connection from the out-vertex to the in-vertex.
///
/// Identifiers and labels are validated at construction. Reserved property
/// names are only checked when the edge is encoded, because the reserved set
/// depends on the target collection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "EdgeRecord")]
pub struct Edge {
    id: String,
    label: String,
    out_vertex_id: String,
    in_vertex_id: String,
    out_vertex_label: String,
    in_vertex_label: String,
    out_partition_key: Option<PropertyValue>,
    in_partition_key: Option<PropertyValue>,
    properties: PropertyCollection,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        out_vertex_id: impl Into<String>,
        in_vertex_id: impl Into<String>,
        out_vertex_label: impl Into<String>,
        in_vertex_label: impl Into<String>,
    ) -> Result<Self, ModelError> {
        let edge = Self {
            id: id.into(),
            label: label.into(),
            out_vertex_id: out_vertex_id.into(),
            in_vertex_id: in_vertex_id.into(),
            out_vertex_label: out_vertex_label.into(),
            in_vertex_label: in_vertex_label.into(),
            out_partition_key: None,
            in_partition_key: None,
            properties: PropertyCollection::new(),
        };
        edge.validate()?;
        Ok(edge)
    }

    fn validate(&self) -> Result<(), ModelError> {
        let required = [
            (&self.id, "Id"),
            (&self.label, "Label"),
            (&self.in_vertex_id, "InVertexId"),
            (&self.out_vertex_id, "OutVertexId"),
            (&self.in_vertex_label, "InVertexLabel"),
            (&self.out_vertex_label, "OutVertexLabel"),
        ];
        for (value, field) in required {
            if value.is_empty() {
                return Err(ModelError::MissingField {
                    element: "Edge",
                    field,
                });
            }
        }
        for (key, value) in [
            ("OutVertexPartitionKey", &self.out_partition_key),
            ("InVertexPartitionKey", &self.in_partition_key),
        ] {
            if value.as_ref().is_some_and(|v| !v.is_finite()) {
                return Err(ModelError::NonFiniteValue(key.to_string()));
            }
        }
        Ok(())
    }

    /// Attach the partition key values of both endpoints.
    pub fn with_partition_keys(
        mut self,
        out_partition_key: impl Into<PropertyValue>,
        in_partition_key: impl Into<PropertyValue>,
    ) -> Result<Self, ModelError> {
        self.out_partition_key = Some(out_partition_key.into());
        self.in_partition_key = Some(in_partition_key.into());
        self.validate()?;
        Ok(self)
    }

    pub fn add_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Result<(), ModelError> {
        self.properties.insert(key, value)
    }

    /// Builder form of [`Edge::add_property`].
    pub fn with_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Result<Self, ModelError> {
        self.add_property(key, value)?;
        Ok(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn out_vertex_id(&self) -> &str {
        &self.out_vertex_id
    }

    pub fn in_vertex_id(&self) -> &str {
        &self.in_vertex_id
    }

    pub fn out_vertex_label(&self) -> &str {
        &self.out_vertex_label
    }

    pub fn in_vertex_label(&self) -> &str {
        &self.in_vertex_label
    }

    pub fn out_partition_key(&self) -> Option<&PropertyValue> {
        self.out_partition_key.as_ref()
    }

    pub fn in_partition_key(&self) -> Option<&PropertyValue> {
        self.in_partition_key.as_ref()
    }

    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.get(key)
    }

    pub fn properties(&self) -> &PropertyCollection {
        &self.properties
    }
}

#[derive(Deserialize)]
struct EdgeRecord {
    id: String,
    label: String,
    out_vertex_id: String,
    in_vertex_id: String,
    out_vertex_label: String,
    in_vertex_label: String,
    #[serde(default)]
    out_partition_key: Option<PropertyValue>,
    #[serde(default)]
    in_partition_key: Option<PropertyValue>,
    #[serde(default)]
    properties: PropertyCollection,
}

impl TryFrom<EdgeRecord> for Edge {
    type Error = ModelError;

    fn try_from(record: EdgeRecord) -> Result<Self, Self::Error> {
        let edge = Self {
            id: record.id,
            label: record.label,
            out_vertex_id: record.out_vertex_id,
            in_vertex_id: record.in_vertex_id,
            out_vertex_label: record.out_vertex_label,
            in_vertex_label: record.in_vertex_label,
            out_partition_key: record.out_partition_key,
            in_partition_key: record.in_partition_key,
            properties: record.properties,
        };
        edge.validate()?;
        Ok(edge)
    }
}
