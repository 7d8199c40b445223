//! Graph element → store document encoding.
//!
//! Vertices become documents whose user properties are arrays of
//! `{"_value": .., "id": ..}` objects (the store's multi-property model),
//! unless flattening is requested. Edges become flat documents carrying the
//! endpoint linkage fields and an `_isEdge` marker.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::error::EncodeError;
use crate::model::{Edge, Vertex, VertexProperty};

/// Document field names used by the store's graph model.
pub mod fields {
    pub const ID: &str = "id";
    pub const LABEL: &str = "label";
    pub const VALUE: &str = "_value";
    pub const SINK: &str = "_sink";
    pub const VERTEX_ID: &str = "_vertexId";
    pub const SINK_LABEL: &str = "_sinkLabel";
    pub const VERTEX_LABEL: &str = "_vertexLabel";
    pub const IS_EDGE: &str = "_isEdge";
    pub const SINK_PARTITION: &str = "_sinkPartition";

    /// Names a user edge property may never use.
    pub const SYSTEM_EDGE_PROPERTIES: &[&str] = &[
        ID,
        LABEL,
        SINK,
        VERTEX_ID,
        SINK_LABEL,
        VERTEX_LABEL,
        IS_EDGE,
        SINK_PARTITION,
    ];
}

/// Partitioning and layout settings, resolved once per batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Document field holding the partition key value.
    pub partition_key: String,
    /// Whether every document must carry a partition key value.
    pub partition_required: bool,
    /// Emit the first value of each vertex property as a plain scalar.
    pub flatten_properties: bool,
    /// Names rejected as user edge properties.
    pub reserved_edge_properties: BTreeSet<String>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            partition_key: "pk".to_string(),
            partition_required: true,
            flatten_properties: false,
            reserved_edge_properties: fields::SYSTEM_EDGE_PROPERTIES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Encodes vertices and edges with a fixed [`EncoderConfig`].
#[derive(Debug, Clone)]
pub struct GraphDocumentEncoder {
    config: EncoderConfig,
    reserved: BTreeSet<String>,
}

impl GraphDocumentEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        // The partition key field is written by the encoder itself on edges.
        let mut reserved = config.reserved_edge_properties.clone();
        if config.partition_required {
            reserved.insert(config.partition_key.clone());
        }
        Self { config, reserved }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn encode_vertex(&self, vertex: &Vertex) -> Result<String, EncodeError> {
        encode_vertex(
            vertex,
            &self.config.partition_key,
            self.config.flatten_properties,
            self.config.partition_required,
        )
    }

    pub fn encode_edge(&self, edge: &Edge) -> Result<String, EncodeError> {
        encode_edge(
            edge,
            self.config.partition_required,
            &self.config.partition_key,
            &self.reserved,
        )
    }
}

/// Encode a vertex into document text.
///
/// The partition key property is always emitted flat. When
/// `partition_required` is set the vertex must carry that property; the check
/// runs after all keys are visited so property order does not matter.
pub fn encode_vertex(
    vertex: &Vertex,
    partition_key: &str,
    flatten: bool,
    partition_required: bool,
) -> Result<String, EncodeError> {
    let document = vertex_document(vertex, partition_key, flatten, partition_required)?;
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Encode an edge into document text.
///
/// Under `partition_required` both endpoint partition keys must be present;
/// the out-vertex key is written under `partition_key` and the in-vertex key
/// under `_sinkPartition`.
pub fn encode_edge(
    edge: &Edge,
    partition_required: bool,
    partition_key: &str,
    reserved: &BTreeSet<String>,
) -> Result<String, EncodeError> {
    let document = edge_document(edge, partition_required, partition_key, reserved)?;
    Ok(serde_json::to_string_pretty(&document)?)
}

pub(crate) fn vertex_document(
    vertex: &Vertex,
    partition_key: &str,
    flatten: bool,
    partition_required: bool,
) -> Result<Value, EncodeError> {
    if let Some(key) = vertex
        .property_keys()
        .find(|key| *key == fields::ID || *key == fields::LABEL)
    {
        return Err(EncodeError::ReservedVertexProperty {
            vertex_id: vertex.id().to_string(),
            key: key.to_string(),
        });
    }

    let mut doc = Map::new();
    doc.insert(fields::ID.into(), Value::from(vertex.id()));
    doc.insert(fields::LABEL.into(), Value::from(vertex.label()));

    let mut partition_found = false;

    for key in vertex.property_keys() {
        let values = vertex.vertex_properties(key);

        if key == partition_key {
            let first = values
                .first()
                .ok_or_else(|| EncodeError::MissingPartitionValue {
                    vertex_id: vertex.id().to_string(),
                    key: key.to_string(),
                })?;
            doc.insert(key.to_string(), first.value().to_json());
            partition_found = true;
            continue;
        }

        if flatten {
            let first = values
                .first()
                .ok_or_else(|| EncodeError::MissingPropertyValue {
                    vertex_id: vertex.id().to_string(),
                    key: key.to_string(),
                })?;
            doc.insert(key.to_string(), first.value().to_json());
            continue;
        }

        let entries = values.iter().map(multi_value_entry).collect();
        doc.insert(key.to_string(), Value::Array(entries));
    }

    if partition_required && !partition_found {
        return Err(EncodeError::PartitionKeyRequired {
            vertex_id: vertex.id().to_string(),
            key: partition_key.to_string(),
        });
    }

    Ok(Value::Object(doc))
}

fn multi_value_entry(property: &VertexProperty) -> Value {
    let token = property
        .id()
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), ToString::to_string);
    let mut entry = Map::new();
    entry.insert(fields::VALUE.into(), property.value().to_json());
    entry.insert(fields::ID.into(), Value::String(token));
    Value::Object(entry)
}

pub(crate) fn edge_document(
    edge: &Edge,
    partition_required: bool,
    partition_key: &str,
    reserved: &BTreeSet<String>,
) -> Result<Value, EncodeError> {
    let partition = if partition_required {
        let in_key = edge
            .in_partition_key()
            .ok_or_else(|| EncodeError::MissingInVertexPartitionKey {
                edge_id: edge.id().to_string(),
            })?;
        let out_key = edge
            .out_partition_key()
            .ok_or_else(|| EncodeError::MissingOutVertexPartitionKey {
                edge_id: edge.id().to_string(),
            })?;
        Some((out_key, in_key))
    } else {
        None
    };

    let mut doc = Map::new();
    doc.insert(fields::ID.into(), Value::from(edge.id()));
    doc.insert(fields::LABEL.into(), Value::from(edge.label()));
    doc.insert(fields::SINK.into(), Value::from(edge.in_vertex_id()));
    doc.insert(fields::VERTEX_ID.into(), Value::from(edge.out_vertex_id()));
    doc.insert(fields::SINK_LABEL.into(), Value::from(edge.in_vertex_label()));
    doc.insert(fields::VERTEX_LABEL.into(), Value::from(edge.out_vertex_label()));
    doc.insert(fields::IS_EDGE.into(), Value::Bool(true));

    if let Some((out_key, in_key)) = partition {
        doc.insert(partition_key.to_string(), out_key.to_json());
        doc.insert(fields::SINK_PARTITION.into(), in_key.to_json());
    }

    for property in edge.properties() {
        if reserved.contains(property.key()) {
            return Err(EncodeError::ReservedPropertyCollision {
                edge_id: edge.id().to_string(),
                key: property.key().to_string(),
            });
        }
        doc.insert(property.key().to_string(), property.value().to_json());
    }

    Ok(Value::Object(doc))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use indexmap::IndexMap;

    use super::*;
    use crate::model::PropertyValue;

    fn reserved() -> BTreeSet<String> {
        EncoderConfig::default().reserved_edge_properties
    }

    fn meep() -> Vertex {
        Vertex::new("meep", "FACILITY")
            .unwrap()
            .with_property("description", "a useful description")
            .unwrap()
            .with_property("location", "B1")
            .unwrap()
            .with_property("location", "B2")
            .unwrap()
            .with_property("pk", "/pk")
            .unwrap()
    }

    fn parse(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn vertex_emits_id_label_and_multi_values() {
        let doc = parse(&encode_vertex(&meep(), "pk", false, true).unwrap());

        assert_eq!(doc["id"], "meep");
        assert_eq!(doc["label"], "FACILITY");
        assert_eq!(doc["pk"], "/pk");

        let locations = doc["location"].as_array().unwrap();
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0]["_value"], "B1");
        assert_eq!(locations[1]["_value"], "B2");
        assert_ne!(locations[0]["id"], locations[1]["id"]);
    }

    #[test]
    fn vertex_field_order_follows_insertion() {
        let doc = parse(&encode_vertex(&meep(), "pk", false, true).unwrap());
        let keys: Vec<_> = doc.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["id", "label", "description", "location", "pk"]);
    }

    #[test]
    fn partition_key_found_after_other_keys_is_honored() {
        let v = Vertex::new("late", "FLOOR")
            .unwrap()
            .with_property("a", 1)
            .unwrap()
            .with_property("b", 2)
            .unwrap()
            .with_property("tenant", "t-1")
            .unwrap();
        let doc = parse(&encode_vertex(&v, "tenant", false, true).unwrap());
        assert_eq!(doc["tenant"], "t-1");
    }

    #[test]
    fn missing_partition_key_is_rejected_when_required() {
        let v = Vertex::new("beep", "FACILITY")
            .unwrap()
            .with_property("name", "Beep")
            .unwrap();
        let err = encode_vertex(&v, "pk", false, true).unwrap_err();
        assert!(matches!(err, EncodeError::PartitionKeyRequired { .. }));

        // Unpartitioned collections do not need one.
        assert!(encode_vertex(&v, "pk", false, false).is_ok());
    }

    #[test]
    fn empty_partition_value_list_fails() {
        let mut props = IndexMap::new();
        props.insert("pk".to_string(), Vec::new());
        let v = Vertex::from_parts("beep", "FACILITY", props).unwrap();
        let err = encode_vertex(&v, "pk", false, false).unwrap_err();
        assert!(matches!(err, EncodeError::MissingPartitionValue { .. }));
    }

    #[test]
    fn flattened_vertex_uses_first_value() {
        let doc = parse(&encode_vertex(&meep(), "pk", true, true).unwrap());
        assert_eq!(doc["location"], "B1");
        assert_eq!(doc["description"], "a useful description");
    }

    #[test]
    fn flattened_vertex_with_empty_value_list_fails() {
        let mut props = IndexMap::new();
        props.insert("pk".to_string(), vec![VertexProperty::new("pk", "/pk").unwrap()]);
        props.insert("name".to_string(), Vec::new());
        let v = Vertex::from_parts("beep", "FACILITY", props).unwrap();

        let err = encode_vertex(&v, "pk", true, true).unwrap_err();
        match err {
            EncodeError::MissingPropertyValue { key, .. } => assert_eq!(key, "name"),
            other => panic!("Expected MissingPropertyValue, got {other:?}"),
        }
    }

    #[test]
    fn pinned_vertex_property_id_is_kept() {
        let mut v = Vertex::new("beep", "FACILITY").unwrap();
        v.add_vertex_property(VertexProperty::new("name", "Beep").unwrap().with_id("name-1"))
            .unwrap();
        v.add_property("name", "Boop").unwrap();
        let doc = parse(&encode_vertex(&v, "pk", false, false).unwrap());
        assert_eq!(doc["name"][0]["id"], "name-1");
        assert_ne!(doc["name"][1]["id"], "name-1");
    }

    #[test]
    fn vertex_properties_cannot_replace_id_or_label() {
        let v = Vertex::new("First", "FLOOR")
            .unwrap()
            .with_property("pk", "/pk")
            .unwrap()
            .with_property("id", "Other")
            .unwrap();
        for flatten in [true, false] {
            let err = encode_vertex(&v, "pk", flatten, true).unwrap_err();
            match err {
                EncodeError::ReservedVertexProperty { vertex_id, key } => {
                    assert_eq!(vertex_id, "First");
                    assert_eq!(key, "id");
                }
                other => panic!("Expected ReservedVertexProperty, got {other:?}"),
            }
        }

        let labelled = Vertex::new("First", "FLOOR")
            .unwrap()
            .with_property("label", "ROOM")
            .unwrap();
        let err = encode_vertex(&labelled, "pk", true, false).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::ReservedVertexProperty { ref key, .. } if key == "label"
        ));
    }

    #[test]
    fn scalar_types_are_preserved() {
        let v = Vertex::new("typed", "FLOOR")
            .unwrap()
            .with_property("level", 3)
            .unwrap()
            .with_property("area", 12.5)
            .unwrap()
            .with_property("open", true)
            .unwrap();
        let doc = parse(&encode_vertex(&v, "pk", true, false).unwrap());
        assert_eq!(doc["level"], 3);
        assert_eq!(doc["area"], 12.5);
        assert_eq!(doc["open"], true);
    }

    fn joins() -> Edge {
        Edge::new("edge1", "joins", "meep", "beep", "meep out", "beep in")
            .unwrap()
            .with_partition_keys("/pk", "/pk")
            .unwrap()
            .with_property("since", 2021)
            .unwrap()
    }

    #[test]
    fn edge_document_layout() {
        let text = encode_edge(&joins(), true, "pk", &reserved()).unwrap();
        insta::assert_snapshot!(text, @r#"
        {
          "id": "edge1",
          "label": "joins",
          "_sink": "beep",
          "_vertexId": "meep",
          "_sinkLabel": "beep in",
          "_vertexLabel": "meep out",
          "_isEdge": true,
          "pk": "/pk",
          "_sinkPartition": "/pk",
          "since": 2021
        }
        "#);
    }

    #[test]
    fn edge_without_partitioning_omits_partition_fields() {
        let edge = Edge::new("e", "joins", "a", "b", "A", "B").unwrap();
        let doc = parse(&encode_edge(&edge, false, "pk", &reserved()).unwrap());
        assert!(doc.get("pk").is_none());
        assert!(doc.get("_sinkPartition").is_none());
        assert_eq!(doc["_isEdge"], true);
    }

    #[test]
    fn edge_requires_both_partition_keys() {
        let edge = Edge::new("e", "joins", "a", "b", "A", "B").unwrap();
        let err = encode_edge(&edge, true, "pk", &reserved()).unwrap_err();
        assert!(matches!(err, EncodeError::MissingInVertexPartitionKey { .. }));
    }

    #[test]
    fn edge_missing_out_partition_key() {
        let edge: Edge = serde_json::from_value(serde_json::json!({
            "id": "e", "label": "joins",
            "out_vertex_id": "a", "in_vertex_id": "b",
            "out_vertex_label": "A", "in_vertex_label": "B",
            "in_partition_key": "/pk"
        }))
        .unwrap();
        let err = encode_edge(&edge, true, "pk", &reserved()).unwrap_err();
        assert!(matches!(err, EncodeError::MissingOutVertexPartitionKey { .. }));
    }

    #[test]
    fn edge_reserved_property_collides() {
        let edge = Edge::new("e", "joins", "a", "b", "A", "B")
            .unwrap()
            .with_property("weight", 1)
            .unwrap()
            .with_property("_isEdge", false)
            .unwrap();
        let err = encode_edge(&edge, false, "pk", &reserved()).unwrap_err();
        match err {
            EncodeError::ReservedPropertyCollision { edge_id, key } => {
                assert_eq!(edge_id, "e");
                assert_eq!(key, "_isEdge");
            }
            other => panic!("Expected ReservedPropertyCollision, got {other:?}"),
        }
    }

    #[test]
    fn encoder_reserves_partition_key_field() {
        let encoder = GraphDocumentEncoder::new(EncoderConfig::default());
        let edge = joins().with_property("pk", "/other").unwrap();
        let err = encoder.encode_edge(&edge).unwrap_err();
        assert!(matches!(err, EncodeError::ReservedPropertyCollision { .. }));
    }

    #[test]
    fn edge_partition_values_keep_type() {
        let edge = Edge::new("e", "joins", "a", "b", "A", "B")
            .unwrap()
            .with_partition_keys(PropertyValue::Int(7), PropertyValue::Int(8))
            .unwrap();
        let doc = parse(&encode_edge(&edge, true, "tenant", &reserved()).unwrap());
        assert_eq!(doc["tenant"], 7);
        assert_eq!(doc["_sinkPartition"], 8);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn multi_value_array_has_one_entry_per_value(
                values in proptest::collection::vec("[a-z]{1,8}", 1..16)
            ) {
                let mut v = Vertex::new("v", "FLOOR").unwrap();
                for value in &values {
                    v.add_property("tag", value.as_str()).unwrap();
                }
                let doc = parse(&encode_vertex(&v, "pk", false, false).unwrap());
                let entries = doc["tag"].as_array().unwrap();
                prop_assert_eq!(entries.len(), values.len());

                let ids: HashSet<_> = entries
                    .iter()
                    .map(|e| e["id"].as_str().unwrap().to_string())
                    .collect();
                prop_assert_eq!(ids.len(), values.len());

                for (entry, value) in entries.iter().zip(&values) {
                    prop_assert_eq!(entry["_value"].as_str().unwrap(), value.as_str());
                }
            }
        }
    }
}
