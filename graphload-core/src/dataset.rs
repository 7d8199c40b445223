// Graph datasets: the vertices and edges handed to one import.

use std::path::Path;

use serde::Deserialize;

use crate::error::DatasetError;
use crate::model::{Edge, Vertex};

/// A set of vertices and edges loaded from JSON.
///
/// ```json
/// {
///   "vertices": [{"id": "First", "label": "FLOOR", "properties": {"pk": "/pk"}}],
///   "edges": [{"id": "FirstEdge", "label": "joins",
///              "out_vertex_id": "Second", "in_vertex_id": "First",
///              "out_vertex_label": "FLOOR", "in_vertex_label": "FLOOR",
///              "out_partition_key": "/pk", "in_partition_key": "/pk"}]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GraphDataset {
    #[serde(default)]
    pub vertices: Vec<Vertex>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl GraphDataset {
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, DatasetError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn len(&self) -> usize {
        self.vertices.len() + self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "vertices": [
            {"id": "meep", "label": "FACILITY",
             "properties": {"description": "a useful description", "location": "B1", "pk": "/pk"}},
            {"id": "beep", "label": "FACILITY", "properties": {"pk": "/pk"}}
        ],
        "edges": [
            {"id": "edge1", "label": "joins",
             "out_vertex_id": "meep", "in_vertex_id": "beep",
             "out_vertex_label": "meep out", "in_vertex_label": "beep in",
             "out_partition_key": "/pk", "in_partition_key": "/pk"}
        ]
    }"#;

    #[test]
    fn parses_sample_dataset() {
        let dataset = GraphDataset::from_json_str(SAMPLE).unwrap();
        assert_eq!(dataset.vertices.len(), 2);
        assert_eq!(dataset.edges.len(), 1);
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.vertices[0].property_keys().count(), 3);
        assert_eq!(dataset.edges[0].in_vertex_id(), "beep");
    }

    #[test]
    fn sections_are_optional() {
        let dataset = GraphDataset::from_json_str(r#"{"vertices": []}"#).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn invalid_element_fails_whole_dataset() {
        let err = GraphDataset::from_json_str(r#"{"vertices": [{"id": "x", "label": ""}]}"#)
            .unwrap_err();
        assert!(matches!(err, DatasetError::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        std::fs::write(&path, SAMPLE).unwrap();
        assert_eq!(GraphDataset::load(&path).unwrap().len(), 3);

        let err = GraphDataset::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, DatasetError::Io(_)));
    }
}
