//! Graph element model: properties, vertices and edges.

pub mod edge;
pub mod property;
pub mod vertex;

pub use edge::Edge;
pub use property::{Property, PropertyCollection, PropertyValue};
pub use vertex::{Vertex, VertexProperty};

/// Either kind of graph element, as carried through a bulk import.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphElement {
    Vertex(Vertex),
    Edge(Edge),
}

impl GraphElement {
    pub fn id(&self) -> &str {
        match self {
            Self::Vertex(v) => v.id(),
            Self::Edge(e) => e.id(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Vertex(v) => v.label(),
            Self::Edge(e) => e.label(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Vertex(_) => "vertex",
            Self::Edge(_) => "edge",
        }
    }
}

impl std::fmt::Display for GraphElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} ({})", self.kind(), self.id(), self.label())
    }
}

impl From<Vertex> for GraphElement {
    fn from(v: Vertex) -> Self {
        Self::Vertex(v)
    }
}

impl From<Edge> for GraphElement {
    fn from(e: Edge) -> Self {
        Self::Edge(e)
    }
}
