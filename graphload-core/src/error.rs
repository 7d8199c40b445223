use std::time::Duration;

/// Top-level graphload error type.
///
/// All fallible setup operations in `graphload-core` return
/// [`Result<T, GraphLoadError>`](Result). Each variant wraps a
/// domain-specific error enum, allowing callers to match on the error source
/// without losing type information. Per-write failures inside a batch are
/// never raised through this type; they become [`ErrorDetail`] data.
#[derive(thiserror::Error, Debug)]
pub enum GraphLoadError {
    /// A vertex, edge or property failed construction-time validation.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// A graph element could not be encoded into a store document.
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Error reported by the document store outside of a batch.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Error in configuration parsing or validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A dataset file could not be read or parsed.
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),
}

/// Construction-time validation failures for graph elements and properties.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A required identifier or label on a vertex or edge was empty.
    #[error("{element} must have a valid {field}")]
    MissingField {
        /// `"Vertex"` or `"Edge"`.
        element: &'static str,
        /// Name of the empty field.
        field: &'static str,
    },

    /// Property keys must be non-empty.
    #[error("Property key cannot be empty")]
    EmptyPropertyKey,

    /// Floating point property values must be finite (NaN/inf have no JSON form).
    #[error("Property {0} has a non-finite value")]
    NonFiniteValue(String),

    /// A property collection already holds this key.
    #[error("Property {0} already exists in the collection")]
    DuplicateProperty(String),

    /// Two values under one vertex property key were pinned to the same id.
    #[error("Vertex property {key} already has a value with id {id}")]
    DuplicatePropertyId { key: String, id: String },
}

/// Encode-time failures. Fatal for the single document being encoded.
#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    /// The partition key property is present on the vertex but holds no value.
    #[error("Partition key property {key} has no value on vertex {vertex_id}")]
    MissingPartitionValue { vertex_id: String, key: String },

    /// A property key holds no value while flattening was requested.
    #[error("Vertex property {key} has no value on vertex {vertex_id}")]
    MissingPropertyValue { vertex_id: String, key: String },

    /// The collection is partitioned but the vertex has no partition key property.
    #[error("Partition key property {key} must be specified on vertex {vertex_id} for a partitioned graph")]
    PartitionKeyRequired { vertex_id: String, key: String },

    /// Edge is missing its in-vertex partition key on a partitioned graph.
    #[error("Edge {edge_id} must have a valid in-vertex partition key for a partitioned graph")]
    MissingInVertexPartitionKey { edge_id: String },

    /// Edge is missing its out-vertex partition key on a partitioned graph.
    #[error("Edge {edge_id} must have a valid out-vertex partition key for a partitioned graph")]
    MissingOutVertexPartitionKey { edge_id: String },

    /// A user edge property uses a store-reserved system name.
    #[error("Property {key} is not allowed as an edge property (edge {edge_id})")]
    ReservedPropertyCollision { edge_id: String, key: String },

    /// A vertex property would overwrite the document's `id` or `label`.
    #[error("Property {key} is not allowed as a vertex property (vertex {vertex_id})")]
    ReservedVertexProperty { vertex_id: String, key: String },

    /// The assembled document could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors returned by a [`DocumentStore`](crate::store::DocumentStore).
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The store processed the request and rejected it. Carries the cost the
    /// store charged for the attempt.
    #[error("Store rejected write (HTTP {status}, {cost_units} units): {message}")]
    Rejected {
        /// Status code reported by the store.
        status: u16,
        /// Cost units charged for the rejected request.
        cost_units: f64,
        /// Store-provided error description.
        message: String,
    },

    /// The request never reached the store or the connection failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The store answered with something that could not be interpreted.
    #[error("Invalid store response: {0}")]
    InvalidResponse(String),
}

impl StoreError {
    /// Cost units carried by a store-specific rejection, if any.
    pub fn cost_units(&self) -> Option<f64> {
        match self {
            Self::Rejected { cost_units, .. } => Some(*cost_units),
            Self::Transport(_) | Self::InvalidResponse(_) => None,
        }
    }
}

/// Errors in graphload configuration parsing and validation.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The configuration file does not exist at the expected path.
    #[error("Config file not found: {0}")]
    NotFound(String),

    /// Configuration values are present but semantically invalid.
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// Configuration file syntax could not be parsed (TOML error).
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Errors loading a graph dataset file.
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// Filesystem I/O error reading the dataset.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The dataset JSON is malformed or an element failed validation.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Structured description of a failed write, stored as data in a
/// [`BatchOperationResult`](crate::batch::BatchOperationResult).
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorDetail {
    /// The store itself rejected the write and reported a cost.
    Store {
        status: u16,
        cost_units: f64,
        message: String,
    },
    /// The write did not complete within the configured timeout.
    TimedOut { after: Duration },
    /// Any other failure (transport, malformed response, ...).
    Other { message: String },
}

impl ErrorDetail {
    pub fn cost_units(&self) -> f64 {
        match self {
            Self::Store { cost_units, .. } => *cost_units,
            Self::TimedOut { .. } | Self::Other { .. } => 0.0,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Store { message, .. } | Self::Other { message } => message.clone(),
            Self::TimedOut { after } => format!("write timed out after {after:?}"),
        }
    }

    pub fn is_store_error(&self) -> bool {
        matches!(self, Self::Store { .. })
    }
}

impl From<StoreError> for ErrorDetail {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Rejected {
                status,
                cost_units,
                message,
            } => Self::Store {
                status,
                cost_units,
                message,
            },
            other => Self::Other {
                message: other.to_string(),
            },
        }
    }
}

impl std::fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store {
                status,
                cost_units,
                message,
            } => write!(f, "store error (HTTP {status}, {cost_units} units): {message}"),
            Self::TimedOut { after } => write!(f, "timed out after {after:?}"),
            Self::Other { message } => f.write_str(message),
        }
    }
}

/// Convenience alias for `Result<T, GraphLoadError>`.
pub type Result<T> = std::result::Result<T, GraphLoadError>;
