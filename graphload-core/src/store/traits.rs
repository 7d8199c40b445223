use crate::error::StoreError;
use crate::model::PropertyValue;

/// Partition key value a document is routed by.
#[derive(Debug, Clone, PartialEq)]
pub enum PartitionKey {
    Value(PropertyValue),
    /// The document targets a non-partitioned collection.
    None,
}

impl PartitionKey {
    /// JSON array form used by the store's partition key request header.
    pub fn to_header_value(&self) -> String {
        match self {
            Self::Value(v) => serde_json::Value::Array(vec![v.to_json()]).to_string(),
            Self::None => "[]".to_string(),
        }
    }
}

impl std::fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v}"),
            Self::None => f.write_str("<none>"),
        }
    }
}

impl From<Option<&PropertyValue>> for PartitionKey {
    fn from(value: Option<&PropertyValue>) -> Self {
        value.map_or(Self::None, |v| Self::Value(v.clone()))
    }
}

/// Outcome of an accepted write.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WriteReceipt {
    /// Cost units the store charged for the write.
    pub cost_units: f64,
}

/// The document store a batch writes into.
///
/// Implementations must be safe to share across concurrent writes; a batch
/// issues every `create_item` against the same `&self`.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Human-readable store name for logs.
    fn name(&self) -> &str;

    /// Create one document. Fails if a document with the same id already
    /// exists in the partition.
    async fn create_item(
        &self,
        partition_key: &PartitionKey,
        document: &[u8],
    ) -> Result<WriteReceipt, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_value_is_json_array() {
        assert_eq!(
            PartitionKey::Value(PropertyValue::from("/pk")).to_header_value(),
            r#"["/pk"]"#
        );
        assert_eq!(PartitionKey::Value(PropertyValue::Int(4)).to_header_value(), "[4]");
        assert_eq!(PartitionKey::None.to_header_value(), "[]");
    }
}
