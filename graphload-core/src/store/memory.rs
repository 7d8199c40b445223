use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

use crate::error::StoreError;

use super::{DocumentStore, PartitionKey, WriteReceipt};

/// Default cost charged per write, roughly what a small document costs.
pub const DEFAULT_WRITE_COST: f64 = 5.0;

/// In-process document store used for dry runs and tests.
///
/// Documents are keyed by (partition, id). Creating a document whose id
/// already exists in the partition is rejected with status 409 and still
/// charged, like a real store would.
#[derive(Debug)]
pub struct InMemoryStore {
    documents: Mutex<HashMap<(String, String), serde_json::Value>>,
    write_cost: f64,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_write_cost(DEFAULT_WRITE_COST)
    }

    pub fn with_write_cost(write_cost: f64) -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
            write_cost,
        }
    }

    pub fn len(&self) -> usize {
        self.documents
            .lock()
            .expect("in-memory store mutex poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch a stored document.
    pub fn get(&self, partition_key: &PartitionKey, id: &str) -> Option<serde_json::Value> {
        self.documents
            .lock()
            .expect("in-memory store mutex poisoned")
            .get(&(partition_key.to_header_value(), id.to_string()))
            .cloned()
    }
}

#[async_trait::async_trait]
#[allow(clippy::unnecessary_literal_bound)]
impl DocumentStore for InMemoryStore {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn create_item(
        &self,
        partition_key: &PartitionKey,
        document: &[u8],
    ) -> Result<WriteReceipt, StoreError> {
        let value: serde_json::Value =
            serde_json::from_slice(document).map_err(|e| StoreError::Rejected {
                status: 400,
                cost_units: 0.0,
                message: format!("Malformed document: {e}"),
            })?;

        let Some(id) = value.get("id").and_then(serde_json::Value::as_str) else {
            return Err(StoreError::Rejected {
                status: 400,
                cost_units: 0.0,
                message: "Document is missing a string id".to_string(),
            });
        };

        let key = (partition_key.to_header_value(), id.to_string());
        let mut documents = self.documents.lock().expect("in-memory store mutex poisoned");
        if documents.contains_key(&key) {
            return Err(StoreError::Rejected {
                status: 409,
                cost_units: self.write_cost,
                message: format!("Entity with the specified id already exists: {id}"),
            });
        }
        debug!(id, partition = %partition_key, "Stored document");
        documents.insert(key, value);

        Ok(WriteReceipt {
            cost_units: self.write_cost,
        })
    }
}
