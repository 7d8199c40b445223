// Integration test utilities and fixtures for graphload.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use graphload_core::batch::BatchOptions;
use graphload_core::dataset::GraphDataset;
use graphload_core::encode::EncoderConfig;
use graphload_core::error::StoreError;
use graphload_core::ingest::BulkImporter;
use graphload_core::model::{Edge, Vertex};
use graphload_core::store::{DocumentStore, InMemoryStore, PartitionKey, WriteReceipt};

/// The two-floor plan: vertices `First` and `Second` joined by `FirstEdge`
/// (Second → First), all in partition `/pk`.
pub fn floor_plan() -> (Vec<Vertex>, Vec<Edge>) {
    let floor = |id: &str| {
        Vertex::new(id, "FLOOR")
            .and_then(|v| v.with_property("pk", "/pk"))
            .expect("valid floor vertex")
    };
    let edge = Edge::new("FirstEdge", "joins", "Second", "First", "FLOOR", "FLOOR")
        .and_then(|e| e.with_partition_keys("/pk", "/pk"))
        .expect("valid floor edge");
    (vec![floor("First"), floor("Second")], vec![edge])
}

/// The facility sample dataset shipped in `fixtures/facility.json`.
pub fn facility_dataset() -> GraphDataset {
    GraphDataset::from_json_str(include_str!("../fixtures/facility.json"))
        .expect("facility fixture parses")
}

/// How a [`ScriptedStore`] answers a write for one document id.
#[derive(Debug, Clone)]
pub enum Script {
    Reject { status: u16, cost_units: f64 },
    Disconnect,
    Stall(Duration),
}

/// A store that fails chosen document ids and passes everything else to an
/// [`InMemoryStore`].
#[derive(Debug, Default)]
pub struct ScriptedStore {
    inner: InMemoryStore,
    scripts: HashMap<String, Script>,
    calls: AtomicUsize,
}

impl ScriptedStore {
    pub fn new(write_cost: f64) -> Self {
        Self {
            inner: InMemoryStore::with_write_cost(write_cost),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_script(mut self, id: &str, script: Script) -> Self {
        self.scripts.insert(id.to_string(), script);
        self
    }

    /// Number of `create_item` calls received, scripted ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> &InMemoryStore {
        &self.inner
    }
}

#[async_trait::async_trait]
#[allow(clippy::unnecessary_literal_bound)]
impl DocumentStore for ScriptedStore {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn create_item(
        &self,
        partition_key: &PartitionKey,
        document: &[u8],
    ) -> Result<WriteReceipt, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let id = serde_json::from_slice::<serde_json::Value>(document)
            .ok()
            .and_then(|doc| doc.get("id").and_then(|id| id.as_str().map(str::to_string)));

        match id.as_deref().and_then(|id| self.scripts.get(id)) {
            Some(Script::Reject { status, cost_units }) => Err(StoreError::Rejected {
                status: *status,
                cost_units: *cost_units,
                message: "Scripted rejection".to_string(),
            }),
            Some(Script::Disconnect) => {
                Err(StoreError::Transport("connection reset by peer".to_string()))
            }
            Some(Script::Stall(delay)) => {
                tokio::time::sleep(*delay).await;
                self.inner.create_item(partition_key, document).await
            }
            None => self.inner.create_item(partition_key, document).await,
        }
    }
}

/// Importer over `store` with the default encoder settings.
pub fn importer(store: Arc<dyn DocumentStore>, options: BatchOptions) -> BulkImporter {
    BulkImporter::new(store, EncoderConfig::default(), options)
}
