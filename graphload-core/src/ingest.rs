//! Bulk import of vertices and edges into a document store.
//!
//! Every element is encoded before the first write is scheduled, so an
//! invalid element aborts the import without touching the store. Once writes
//! start, individual failures are reported in the returned summary instead
//! of failing the import.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::aggregate::BatchSummary;
use crate::batch::{BatchOptions, BulkOperationBatch};
use crate::config::GraphLoadConfig;
use crate::dataset::GraphDataset;
use crate::encode::{EncoderConfig, GraphDocumentEncoder};
use crate::error::Result;
use crate::model::{Edge, GraphElement, Vertex};
use crate::progress::{NoopReporter, ProgressReporter};
use crate::store::{DocumentStore, PartitionKey};

/// An element together with its encoded document and routing key.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedDocument {
    pub element: GraphElement,
    pub partition_key: PartitionKey,
    pub body: String,
}

/// Encode every element, vertices first, and pair each document with the
/// partition key it is routed by. Fails on the first element that cannot be
/// encoded.
pub fn encode_elements(
    encoder: &GraphDocumentEncoder,
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
) -> Result<Vec<EncodedDocument>> {
    let config = encoder.config();
    let mut documents = Vec::with_capacity(vertices.len() + edges.len());

    for vertex in vertices {
        let body = encoder.encode_vertex(&vertex)?;
        let partition_key = if config.partition_required {
            PartitionKey::from(vertex.first_value(&config.partition_key))
        } else {
            PartitionKey::None
        };
        documents.push(EncodedDocument {
            element: GraphElement::Vertex(vertex),
            partition_key,
            body,
        });
    }

    for edge in edges {
        let body = encoder.encode_edge(&edge)?;
        let partition_key = if config.partition_required {
            PartitionKey::from(edge.out_partition_key())
        } else {
            PartitionKey::None
        };
        documents.push(EncodedDocument {
            element: GraphElement::Edge(edge),
            partition_key,
            body,
        });
    }

    Ok(documents)
}

/// Encodes graph elements and writes them concurrently into a store.
pub struct BulkImporter {
    store: Arc<dyn DocumentStore>,
    encoder: GraphDocumentEncoder,
    options: BatchOptions,
}

impl std::fmt::Debug for BulkImporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkImporter")
            .field("store", &self.store.name())
            .field("encoder", &self.encoder)
            .field("options", &self.options)
            .finish()
    }
}

impl BulkImporter {
    pub fn new(store: Arc<dyn DocumentStore>, encoder: EncoderConfig, options: BatchOptions) -> Self {
        Self {
            store,
            encoder: GraphDocumentEncoder::new(encoder),
            options,
        }
    }

    pub fn from_config(store: Arc<dyn DocumentStore>, config: &GraphLoadConfig) -> Self {
        Self::new(store, config.encoder_config(), config.batch_options())
    }

    pub fn encoder(&self) -> &GraphDocumentEncoder {
        &self.encoder
    }

    /// Encode every element, vertices first. See [`encode_elements`].
    pub fn encode_all(&self, vertices: Vec<Vertex>, edges: Vec<Edge>) -> Result<Vec<EncodedDocument>> {
        encode_elements(&self.encoder, vertices, edges)
    }

    /// Import vertices and edges, returning the summary of every write.
    pub async fn import(&self, vertices: Vec<Vertex>, edges: Vec<Edge>) -> Result<BatchSummary<GraphElement>> {
        self.import_with_progress(vertices, edges, &NoopReporter).await
    }

    pub async fn import_dataset(
        &self,
        dataset: GraphDataset,
        progress: &dyn ProgressReporter,
    ) -> Result<BatchSummary<GraphElement>> {
        self.import_with_progress(dataset.vertices, dataset.edges, progress)
            .await
    }

    #[instrument(skip_all, name = "bulk_import", fields(store = self.store.name(), vertices = vertices.len(), edges = edges.len()))]
    pub async fn import_with_progress(
        &self,
        vertices: Vec<Vertex>,
        edges: Vec<Edge>,
        progress: &dyn ProgressReporter,
    ) -> Result<BatchSummary<GraphElement>> {
        let documents = self.encode_all(vertices, edges)?;
        info!(documents = documents.len(), "Encoded graph elements");

        let store: &dyn DocumentStore = self.store.as_ref();
        let mut batch = BulkOperationBatch::with_options(documents.len(), self.options);
        for document in documents {
            let EncodedDocument {
                element,
                partition_key,
                body,
            } = document;
            batch.schedule(
                async move { store.create_item(&partition_key, body.as_bytes()).await },
                element,
            );
        }

        let summary = batch.run_with_progress(progress).await;
        for (element, detail) in &summary.failures {
            warn!(element = %element, error = %detail, "Element was not written");
        }
        Ok(summary)
    }
}
