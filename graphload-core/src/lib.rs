//! Graphload core library: graph element encoding and concurrent bulk writes.
//!
//! Vertices and edges are encoded into store documents by
//! [`encode::GraphDocumentEncoder`] and written through a
//! [`store::DocumentStore`]. [`ingest::BulkImporter`] ties the two together:
//! it schedules one write per element on a [`batch::BulkOperationBatch`] and
//! returns an [`aggregate::BatchSummary`] once every write has finished.

pub mod aggregate;
pub mod batch;
pub mod config;
pub mod dataset;
pub mod encode;
pub mod error;
pub mod ingest;
pub mod model;
pub mod progress;
pub mod store;
