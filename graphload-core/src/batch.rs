//! Concurrent bulk write batch.
//!
//! A [`BulkOperationBatch`] collects write units without running them. Each
//! unit is a store write wrapped in a capture adapter that turns its outcome
//! into a [`BatchOperationResult`]. [`BulkOperationBatch::run`] starts every
//! unit, waits for all of them, and folds the results into a
//! [`BatchSummary`]. Nothing is reported before the last unit finishes.

use std::future::Future;
use std::num::NonZeroUsize;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument};

use crate::aggregate::{BatchSummary, aggregate};
use crate::error::{ErrorDetail, StoreError};
use crate::progress::{NoopReporter, ProgressReporter};
use crate::store::WriteReceipt;

/// Tuning knobs for a batch run. The default starts every unit at once and
/// never times out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Upper bound on writes awaiting the store at the same time.
    pub max_in_flight: Option<NonZeroUsize>,
    /// Per-write deadline. An expired write is recorded as
    /// [`ErrorDetail::TimedOut`].
    pub write_timeout: Option<Duration>,
}

/// Captured outcome of a single write unit.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOperationResult<T> {
    pub(crate) item: T,
    pub(crate) succeeded: bool,
    pub(crate) cost_units: f64,
    pub(crate) failure: Option<ErrorDetail>,
}

impl<T> BatchOperationResult<T> {
    pub fn success(item: T, cost_units: f64) -> Self {
        Self {
            item,
            succeeded: true,
            cost_units,
            failure: None,
        }
    }

    /// A failed unit keeps whatever cost the store charged for the attempt.
    pub fn failure(item: T, detail: ErrorDetail) -> Self {
        Self {
            item,
            succeeded: false,
            cost_units: detail.cost_units(),
            failure: Some(detail),
        }
    }

    pub fn item(&self) -> &T {
        &self.item
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn cost_units(&self) -> f64 {
        self.cost_units
    }

    pub fn failure_reason(&self) -> Option<&ErrorDetail> {
        self.failure.as_ref()
    }
}

/// Await one write and record its outcome. Never fails: store errors,
/// transport errors and timeouts all become data.
pub async fn capture<T, F>(write: F, item: T, timeout: Option<Duration>) -> BatchOperationResult<T>
where
    F: Future<Output = Result<WriteReceipt, StoreError>>,
{
    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, write).await {
            Ok(result) => result.map_err(ErrorDetail::from),
            Err(_) => Err(ErrorDetail::TimedOut { after: limit }),
        },
        None => write.await.map_err(ErrorDetail::from),
    };

    match outcome {
        Ok(receipt) => BatchOperationResult::success(item, receipt.cost_units),
        Err(detail) => {
            debug!(error = %detail, "Write failed");
            BatchOperationResult::failure(item, detail)
        }
    }
}

type Unit<'a, T> = Pin<Box<dyn Future<Output = BatchOperationResult<T>> + Send + 'a>>;

/// A set of independent writes executed together.
pub struct BulkOperationBatch<'a, T> {
    units: Vec<Unit<'a, T>>,
    options: BatchOptions,
    limiter: Option<Arc<Semaphore>>,
}

impl<T> std::fmt::Debug for BulkOperationBatch<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkOperationBatch")
            .field("units", &self.units.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'a, T: Send + 'a> BulkOperationBatch<'a, T> {
    /// `capacity_hint` is the expected number of writes; it only sizes storage.
    pub fn new(capacity_hint: usize) -> Self {
        Self::with_options(capacity_hint, BatchOptions::default())
    }

    pub fn with_options(capacity_hint: usize, options: BatchOptions) -> Self {
        Self {
            units: Vec::with_capacity(capacity_hint),
            options,
            limiter: options
                .max_in_flight
                .map(|n| Arc::new(Semaphore::new(n.get()))),
        }
    }

    /// Register a write for `item`. The write does not start until
    /// [`run`](Self::run).
    pub fn schedule<F>(&mut self, write: F, item: T)
    where
        F: Future<Output = Result<WriteReceipt, StoreError>> + Send + 'a,
    {
        let limiter = self.limiter.clone();
        let timeout = self.options.write_timeout;
        self.units.push(Box::pin(async move {
            let _permit = match &limiter {
                Some(semaphore) => semaphore.acquire().await.ok(),
                None => None,
            };
            capture(write, item, timeout).await
        }));
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Run every scheduled write concurrently and summarize the outcomes.
    pub async fn run(self) -> BatchSummary<T> {
        self.run_with_progress(&NoopReporter).await
    }

    /// Like [`run`](Self::run), advancing `progress` as each write finishes.
    #[instrument(skip_all, name = "batch_run", fields(units = self.units.len()))]
    pub async fn run_with_progress(self, progress: &dyn ProgressReporter) -> BatchSummary<T> {
        progress.start("Writing documents", Some(self.units.len() as u64));

        let start = Instant::now();
        let results = join_all(self.units.into_iter().map(|unit| async move {
            let result = unit.await;
            progress.advance(1);
            result
        }))
        .await;
        let elapsed = start.elapsed();
        progress.finish();

        let summary = aggregate(results, elapsed);
        info!(
            succeeded = summary.success_count,
            failed = summary.failures.len(),
            cost_units = summary.total_cost_units,
            elapsed = ?summary.elapsed,
            "Batch complete"
        );
        summary
    }
}
