// Folding per-unit results into one batch summary. Pure: no I/O, no clocks.

use std::time::Duration;

use crate::batch::BatchOperationResult;
use crate::error::ErrorDetail;

/// Terminal report of one batch execution.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary<T> {
    /// Wall time from the first write starting to the last one finishing.
    pub elapsed: Duration,
    pub success_count: usize,
    /// Sum of cost units over every unit, failed ones included.
    pub total_cost_units: f64,
    /// Failed items in scheduling order.
    pub failures: Vec<(T, ErrorDetail)>,
}

impl<T> BatchSummary<T> {
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn total_count(&self) -> usize {
        self.success_count + self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Fold results, in scheduling order, into a [`BatchSummary`].
pub fn aggregate<T>(results: Vec<BatchOperationResult<T>>, elapsed: Duration) -> BatchSummary<T> {
    let mut summary = BatchSummary {
        elapsed,
        success_count: 0,
        total_cost_units: 0.0,
        failures: Vec::new(),
    };

    for result in results {
        summary.total_cost_units += result.cost_units;
        if result.succeeded {
            summary.success_count += 1;
            continue;
        }
        let detail = result.failure.unwrap_or_else(|| ErrorDetail::Other {
            message: "write failed without a reason".to_string(),
        });
        summary.failures.push((result.item, detail));
    }

    summary
}
