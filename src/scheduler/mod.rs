//! Bounded Task Scheduler
//!
//! Runs an arbitrary number of async work items with a fixed ceiling on how
//! many are outstanding at once.
//!
//! ## Design
//!
//! Items are pulled lazily from an enumerated stream and driven through
//! `buffer_unordered`, whose `FuturesUnordered` core is a wait-for-any over
//! the in-flight set: a slot is refilled only after the future occupying it
//! has signalled completion through its own waker. Nothing inspects the
//! internal state of a running future.
//!
//! ## Guarantees
//!
//! - At most `concurrency` items are in flight at any instant
//! - Every dispatched item yields exactly one [`TaskResult`]
//! - A worker error becomes an [`ItemFailure`]; it is logged and never
//!   aborts the batch
//! - `run` returns only after every dispatched item has settled
//!
//! Results arrive in completion order. Callers that need submission order
//! use the `index` carried by every result (see [`BatchReport::into_indexed`]).
//!
//! All futures are polled from the caller's task; no work is spawned.

use std::fmt;
use std::future::Future;
use std::num::NonZeroUsize;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::types::{DocError, Result};

// =============================================================================
// Results
// =============================================================================

/// A work item whose worker returned an error (or timed out)
#[derive(Debug, Clone)]
pub struct ItemFailure<T> {
    /// Position of the item in the submitted sequence
    pub index: usize,
    /// The originating item, kept for diagnostics
    pub item: T,
    /// Rendered error
    pub error: String,
}

impl<T: fmt::Debug> ItemFailure<T> {
    pub fn to_error(&self) -> DocError {
        DocError::Item {
            index: self.index,
            item: format!("{:?}", self.item),
            message: self.error.clone(),
        }
    }
}

/// Outcome of one work item
#[derive(Debug)]
pub enum TaskResult<T, R> {
    Success { index: usize, value: R },
    Failure(ItemFailure<T>),
}

impl<T, R> TaskResult<T, R> {
    /// Position of the originating item in the submitted sequence
    pub fn index(&self) -> usize {
        match self {
            Self::Success { index, .. } => *index,
            Self::Failure(failure) => failure.index,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Aggregated outcome of a batch, in completion order
#[derive(Debug)]
pub struct BatchReport<T, R> {
    /// Number of submitted items
    pub total: usize,
    /// One entry per dispatched item, in completion order
    pub results: Vec<TaskResult<T, R>>,
    /// Items never dispatched because the batch was cancelled
    pub skipped: usize,
}

impl<T, R> BatchReport<T, R> {
    fn empty() -> Self {
        Self {
            total: 0,
            results: Vec::new(),
            skipped: 0,
        }
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.results.len() - self.success_count()
    }

    /// Failed items, in completion order
    pub fn failures(&self) -> impl Iterator<Item = &ItemFailure<T>> {
        self.results.iter().filter_map(|r| match r {
            TaskResult::Failure(failure) => Some(failure),
            TaskResult::Success { .. } => None,
        })
    }

    /// Whether every submitted item was dispatched
    pub fn is_complete(&self) -> bool {
        self.skipped == 0
    }

    /// Successful values in completion order
    pub fn into_successes(self) -> Vec<R> {
        self.results
            .into_iter()
            .filter_map(|r| match r {
                TaskResult::Success { value, .. } => Some(value),
                TaskResult::Failure(_) => None,
            })
            .collect()
    }

    /// Successful values tagged with their submission index, sorted by it
    pub fn into_indexed(self) -> Vec<(usize, R)> {
        let mut indexed: Vec<(usize, R)> = self
            .results
            .into_iter()
            .filter_map(|r| match r {
                TaskResult::Success { index, value } => Some((index, value)),
                TaskResult::Failure(_) => None,
            })
            .collect();
        indexed.sort_by_key(|(index, _)| *index);
        indexed
    }
}

// =============================================================================
// Scheduler
// =============================================================================

/// Executes work items with a fixed concurrency ceiling
#[derive(Debug, Clone)]
pub struct BatchScheduler {
    label: String,
    concurrency: NonZeroUsize,
    item_timeout: Option<Duration>,
    cancel: Option<CancellationToken>,
}

impl BatchScheduler {
    /// Create a scheduler; `concurrency` must be at least 1
    pub fn new(label: impl Into<String>, concurrency: usize) -> Result<Self> {
        let label = label.into();
        let concurrency = NonZeroUsize::new(concurrency).ok_or_else(|| {
            DocError::Scheduler(format!(
                "concurrency for batch '{}' must be at least 1",
                label
            ))
        })?;

        Ok(Self {
            label,
            concurrency,
            item_timeout: None,
            cancel: None,
        })
    }

    /// Fail any single worker call that runs longer than `timeout`
    pub fn with_item_timeout(mut self, timeout: Duration) -> Self {
        self.item_timeout = Some(timeout);
        self
    }

    /// Stop dispatching pending items once `token` is cancelled.
    /// In-flight items still run to completion.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Run `worker` over every item and collect a report
    pub async fn run<T, R, E, F, Fut>(&self, items: Vec<T>, worker: F) -> BatchReport<T, R>
    where
        T: Clone + fmt::Debug,
        E: fmt::Display,
        F: Fn(T) -> Fut,
        Fut: Future<Output = std::result::Result<R, E>>,
    {
        let total = items.len();
        if total == 0 {
            debug!(batch = %self.label, "Empty batch, nothing to dispatch");
            return BatchReport::empty();
        }

        info!(
            batch = %self.label,
            total,
            concurrency = self.concurrency.get(),
            "Starting batch"
        );

        let cancel = self.cancel.clone();
        let item_timeout = self.item_timeout;
        let worker = &worker;

        // take_while is evaluated when buffer_unordered pulls the next item,
        // i.e. exactly when a slot is free to dispatch it.
        let mut in_flight = stream::iter(items.into_iter().enumerate())
            .take_while(move |_| {
                std::future::ready(!cancel.as_ref().is_some_and(CancellationToken::is_cancelled))
            })
            .map(move |(index, item)| async move {
                let outcome = match item_timeout {
                    Some(limit) => match tokio::time::timeout(limit, worker(item.clone())).await {
                        Ok(result) => result.map_err(|e| e.to_string()),
                        Err(_) => Err(format!("timed out after {:?}", limit)),
                    },
                    None => worker(item.clone()).await.map_err(|e| e.to_string()),
                };

                match outcome {
                    Ok(value) => TaskResult::Success { index, value },
                    Err(error) => TaskResult::Failure(ItemFailure { index, item, error }),
                }
            })
            .buffer_unordered(self.concurrency.get());

        let mut results = Vec::with_capacity(total);
        let mut succeeded = 0usize;

        while let Some(result) = in_flight.next().await {
            match &result {
                TaskResult::Success { index, .. } => {
                    succeeded += 1;
                    debug!(
                        batch = %self.label,
                        index,
                        "Item completed ({}/{})",
                        succeeded,
                        total
                    );
                }
                TaskResult::Failure(failure) => {
                    warn!(batch = %self.label, "{}", failure.to_error());
                }
            }
            results.push(result);
        }

        let skipped = total - results.len();
        if skipped > 0 {
            warn!(
                batch = %self.label,
                skipped,
                "Batch cancelled, {} items were not dispatched",
                skipped
            );
        }

        info!(
            batch = %self.label,
            succeeded,
            failed = results.len() - succeeded,
            "Batch complete"
        );

        BatchReport {
            total,
            results,
            skipped,
        }
    }
}

/// Run `worker` over `items` with at most `concurrency` in flight and return
/// the successful values in completion order.
///
/// Fails only when `concurrency` is zero.
pub async fn run_bounded<T, R, E, F, Fut>(
    items: Vec<T>,
    concurrency: usize,
    worker: F,
) -> Result<Vec<R>>
where
    T: Clone + fmt::Debug,
    E: fmt::Display,
    F: Fn(T) -> Fut,
    Fut: Future<Output = std::result::Result<R, E>>,
{
    let scheduler = BatchScheduler::new("batch", concurrency)?;
    Ok(scheduler.run(items, worker).await.into_successes())
}
