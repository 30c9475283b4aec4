//! Batched execution of deferred async jobs with a cap on how many run at once.

use crate::error::{Result, TrackerError};
use crate::metrics::LimiterMetrics;
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use tracing::debug;

pub const DEFAULT_LIMIT: usize = 1000;

/// Runs `jobs` in consecutive batches of at most `limit`.
///
/// Every job of a batch is spawned at once and the next batch starts only
/// after the whole batch has finished. Results come back in submission order.
///
/// The first failing job ends the call with [`TrackerError::BatchFailed`],
/// whose `index` is the job's position in `jobs`. A panicking job counts as a
/// failure with a [`TrackerError::Join`] source. Later batches never start;
/// siblings already running in the failed batch are detached, not cancelled.
pub async fn run_limited<T, F, Fut>(jobs: Vec<F>, limit: usize) -> Result<Vec<T>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let limit = limit.max(1);
    let total = jobs.len();
    let mut results = Vec::with_capacity(total);
    let mut pending = jobs.into_iter();
    let mut batch = 0;

    loop {
        let chunk: Vec<F> = pending.by_ref().take(limit).collect();
        if chunk.is_empty() {
            break;
        }
        let offset = batch * limit;
        let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(chunk.len()).collect();

        let mut running: FuturesUnordered<_> = chunk
            .into_iter()
            .enumerate()
            .map(|(index, job)| {
                let handle = tokio::spawn(job());
                async move { (index, handle.await) }
            })
            .collect();

        while let Some((index, joined)) = running.next().await {
            match joined {
                Ok(Ok(value)) => slots[index] = Some(value),
                Ok(Err(source)) => {
                    return Err(TrackerError::BatchFailed {
                        batch,
                        index: offset + index,
                        source: Box::new(source),
                    })
                }
                Err(join_error) => {
                    return Err(TrackerError::BatchFailed {
                        batch,
                        index: offset + index,
                        source: Box::new(TrackerError::Join(join_error.to_string())),
                    })
                }
            }
        }

        results.extend(slots.into_iter().flatten());
        batch += 1;
        LimiterMetrics::record_batch();
        debug!("promise limit {} left", total - results.len());
    }

    Ok(results)
}

/// [`run_limited`] with [`DEFAULT_LIMIT`].
pub async fn run_limited_default<T, F, Fut>(jobs: Vec<F>) -> Result<Vec<T>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    run_limited(jobs, DEFAULT_LIMIT).await
}
