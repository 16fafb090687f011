//! Bounded worker pool for independent resolution chains
//!
//! Runs N chains concurrently with a fixed worker width. Tasks share no
//! mutable state and a failure (or panic) in one never affects its
//! siblings. Outcomes are collected in completion order — explicitly not
//! submission order — which is the documented ordering of the aggregate
//! event log.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::types::{ResolutionOutcome, ResolutionTask};

/// Default number of concurrent chains
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Runs every task to completion on a bounded worker pool
///
/// `worker` is invoked once per task; each invocation owns its task and
/// builds its own HTTP client, so no header or referer state is shared
/// between concurrent chains. Blocks until all tasks have completed.
pub async fn run_all<F, Fut>(
    tasks: Vec<ResolutionTask>,
    concurrency: usize,
    worker: F,
) -> Vec<ResolutionOutcome>
where
    F: Fn(ResolutionTask) -> Fut,
    Fut: Future<Output = ResolutionOutcome> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut workers: JoinSet<ResolutionOutcome> = JoinSet::new();

    for task in tasks {
        let semaphore = Arc::clone(&semaphore);
        let chain = worker(task);
        workers.spawn(async move {
            // Permit is held for the whole chain; never closed, so the
            // acquire cannot fail in practice.
            let _permit = semaphore.acquire_owned().await.ok();
            chain.await
        });
    }

    let mut outcomes = Vec::new();
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => tracing::error!("resolution task aborted: {e}"),
        }
    }
    outcomes
}
