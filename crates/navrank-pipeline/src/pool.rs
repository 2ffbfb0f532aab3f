//! Bounded fan-out of per-fund work.
//!
//! Every scheme gets its own task; a shared semaphore caps how many run at
//! once. Outcomes come back in submission order no matter which task
//! finishes first, and a panicking task becomes a [`RejectReason::TaskFailed`]
//! outcome instead of tearing down the run.

use std::{future::Future, sync::Arc, time::Duration};

use navrank_traits::{NavRankError, Result, SchemeRef};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, info, warn};

use crate::outcome::{FundOutcome, RejectReason};

const DEBUG_PROGRESS_EVERY: usize = 100;
const INFO_PROGRESS_EVERY: usize = 1000;

/// Run `task` for every scheme with at most `workers` in flight.
///
/// The returned vector is aligned with `schemes`.
pub async fn run_bounded<T, F, Fut>(
    schemes: Vec<SchemeRef>,
    workers: usize,
    task: F,
) -> Vec<FundOutcome<T>>
where
    T: Send + 'static,
    F: Fn(SchemeRef) -> Fut,
    Fut: Future<Output = FundOutcome<T>> + Send + 'static,
{
    let total = schemes.len();
    let sem = Arc::new(Semaphore::new(workers.max(1)));
    let mut set = JoinSet::new();
    let codes: Vec<_> = schemes.iter().map(|s| s.code.clone()).collect();

    for (idx, scheme) in schemes.into_iter().enumerate() {
        let sem = sem.clone();
        let code = scheme.code.clone();
        let work = task(scheme);
        set.spawn(async move {
            let Ok(_permit) = sem.acquire_owned().await else {
                return (
                    idx,
                    FundOutcome::rejected(&code, RejectReason::TaskFailed, "worker pool closed"),
                );
            };
            (idx, work.await)
        });
    }

    let mut slots: Vec<Option<FundOutcome<T>>> = (0..total).map(|_| None).collect();
    let mut finished = 0usize;
    while let Some(joined) = set.join_next().await {
        finished += 1;
        match joined {
            Ok((idx, outcome)) => slots[idx] = Some(outcome),
            Err(err) => warn!(error = %err, "Worker task failed"),
        }
        if finished % INFO_PROGRESS_EVERY == 0 {
            info!(finished, total, "Progress");
        } else if finished % DEBUG_PROGRESS_EVERY == 0 {
            debug!(finished, total, "Progress");
        }
    }

    // Slots left empty belong to tasks that panicked.
    slots
        .into_iter()
        .zip(codes)
        .map(|(slot, code)| {
            slot.unwrap_or_else(|| {
                FundOutcome::rejected(&code, RejectReason::TaskFailed, "worker task panicked")
            })
        })
        .collect()
}

/// Await `fut`, turning an elapsed `limit` into [`NavRankError::DataFetch`].
///
/// # Errors
///
/// Returns the inner error, or a timeout error naming `what`.
pub async fn with_timeout<T>(
    limit: Duration,
    what: &str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(limit, fut).await.map_err(|_| {
        NavRankError::DataFetch(format!("{what} timed out after {:.1}s", limit.as_secs_f64()))
    })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn schemes(n: usize) -> Vec<SchemeRef> {
        (0..n)
            .map(|i| SchemeRef::new(i.to_string(), format!("Scheme {i}")))
            .collect()
    }

    #[tokio::test]
    async fn test_results_follow_submission_order() {
        let outcomes = run_bounded(schemes(20), 4, |s| async move {
            let n: u64 = s.code.as_str().parse().unwrap();
            // later submissions finish first
            tokio::time::sleep(Duration::from_millis(40 - 2 * n)).await;
            FundOutcome::Scored(n)
        })
        .await;
        let values: Vec<u64> = outcomes
            .into_iter()
            .map(|o| match o {
                FundOutcome::Scored(n) => n,
                FundOutcome::Rejected { .. } => panic!("unexpected rejection"),
            })
            .collect();
        assert_eq!(values, (0..20).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let outcomes = run_bounded(schemes(30), 3, |_| {
            let active = active.clone();
            let peak = peak.clone();
            async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                FundOutcome::Scored(())
            }
        })
        .await;
        assert_eq!(outcomes.len(), 30);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_panic_becomes_task_failed() {
        let outcomes = run_bounded(schemes(3), 2, |s| async move {
            assert_ne!(s.code.as_str(), "1", "boom");
            FundOutcome::Scored(s.code)
        })
        .await;
        assert_eq!(outcomes[0].reason(), None);
        assert_eq!(outcomes[1].reason(), Some(RejectReason::TaskFailed));
        assert_eq!(outcomes[2].reason(), None);
        match &outcomes[1] {
            FundOutcome::Rejected { code, .. } => assert_eq!(code.as_str(), "1"),
            FundOutcome::Scored(_) => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_with_timeout() {
        let slow = with_timeout(Duration::from_millis(10), "history 1", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(slow, Err(NavRankError::DataFetch(ref m)) if m.contains("timed out")));

        let fast = with_timeout(Duration::from_secs(1), "history 2", async { Ok(7) }).await;
        assert_eq!(fast.unwrap(), 7);
    }
}
